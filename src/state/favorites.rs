//! Capped favorites list
//!
//! All mutations go through [`Favorites::reduce`], which returns a new
//! snapshot and leaves the old one untouched.
use std::collections::HashSet;

use tracing::info;

use super::data::Character;

/// Default number of favorites kept
pub const DEFAULT_MAX_FAVORITES: usize = 5;

/// A mutation of the favorites list
#[derive(Debug, Clone, PartialEq)]
pub enum FavoritesAction {
    /// Prepend a character unless its id is already present
    Add(Character),
    /// Drop every entry with this id
    Remove(String),
    /// Empty the list
    Clear,
    /// Fold in the snapshot read from storage at startup
    Hydrate(Vec<Character>),
}

/// Newest-first list of favorite characters, never longer than `max_items`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorites {
    list: Vec<Character>,
    max_items: usize,
}

impl Default for Favorites {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FAVORITES)
    }
}

impl Favorites {
    /// Create an empty list; a capacity of 0 is raised to 1
    pub fn new(max_items: usize) -> Self {
        Self {
            list: Vec::new(),
            max_items: max_items.max(1),
        }
    }

    pub fn list(&self) -> &[Character] {
        &self.list
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Membership test by id (linear scan, the list is tiny)
    pub fn contains(&self, id: &str) -> bool {
        self.list.iter().any(|c| c.id == id)
    }

    /// Apply an action and return the resulting snapshot
    pub fn reduce(&self, action: FavoritesAction) -> Favorites {
        match action {
            FavoritesAction::Add(character) => {
                if self.contains(&character.id) {
                    return self.clone();
                }

                let mut list = Vec::with_capacity(self.max_items);
                list.push(character);
                list.extend(self.list.iter().cloned());

                if list.len() > self.max_items {
                    // Positional eviction: the tail goes, regardless of use
                    for evicted in &list[self.max_items..] {
                        info!(id = %evicted.id, name = %evicted.name, "favorites full, evicting oldest entry");
                    }
                    list.truncate(self.max_items);
                }

                Favorites {
                    list,
                    max_items: self.max_items,
                }
            }
            FavoritesAction::Remove(id) => Favorites {
                list: self.list.iter().filter(|c| c.id != id).cloned().collect(),
                max_items: self.max_items,
            },
            FavoritesAction::Clear => Favorites::new(self.max_items),
            FavoritesAction::Hydrate(persisted) => {
                let mut seen: HashSet<String> = HashSet::new();
                let list = self
                    .list
                    .iter()
                    .cloned()
                    .chain(persisted)
                    .filter(|c| seen.insert(c.id.clone()))
                    .take(self.max_items)
                    .collect();

                Favorites {
                    list,
                    max_items: self.max_items,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::sample;

    fn ids(favorites: &Favorites) -> Vec<&str> {
        favorites.list().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_sixth_add_evicts_the_oldest() {
        let mut favorites = Favorites::new(5);
        for n in 1..=6 {
            favorites = favorites.reduce(FavoritesAction::Add(sample(&format!("c{n}"))));
        }

        assert_eq!(ids(&favorites), vec!["c6", "c5", "c4", "c3", "c2"]);
        assert_eq!(favorites.len(), 5);
    }

    #[test]
    fn test_adding_present_id_is_noop() {
        let favorites = Favorites::default()
            .reduce(FavoritesAction::Add(sample("a")))
            .reduce(FavoritesAction::Add(sample("b")));

        let again = favorites.reduce(FavoritesAction::Add(sample("a")));

        assert_eq!(again, favorites);
        assert_eq!(ids(&again), vec!["b", "a"]);
    }

    #[test]
    fn test_removing_absent_id_is_noop() {
        let favorites = Favorites::default().reduce(FavoritesAction::Add(sample("a")));

        let after = favorites.reduce(FavoritesAction::Remove("zzz".to_string()));

        assert_eq!(after, favorites);
    }

    #[test]
    fn test_remove_and_clear() {
        let favorites = Favorites::default()
            .reduce(FavoritesAction::Add(sample("a")))
            .reduce(FavoritesAction::Add(sample("b")));

        let removed = favorites.reduce(FavoritesAction::Remove("a".to_string()));
        assert_eq!(ids(&removed), vec!["b"]);

        let cleared = removed.reduce(FavoritesAction::Clear);
        assert!(cleared.is_empty());
        assert_eq!(cleared.max_items(), 5);
    }

    #[test]
    fn test_reduce_leaves_previous_snapshot_alone() {
        let before = Favorites::default().reduce(FavoritesAction::Add(sample("a")));

        let _after = before.reduce(FavoritesAction::Clear);

        assert_eq!(ids(&before), vec!["a"]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        for capacity in 1..=7 {
            let mut favorites = Favorites::new(capacity);
            for n in 0..20 {
                // Every third add repeats an earlier id
                let id = if n % 3 == 0 { "c0".to_string() } else { format!("c{n}") };
                favorites = favorites.reduce(FavoritesAction::Add(sample(&id)));
                assert!(favorites.len() <= capacity);
            }
        }
    }

    #[test]
    fn test_hydrate_keeps_in_memory_entries_first() {
        let favorites = Favorites::new(3).reduce(FavoritesAction::Add(sample("new")));

        let persisted = vec![sample("p1"), sample("new"), sample("p1"), sample("p2"), sample("p3")];
        let hydrated = favorites.reduce(FavoritesAction::Hydrate(persisted));

        assert_eq!(ids(&hydrated), vec!["new", "p1", "p2"]);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let favorites = Favorites::new(0).reduce(FavoritesAction::Add(sample("a")));

        assert_eq!(favorites.max_items(), 1);
        assert_eq!(favorites.len(), 1);
    }
}
