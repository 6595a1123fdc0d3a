//! Paging accumulator for the roster screen
//!
//! Pages are merged in arrival order and deduplicated by character id.
//! A single request may be in flight at a time; completions are matched
//! against the session generation so a reset drops late answers.
use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::data::{Character, CharactersPage};
use crate::error::ApiError;

/// Append the records of `incoming` whose id is not yet present
///
/// Earlier entries always stay in front. Duplicates inside `incoming`
/// are dropped as well.
pub fn merge_page(previous: &[Character], incoming: Vec<Character>) -> Vec<Character> {
    let mut seen: HashSet<&str> = previous.iter().map(|c| c.id.as_str()).collect();
    let mut fresh = Vec::with_capacity(incoming.len());

    for character in &incoming {
        if seen.insert(character.id.as_str()) {
            fresh.push(character.clone());
        }
    }

    let mut merged = Vec::with_capacity(previous.len() + fresh.len());
    merged.extend_from_slice(previous);
    merged.extend(fresh);
    merged
}

/// A page fetch the UI should dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub generation: u64,
}

/// What the footer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterStatus {
    Idle,
    Loading,
    Failed,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Loading,
    Failed,
}

/// Characters accumulated across pagination calls within one session
#[derive(Debug, Clone)]
pub struct Roster {
    characters: Vec<Character>,
    /// Last page merged into `characters` (0 before the first page)
    page: u32,
    has_more: bool,
    phase: Phase,
    generation: u64,
    total: Option<u32>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            characters: Vec::new(),
            page: 0,
            has_more: true,
            phase: Phase::Idle,
            generation: 0,
            total: None,
        }
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Total record count reported by the server, once known
    pub fn total(&self) -> Option<u32> {
        self.total
    }

    pub fn status(&self) -> RosterStatus {
        match self.phase {
            Phase::Loading => RosterStatus::Loading,
            Phase::Failed => RosterStatus::Failed,
            Phase::Idle if !self.has_more => RosterStatus::Exhausted,
            Phase::Idle => RosterStatus::Idle,
        }
    }

    /// Claim the next page, or `None` when busy or exhausted
    ///
    /// A failed request does not block the next claim; the user retries by
    /// scrolling again.
    pub fn request_next(&mut self) -> Option<PageRequest> {
        if self.phase == Phase::Loading || !self.has_more {
            return None;
        }

        self.phase = Phase::Loading;
        let request = PageRequest {
            page: self.page + 1,
            generation: self.generation,
        };
        debug!(page = request.page, generation = request.generation, "requesting roster page");
        Some(request)
    }

    /// Start a new session and claim page 1
    pub fn reset(&mut self) -> PageRequest {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
        info!(generation, "roster reset");

        self.phase = Phase::Loading;
        PageRequest {
            page: 1,
            generation,
        }
    }

    /// Apply the outcome of a request issued by [`Roster::request_next`]
    ///
    /// Returns the characters that were newly appended, so the caller can
    /// start loading their avatars.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<Option<CharactersPage>, ApiError>,
    ) -> Vec<Character> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale roster page");
            return Vec::new();
        }

        self.phase = Phase::Idle;
        match result {
            Ok(Some(page)) => self.merge(page),
            Ok(None) => {
                debug!(page = self.page + 1, "page request returned no result object");
                Vec::new()
            }
            Err(err) => {
                warn!(page = self.page + 1, error = %err, "roster page request failed");
                self.phase = Phase::Failed;
                Vec::new()
            }
        }
    }

    fn merge(&mut self, page: CharactersPage) -> Vec<Character> {
        let before = self.characters.len();
        self.characters = merge_page(&self.characters, page.results);
        self.page += 1;
        self.has_more = page.info.next.is_some();
        self.total = Some(page.info.count);

        let appended = self.characters[before..].to_vec();
        info!(
            page = self.page,
            appended = appended.len(),
            loaded = self.characters.len(),
            has_more = self.has_more,
            "merged roster page"
        );
        appended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{sample, PageInfo};

    fn page(ids: &[&str], next: Option<u32>) -> CharactersPage {
        CharactersPage {
            info: PageInfo { count: 826, next },
            results: ids.iter().map(|id| sample(id)).collect(),
        }
    }

    fn ids(roster: &Roster) -> Vec<&str> {
        roster.characters().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_two_pages_merge_without_duplicates() {
        let mut roster = Roster::new();

        let first = roster.request_next().unwrap();
        assert_eq!(first.page, 1);
        roster.complete(first.generation, Ok(Some(page(&["a", "b"], Some(2)))));
        assert!(roster.has_more());

        let second = roster.request_next().unwrap();
        assert_eq!(second.page, 2);
        let appended = roster.complete(second.generation, Ok(Some(page(&["b", "c"], None))));

        assert_eq!(ids(&roster), vec!["a", "b", "c"]);
        assert_eq!(appended.len(), 1);
        assert!(!roster.has_more());
        assert_eq!(roster.status(), RosterStatus::Exhausted);
        assert_eq!(roster.page(), 2);
    }

    #[test]
    fn test_merge_keeps_arrival_order_and_unique_ids() {
        let previous: Vec<Character> = ["x", "y"].iter().map(|id| sample(id)).collect();
        let incoming = ["y", "z", "z", "w", "x"].iter().map(|id| sample(id)).collect();

        let merged = merge_page(&previous, incoming);
        let merged_ids: Vec<&str> = merged.iter().map(|c| c.id.as_str()).collect();

        assert_eq!(merged_ids, vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn test_in_flight_request_blocks_another() {
        let mut roster = Roster::new();

        assert!(roster.request_next().is_some());
        assert!(roster.request_next().is_none());
        assert_eq!(roster.status(), RosterStatus::Loading);
    }

    #[test]
    fn test_exhausted_roster_requests_nothing() {
        let mut roster = Roster::new();
        let request = roster.request_next().unwrap();
        roster.complete(request.generation, Ok(Some(page(&["a"], None))));

        assert!(roster.request_next().is_none());
    }

    #[test]
    fn test_missing_result_leaves_roster_unchanged() {
        let mut roster = Roster::new();
        let request = roster.request_next().unwrap();
        roster.complete(request.generation, Ok(Some(page(&["a"], Some(2)))));

        let request = roster.request_next().unwrap();
        roster.complete(request.generation, Ok(None));

        assert_eq!(ids(&roster), vec!["a"]);
        assert_eq!(roster.page(), 1);
        assert_eq!(roster.status(), RosterStatus::Idle);
    }

    #[test]
    fn test_failure_sets_flag_and_allows_retry() {
        let mut roster = Roster::new();
        let request = roster.request_next().unwrap();
        roster.complete(
            request.generation,
            Err(ApiError::Transport("connection refused".into())),
        );

        assert_eq!(roster.status(), RosterStatus::Failed);
        assert!(roster.characters().is_empty());

        let retry = roster.request_next().unwrap();
        assert_eq!(retry.page, 1);
    }

    #[test]
    fn test_reset_drops_stale_completion() {
        let mut roster = Roster::new();
        let stale = roster.request_next().unwrap();

        let fresh = roster.reset();
        assert_eq!(fresh.page, 1);
        assert_ne!(fresh.generation, stale.generation);

        let appended = roster.complete(stale.generation, Ok(Some(page(&["old"], Some(2)))));
        assert!(appended.is_empty());
        assert!(roster.characters().is_empty());
        assert_eq!(roster.status(), RosterStatus::Loading);

        roster.complete(fresh.generation, Ok(Some(page(&["new"], Some(2)))));
        assert_eq!(ids(&roster), vec!["new"]);
    }

    #[test]
    fn test_many_overlapping_pages_stay_unique_and_ordered() {
        let mut roster = Roster::new();
        let mut expected: Vec<String> = Vec::new();

        for n in 0..10u32 {
            let request = roster.request_next().unwrap();
            // Each page repeats the last id of the previous one
            let page_ids: Vec<String> = (n * 3..n * 3 + 4).map(|i| format!("c{i}")).collect();
            for id in &page_ids {
                if !expected.contains(id) {
                    expected.push(id.clone());
                }
            }
            let refs: Vec<&str> = page_ids.iter().map(String::as_str).collect();
            roster.complete(request.generation, Ok(Some(page(&refs, Some(n + 2)))));
        }

        let mut unique = HashSet::new();
        assert!(roster.characters().iter().all(|c| unique.insert(c.id.clone())));
        assert_eq!(ids(&roster), expected.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
