use clap::Parser;
use iced::widget::{column, image, scrollable};
use iced::{Element, Length, Task, Theme};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

mod api;
mod avatar;
mod config;
mod error;
mod state;
mod ui;

use api::GraphQlClient;
use config::{Args, Config};
use error::{ApiError, AppError, StorageError};
use state::data::{Character, CharactersPage};
use state::favorites::{Favorites, FavoritesAction};
use state::persist::{FavoritesStore, WriteOutcome};
use state::roster::{PageRequest, Roster};
use state::storage::SqliteStorage;
use ui::tabs::Tab;

/// Main application state
///
/// Owns every piece of state; views borrow it and mutations only happen
/// in `update`.
struct RosterApp {
    config: Config,
    /// GraphQL endpoint client
    client: GraphQlClient,
    /// Persisted favorites snapshot
    store: FavoritesStore,
    /// Currently displayed screen
    tab: Tab,
    /// Characters paged in on the roster screen
    roster: Roster,
    favorites: Favorites,
    /// Set once the persisted snapshot has been read (or failed to)
    favorites_hydrated: bool,
    /// A clear happened before hydration; the stale snapshot is ignored
    discard_hydration: bool,
    /// Favorites changed before hydration; written once it lands
    unsaved_changes: bool,
    /// Bumped on every favorites mutation, orders persistence writes
    favorites_revision: u64,
    /// Decoded avatars by character id
    avatars: HashMap<String, image::Handle>,
    /// Ids whose avatar has been requested this session
    avatar_requests: HashSet<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User picked a tab
    TabSelected(Tab),
    /// Roster list scrolled
    RosterScrolled(scrollable::Viewport),
    /// User asked for the next page explicitly
    LoadMore,
    /// User asked to start the roster over
    Refresh,
    /// A page request finished
    PageLoaded {
        generation: u64,
        result: Result<Option<CharactersPage>, ApiError>,
    },
    AddFavorite(Character),
    RemoveFavorite(String),
    ClearFavorites,
    /// Startup read of the persisted favorites finished
    FavoritesLoaded(Result<Vec<Character>, StorageError>),
    /// A favorites write finished
    FavoritesPersisted(Result<WriteOutcome, StorageError>),
    /// An avatar download (or cache read) finished
    AvatarLoaded(String, Result<Vec<u8>, ApiError>),
}

/// A favorites write decided in `update`, run off the UI thread
#[derive(Debug, Clone, PartialEq)]
enum FavoritesWrite {
    Save { revision: u64, list: Vec<Character> },
    Delete { revision: u64 },
}

impl FavoritesWrite {
    async fn run(self, store: FavoritesStore) -> Result<WriteOutcome, StorageError> {
        match self {
            FavoritesWrite::Save { revision, list } => store.save(revision, list).await,
            FavoritesWrite::Delete { revision } => store.clear(revision).await,
        }
    }
}

impl RosterApp {
    /// Create a new instance of the application
    ///
    /// Starts hydrating favorites and fetching the first page at once;
    /// the UI renders an empty favorites list until hydration lands.
    fn new(config: Config, client: GraphQlClient, store: FavoritesStore) -> (Self, Task<Message>) {
        let favorites = Favorites::new(config.max_favorites);
        let mut app = RosterApp {
            config,
            client,
            store,
            tab: Tab::default(),
            roster: Roster::new(),
            favorites,
            favorites_hydrated: false,
            discard_hydration: false,
            unsaved_changes: false,
            favorites_revision: 0,
            avatars: HashMap::new(),
            avatar_requests: HashSet::new(),
        };

        let hydrate = Task::perform(app.store.clone().load(), Message::FavoritesLoaded);
        let first_page = app.load_more();

        (app, Task::batch([hydrate, first_page]))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.tab = tab;
                Task::none()
            }
            Message::RosterScrolled(viewport) => {
                if self.roster.has_more()
                    && ui::roster_screen::is_near_end(viewport.relative_offset().y)
                {
                    self.load_more()
                } else {
                    Task::none()
                }
            }
            Message::LoadMore => self.load_more(),
            Message::Refresh => {
                let request = self.roster.reset();
                self.fetch(request)
            }
            Message::PageLoaded { generation, result } => {
                let appended = self.roster.complete(generation, result);
                self.load_avatars(&appended)
            }
            Message::AddFavorite(character) => {
                let write = self.apply_favorites(FavoritesAction::Add(character));
                self.persist(write)
            }
            Message::RemoveFavorite(id) => {
                let write = self.apply_favorites(FavoritesAction::Remove(id));
                self.persist(write)
            }
            Message::ClearFavorites => {
                let write = self.apply_favorites(FavoritesAction::Clear);
                self.persist(write)
            }
            Message::FavoritesLoaded(result) => {
                let write = self.finish_hydration(result);
                let list = self.favorites.list().to_vec();
                let avatars = self.load_avatars(&list);
                Task::batch([self.persist(write), avatars])
            }
            Message::FavoritesPersisted(result) => {
                match result {
                    Ok(WriteOutcome::Committed(revision)) => {
                        debug!(revision, "favorites persisted");
                    }
                    Ok(WriteOutcome::Stale(revision)) => {
                        debug!(revision, "favorites write superseded");
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to persist favorites");
                    }
                }
                Task::none()
            }
            Message::AvatarLoaded(id, result) => {
                match result {
                    Ok(bytes) => {
                        self.avatars.insert(id, image::Handle::from_bytes(bytes));
                    }
                    Err(e) => {
                        debug!(id = %id, error = %e, "avatar unavailable");
                    }
                }
                Task::none()
            }
        }
    }

    /// Claim and fetch the next roster page if the roster allows it
    fn load_more(&mut self) -> Task<Message> {
        match self.roster.request_next() {
            Some(request) => self.fetch(request),
            None => Task::none(),
        }
    }

    fn fetch(&self, request: PageRequest) -> Task<Message> {
        let generation = request.generation;
        Task::perform(
            self.client.clone().fetch_page(request.page),
            move |result| Message::PageLoaded { generation, result },
        )
    }

    /// Run a favorites action and decide which write it needs
    ///
    /// Before hydration nothing is written: the startup read may still be
    /// pending, and a write landing first would replace the snapshot it is
    /// about to return. The change is flushed by `finish_hydration`.
    fn apply_favorites(&mut self, action: FavoritesAction) -> Option<FavoritesWrite> {
        let clearing = matches!(action, FavoritesAction::Clear);

        let next = self.favorites.reduce(action);
        if next == self.favorites && !clearing {
            return None;
        }
        self.favorites = next;

        if clearing {
            info!("favorites cleared");
            if !self.favorites_hydrated {
                self.discard_hydration = true;
            }
        }

        if !self.favorites_hydrated {
            debug!("deferring favorites write until hydration");
            self.unsaved_changes = true;
            return None;
        }
        Some(self.next_write(clearing))
    }

    /// Fold the startup read into memory and decide whether to rewrite it
    fn finish_hydration(
        &mut self,
        result: Result<Vec<Character>, StorageError>,
    ) -> Option<FavoritesWrite> {
        self.favorites_hydrated = true;
        let unsaved = std::mem::take(&mut self.unsaved_changes);

        match result {
            Ok(_) if self.discard_hydration => {
                debug!("favorites cleared before hydration, ignoring snapshot");
                let delete = self.favorites.is_empty();
                Some(self.next_write(delete))
            }
            Ok(persisted) => {
                let hydrated = self
                    .favorites
                    .reduce(FavoritesAction::Hydrate(persisted.clone()));
                // Rewrite only when the snapshot on disk no longer matches memory
                let rewrite = hydrated.list() != persisted.as_slice();
                self.favorites = hydrated;
                rewrite.then(|| self.next_write(false))
            }
            Err(e) => {
                warn!(error = %e, "could not read persisted favorites, starting empty");
                if unsaved {
                    let delete = self.favorites.is_empty();
                    Some(self.next_write(delete))
                } else {
                    None
                }
            }
        }
    }

    /// Snapshot the current favorites into a write at the next revision
    fn next_write(&mut self, delete: bool) -> FavoritesWrite {
        self.favorites_revision += 1;
        let revision = self.favorites_revision;

        if delete {
            FavoritesWrite::Delete { revision }
        } else {
            FavoritesWrite::Save {
                revision,
                list: self.favorites.list().to_vec(),
            }
        }
    }

    /// Spawn a favorites write, reporting back through `FavoritesPersisted`
    fn persist(&self, write: Option<FavoritesWrite>) -> Task<Message> {
        match write {
            Some(write) => Task::perform(
                write.run(self.store.clone()),
                Message::FavoritesPersisted,
            ),
            None => Task::none(),
        }
    }

    /// Request avatars for characters not seen yet this session
    fn load_avatars(&mut self, characters: &[Character]) -> Task<Message> {
        let Some(avatars) = &self.config.avatars else {
            return Task::none();
        };

        let mut tasks = Vec::new();
        for character in characters {
            if !self.avatar_requests.insert(character.id.clone()) {
                continue;
            }
            let id = character.id.clone();
            tasks.push(Task::perform(
                avatar::load_avatar(
                    self.client.http().clone(),
                    avatars.cache_dir.clone(),
                    id.clone(),
                    character.image.clone(),
                ),
                move |result| Message::AvatarLoaded(id.clone(), result),
            ));
        }

        Task::batch(tasks)
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let screen = match self.tab {
            Tab::Characters => {
                ui::roster_screen::view(&self.roster, &self.favorites, &self.avatars)
            }
            Tab::Favorites => ui::favorites_screen::view(
                &self.favorites,
                self.favorites_hydrated,
                &self.avatars,
            ),
        };

        column![ui::tabs::tab_bar(self.tab, self.favorites.len()), screen]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_args(&args)?;
    info!(?config, "starting roster");

    let storage = SqliteStorage::open(&config.db_path)?;
    info!(path = %storage.path().display(), "favorites database ready");
    let store = FavoritesStore::new(Arc::new(storage));

    let client = GraphQlClient::new(config.endpoint.clone(), config.request_timeout)?;
    info!(endpoint = client.endpoint(), "graphql client ready");

    iced::application("Roster", RosterApp::update, RosterApp::view)
        .theme(RosterApp::theme)
        .window_size((1100.0, 800.0))
        .centered()
        .run_with(move || RosterApp::new(config, client, store))?;

    Ok(())
}
