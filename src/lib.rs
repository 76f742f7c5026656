//! Flashdeck: the engine behind a flashcard desktop widget.
//!
//! Shows a random question from user-selected decks, flips between question
//! and answer, and auto-advances on a timer. This crate holds everything but
//! the window:
//!
//! - [`repository`] discovers, parses and validates YAML deck files.
//! - [`collection`] merges same-named decks and draws random cards.
//! - [`session`] is the question/answer/auto-advance state machine.
//! - [`settings`] and [`catalog`] are the settings store and the remote deck
//!   catalog the widget talks to.
//!
//! # Quick start
//!
//! ```no_run
//! use flashdeck::{Event, Flashdeck};
//!
//! let mut deck = Flashdeck::builder().build().unwrap();
//! for effect in deck.start() {
//!     println!("{:?}", effect);
//! }
//! let effects = deck.handle(Event::Next).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod catalog;
pub mod collection;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod session;
pub mod settings;
#[cfg(feature = "async")]
pub mod timer;

#[cfg(feature = "async")]
pub use async_client::AsyncFlashdeck;
pub use catalog::{BatchReport, CatalogClient};
pub use collection::Collection;
pub use error::{FlashdeckError, Result};
pub use models::{Card, Deck, DeckWarning, DownloadFailure, WarningKind};
pub use repository::DeckRepository;
pub use session::{Effect, Event, Face, Session, SessionConfig, SessionState};
pub use settings::{JsonSettingsStore, MemorySettingsStore, Settings, SettingsStore};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// FlashdeckBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Flashdeck`] instance.
///
/// Use [`Flashdeck::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](FlashdeckBuilder::build).
pub struct FlashdeckBuilder {
    config_dir: Option<PathBuf>,
    store: Option<Box<dyn SettingsStore + Send>>,
    base_url: String,
    catalog_url: String,
    offline: bool,
    timeout: Duration,
    seed: Option<u64>,
    pause_on_flip: bool,
}

impl Default for FlashdeckBuilder {
    fn default() -> Self {
        Self {
            config_dir: None,
            store: None,
            base_url: config::DECK_BASE_URL.to_string(),
            catalog_url: config::CATALOG_URL.to_string(),
            offline: false,
            timeout: Duration::from_secs(30),
            seed: None,
            pause_on_flip: false,
        }
    }
}

impl FlashdeckBuilder {
    /// Set the config root. Decks are read from its `decks` subdirectory.
    ///
    /// Defaults to the platform config directory (e.g. `~/.config/flashdeck`
    /// on Linux).
    pub fn config_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a custom settings store instead of `settings.json` in the config
    /// root.
    pub fn settings_store<S: SettingsStore + Send + 'static>(mut self, store: S) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Point deck downloads at another base URL and catalog document.
    pub fn catalog_urls(mut self, base_url: impl Into<String>, catalog_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.catalog_url = catalog_url.into();
        self
    }

    /// Refuse all network access. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP timeout for catalog requests. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Seed every random source for reproducible draws.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pause auto-advance when a card is flipped by hand.
    pub fn pause_on_flip(mut self, pause: bool) -> Self {
        self.pause_on_flip = pause;
        self
    }

    /// Create the directories, load settings and scan the decks.
    ///
    /// Deck warnings from the initial scan are available through
    /// [`Flashdeck::warnings`].
    pub fn build(self) -> Result<Flashdeck> {
        let root = self.config_dir.unwrap_or_else(config::default_config_dir);
        let decks_dir = config::ensure_dirs(&root)?;
        let store = match self.store {
            Some(store) => store,
            None => Box::new(JsonSettingsStore::new(config::settings_path(&root))),
        };
        let settings = store.load()?;

        let repository = DeckRepository::new(&decks_dir);
        let (collection, warnings) = repository.scan_into(new_collection(self.seed))?;

        let session = Session::new(
            active_decks(&settings, &collection),
            SessionConfig {
                interval_secs: settings.update_interval,
                auto_advance: true,
                pause_on_flip: self.pause_on_flip,
                seed: self.seed.map(|s| s.wrapping_add(1)),
            },
        )?;

        let catalog = CatalogClient::new(self.base_url, self.catalog_url, self.offline, self.timeout);

        Ok(Flashdeck {
            decks_dir,
            repository,
            collection,
            session,
            settings,
            store,
            catalog,
            seed: self.seed,
            warnings,
        })
    }
}

/// The stored deck selection, or every deck when nothing is selected.
fn active_decks(settings: &Settings, collection: &Collection) -> Vec<String> {
    let selected = settings.selected_decks();
    if selected.is_empty() {
        collection.deck_names()
    } else {
        selected
    }
}

fn new_collection(seed: Option<u64>) -> Collection {
    match seed {
        Some(seed) => Collection::seeded(seed),
        None => Collection::new(),
    }
}

// ---------------------------------------------------------------------------
// Flashdeck
// ---------------------------------------------------------------------------

/// The widget engine: deck collection, session state machine, settings and
/// remote catalog behind one handle.
///
/// Created via [`Flashdeck::builder()`].
pub struct Flashdeck {
    decks_dir: PathBuf,
    repository: DeckRepository,
    collection: Collection,
    session: Session,
    settings: Settings,
    store: Box<dyn SettingsStore + Send>,
    catalog: CatalogClient,
    seed: Option<u64>,
    warnings: Vec<DeckWarning>,
}

impl Flashdeck {
    pub fn builder() -> FlashdeckBuilder {
        FlashdeckBuilder::default()
    }

    // -- Accessors ---------------------------------------------------------

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn decks_dir(&self) -> &Path {
        &self.decks_dir
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    /// Warnings from the most recent scan.
    pub fn warnings(&self) -> &[DeckWarning] {
        &self.warnings
    }

    // -- Session -----------------------------------------------------------

    /// Effects to apply once the host is ready (arms the timer).
    pub fn start(&self) -> Vec<Effect> {
        self.session.start()
    }

    /// Feed an event to the session.
    ///
    /// Active-deck and interval changes are validated and written to the
    /// settings store before the session sees them. If the save fails, the
    /// session and settings are left as they were.
    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>> {
        let mut settings = self.settings.clone();
        match &event {
            Event::ActiveDecksChanged(decks) => settings.set_selected_decks(decks),
            Event::IntervalChanged(seconds) => {
                if !config::interval_in_range(*seconds) {
                    return Err(FlashdeckError::InvalidInterval(*seconds));
                }
                settings.update_interval = *seconds;
            }
            _ => {}
        }
        if settings != self.settings {
            self.store.save(&settings)?;
        }
        self.settings = settings;
        self.session.handle(&self.collection, event)
    }

    // -- Decks -------------------------------------------------------------

    /// Rebuild the collection from the deck directory.
    ///
    /// The new collection replaces the old one only once the scan has
    /// finished; on error the old one is kept.
    pub fn rescan(&mut self) -> Result<&[DeckWarning]> {
        let (collection, warnings) = self.repository.scan_into(self.empty_collection())?;
        self.replace_collection(collection, warnings);
        Ok(&self.warnings)
    }

    /// An empty collection seeded like the one built at startup.
    pub fn empty_collection(&self) -> Collection {
        new_collection(self.seed)
    }

    /// Swap in a fully built collection and the warnings from building it.
    pub fn replace_collection(&mut self, collection: Collection, warnings: Vec<DeckWarning>) {
        self.collection = collection;
        self.warnings = warnings;
    }

    /// Fold already-validated decks into the collection.
    pub fn merge_decks(&mut self, decks: Vec<Deck>) {
        self.collection.extend(decks);
    }

    /// Merge one more deck file into the collection.
    pub fn add_deck_file<P: AsRef<Path>>(&mut self, path: P) -> Vec<DeckWarning> {
        self.collection.merge_deck_file(path)
    }

    /// Deck names offered by the remote catalog.
    pub fn fetch_catalog(&mut self) -> Result<Vec<String>> {
        self.catalog.fetch_catalog()
    }

    /// Download decks into the deck directory and merge each one that
    /// arrives. Failures are collected, not raised.
    pub fn download_decks<I, S>(&mut self, names: I) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.catalog
            .download_batch(names, &self.decks_dir, &mut self.collection)
    }

    // -- Settings ----------------------------------------------------------

    /// Apply a change to the settings and save them.
    ///
    /// The interval is validated before anything is saved; on
    /// [`FlashdeckError::InvalidInterval`] nothing is changed. Other values
    /// are sanitized. Once saved, a changed interval or deck selection is
    /// pushed to the session.
    pub fn update_settings<F: FnOnce(&mut Settings)>(&mut self, f: F) -> Result<Vec<Effect>> {
        let mut settings = self.settings.clone();
        f(&mut settings);
        if !config::interval_in_range(settings.update_interval) {
            return Err(FlashdeckError::InvalidInterval(settings.update_interval));
        }
        let settings = settings.sanitized();
        self.store.save(&settings)?;

        let mut effects = Vec::new();
        if settings.update_interval != self.session.interval_secs() {
            effects.extend(self.session.set_interval(settings.update_interval)?);
        }
        if settings.selected_decks() != self.settings.selected_decks() {
            effects.extend(
                self.session
                    .set_active_decks(active_decks(&settings, &self.collection)),
            );
        }
        self.settings = settings;
        Ok(effects)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Flashdeck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Flashdeck(decks_dir={}, decks=[{}], active={}, offline={})",
            self.decks_dir.display(),
            self.collection.deck_names().join(", "),
            self.session.active_decks().len(),
            self.catalog.offline
        )
    }
}
