//! Widget settings and the store they are persisted through.
//!
//! Settings live in one `"UI"` section. The core treats the store as typed
//! key/value storage: missing keys take defaults, and the on-disk format is
//! the store's business.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Auto-advance period in seconds.
    pub update_interval: u64,
    pub window_opacity: f64,
    /// Comma-joined deck names; empty means every deck.
    pub selected_decks: String,
    /// Keep the widget above other windows.
    pub pin: bool,
    pub bg_color: String,
    pub text_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            update_interval: config::DEFAULT_INTERVAL_SECS,
            window_opacity: 1.0,
            selected_decks: String::new(),
            pin: false,
            bg_color: "#ff55ff".to_string(),
            text_color: "#000000".to_string(),
        }
    }
}

impl Settings {
    pub fn selected_decks(&self) -> Vec<String> {
        self.selected_decks
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn set_selected_decks<I, S>(&mut self, decks: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selected_decks = decks
            .into_iter()
            .map(|d| d.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
    }

    /// Replace out-of-range values with something usable.
    pub fn sanitized(mut self) -> Self {
        if !config::interval_in_range(self.update_interval) {
            log::warn!(
                "Stored update_interval {} is out of range; using {}",
                self.update_interval,
                config::DEFAULT_INTERVAL_SECS
            );
            self.update_interval = config::DEFAULT_INTERVAL_SECS;
        }
        if !self.window_opacity.is_finite() {
            self.window_opacity = 1.0;
        }
        self.window_opacity = self.window_opacity.clamp(0.0, 1.0);
        self
    }
}

// ---------------------------------------------------------------------------
// SettingsStore
// ---------------------------------------------------------------------------

pub trait SettingsStore {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(rename = "UI", default)]
    ui: Settings,
}

/// Settings stored as a JSON document on disk.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    /// Load settings, writing a default file first if none exists.
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            let settings = Settings::default();
            self.save(&settings)?;
            return Ok(settings);
        }
        let contents = fs::read_to_string(&self.path)?;
        let file: SettingsFile = serde_json::from_str(&contents)?;
        Ok(file.ui.sanitized())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = SettingsFile {
            ui: settings.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

/// In-memory store, for embedding and tests.
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: RefCell<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RefCell::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings> {
        Ok(self.settings.borrow().clone().sanitized())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        *self.settings.borrow_mut() = settings.clone();
        Ok(())
    }
}
