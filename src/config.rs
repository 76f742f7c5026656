use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "flashdeck";

pub const DECK_BASE_URL: &str = "https://raw.githubusercontent.com/house-of-vanity/pyji/master/decs";
pub const CATALOG_URL: &str = "https://raw.githubusercontent.com/house-of-vanity/pyji/master/decs/repo.yaml";

pub const SETTINGS_FILE: &str = "settings.json";
pub const DECKS_DIR: &str = "decks";

pub const DEFAULT_INTERVAL_SECS: u64 = 10;
pub const MIN_INTERVAL_SECS: u64 = 1;
pub const MAX_INTERVAL_SECS: u64 = 60;

/// Extensions (after the optional `.gz`) that mark a deck-definition file.
pub const DECK_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

pub fn default_config_dir() -> PathBuf {
    if let Some(config) = dirs::config_dir() {
        config.join(APP_NAME)
    } else {
        PathBuf::from(format!(".{}", APP_NAME))
    }
}

pub fn decks_dir(root: &Path) -> PathBuf {
    root.join(DECKS_DIR)
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

/// Create the config root and its `decks` subdirectory if missing.
///
/// The repository never creates directories itself; callers run this once at
/// startup before the first scan.
pub fn ensure_dirs(root: &Path) -> io::Result<PathBuf> {
    let decks = decks_dir(root);
    fs::create_dir_all(&decks)?;
    Ok(decks)
}

pub fn interval_in_range(seconds: u64) -> bool {
    (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&seconds)
}
