#[derive(Debug, thiserror::Error)]
pub enum FlashdeckError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Deck '{0}' not found in the collection.")]
    DeckNotFound(String),

    #[error("No cards available in the deck '{0}'.")]
    EmptyDeck(String),

    #[error("Invalid interval: {0}s (must be between 1 and 60 seconds)")]
    InvalidInterval(u64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Offline mode is enabled: {0}")]
    Offline(String),

    #[error("Failed to download deck {deck}: {reason}")]
    Download { deck: String, reason: String },
}

pub type Result<T> = std::result::Result<T, FlashdeckError>;
