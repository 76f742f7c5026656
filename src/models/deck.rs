use std::fmt;
use std::path::PathBuf;

use super::card::Card;

// ---------------------------------------------------------------------------
// Deck: a named, ordered sequence of cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub name: String,
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(name: impl Into<String>, cards: Vec<Card>) -> Self {
        Self {
            name: name.into(),
            cards,
        }
    }
}

// ---------------------------------------------------------------------------
// DeckWarning: a recovered, per-file data-quality problem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The file could not be read or is not well-formed YAML.
    Parse,
    /// The file parsed but a file, deck record, or card has the wrong shape.
    Validation,
}

/// A problem found while loading a deck file. Never fatal: the offending unit
/// (file, deck record, or card) is skipped and loading continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckWarning {
    pub file: PathBuf,
    pub kind: WarningKind,
    pub reason: String,
}

impl DeckWarning {
    pub fn parse(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind: WarningKind::Parse,
            reason: reason.into(),
        }
    }

    pub fn validation(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind: WarningKind::Validation,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DeckWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string());
        match self.kind {
            WarningKind::Parse => write!(f, "Error processing file {}: {}", name, self.reason),
            WarningKind::Validation => write!(f, "Invalid deck format in file {}: {}", name, self.reason),
        }
    }
}

// ---------------------------------------------------------------------------
// DownloadFailure: one failed item of a download batch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFailure {
    pub deck: String,
    pub reason: String,
}

impl fmt::Display for DownloadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to download deck {}: {}", self.deck, self.reason)
    }
}
