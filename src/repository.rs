//! Deck discovery, parsing and validation.
//!
//! Scans a directory for YAML deck-definition files, validates each document
//! eagerly into typed [`Deck`]s, and folds them into a [`Collection`].
//! Data-quality problems never abort a scan: they become [`DeckWarning`]s
//! scoped to the smallest unit possible (card, then deck record, then file).

use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use flate2::read::GzDecoder;
use serde_yaml::Value;

use crate::collection::Collection;
use crate::config;
use crate::error::Result;
use crate::models::card::kind_of;
use crate::models::{Card, Deck, DeckWarning};

// ---------------------------------------------------------------------------
// DeckRepository
// ---------------------------------------------------------------------------

/// A directory of deck files.
///
/// The directory is expected to exist; see [`config::ensure_dirs`].
pub struct DeckRepository {
    directory: PathBuf,
}

impl DeckRepository {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// List the deck-definition files in the directory, sorted by file name.
    ///
    /// Non-recursive. Files that are not deck files are skipped silently.
    pub fn deck_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.is_file() && is_deck_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Scan the directory into a fresh [`Collection`].
    ///
    /// Only an unreadable directory is an error. Every per-file problem is
    /// returned in the warning list, in file order.
    pub fn scan(&self) -> Result<(Collection, Vec<DeckWarning>)> {
        self.scan_into(Collection::new())
    }

    /// Scan the directory into the given (normally empty, possibly seeded)
    /// collection.
    pub fn scan_into(&self, mut collection: Collection) -> Result<(Collection, Vec<DeckWarning>)> {
        log::debug!("Scanning decks in {}...", self.directory.display());
        let start = Instant::now();

        let files = self.deck_files()?;
        let mut warnings = Vec::new();
        for file in &files {
            let (decks, file_warnings) = load_deck_file(file);
            collection.extend(decks);
            warnings.extend(file_warnings);
        }

        let duration = start.elapsed().as_millis();
        log::info!(
            "Loaded {} deck(s) with {} card(s) from {} file(s) in {}ms ({} warning(s))",
            collection.len(),
            collection.card_count(),
            files.len(),
            duration,
            warnings.len()
        );
        Ok((collection, warnings))
    }
}

// ---------------------------------------------------------------------------
// File-level loading
// ---------------------------------------------------------------------------

/// Whether `path` names a deck-definition file: `*.yaml`, `*.yml`, or either
/// of those gzip-compressed (`*.yaml.gz`, `*.yml.gz`).
pub fn is_deck_file(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };
    let name = name.strip_suffix(".gz").unwrap_or(name);
    config::DECK_EXTENSIONS
        .iter()
        .any(|ext| name.len() > ext.len() + 1 && name.ends_with(&format!(".{}", ext)))
}

/// Read, parse and validate a single deck file.
///
/// Never fails: a file that cannot be read or parsed yields no decks and one
/// warning. Each warning is also logged.
pub fn load_deck_file(path: &Path) -> (Vec<Deck>, Vec<DeckWarning>) {
    let (decks, warnings) = match read_text(path) {
        Ok(text) => parse_deck_text(path, &text),
        Err(e) => (Vec::new(), vec![DeckWarning::parse(path, e.to_string())]),
    };
    for warning in &warnings {
        log::warn!("{}", warning);
    }
    (decks, warnings)
}

/// Parse deck YAML that is already in memory. `origin` only labels warnings.
pub fn parse_deck_text(origin: &Path, text: &str) -> (Vec<Deck>, Vec<DeckWarning>) {
    match serde_yaml::from_str::<Value>(text) {
        Ok(document) => validate_document(origin, &document),
        Err(e) => (Vec::new(), vec![DeckWarning::parse(origin, e.to_string())]),
    }
}

/// Read a deck file as text, transparently decompressing `.gz`.
fn read_text(path: &Path) -> std::io::Result<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("gz") {
        return fs::read_to_string(path);
    }
    let file = fs::File::open(path)?;
    let mut decoder = BufReader::new(GzDecoder::new(BufReader::new(file)));
    let mut contents = String::new();
    decoder.read_to_string(&mut contents)?;
    Ok(contents)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed document into typed decks.
///
/// The top level must be a mapping whose `decks` key holds a list; otherwise
/// the whole file is rejected. Bad deck records and bad cards are skipped one
/// by one.
fn validate_document(file: &Path, document: &Value) -> (Vec<Deck>, Vec<DeckWarning>) {
    let mut warnings = Vec::new();

    let records = match document {
        Value::Mapping(map) => match map.get("decks") {
            Some(Value::Sequence(records)) => records,
            Some(other) => {
                let reason = format!("'decks' must be a list, got {}", kind_of(other));
                return (Vec::new(), vec![DeckWarning::validation(file, reason)]);
            }
            None => {
                let reason = "top-level mapping has no 'decks' key";
                return (Vec::new(), vec![DeckWarning::validation(file, reason)]);
            }
        },
        other => {
            let reason = format!(
                "top-level value must be a mapping with 'decks', got {}",
                kind_of(other)
            );
            return (Vec::new(), vec![DeckWarning::validation(file, reason)]);
        }
    };

    let mut decks = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match validate_deck_record(file, index, record, &mut warnings) {
            Ok(deck) => decks.push(deck),
            Err(reason) => warnings.push(DeckWarning::validation(file, reason)),
        }
    }
    (decks, warnings)
}

fn validate_deck_record(
    file: &Path,
    index: usize,
    record: &Value,
    warnings: &mut Vec<DeckWarning>,
) -> std::result::Result<Deck, String> {
    let map = match record {
        Value::Mapping(map) => map,
        other => {
            return Err(format!(
                "deck record #{} must be a mapping, got {}",
                index + 1,
                kind_of(other)
            ))
        }
    };
    let name = match map.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        Some(Value::String(_)) => return Err(format!("deck record #{} has an empty name", index + 1)),
        Some(other) => {
            return Err(format!(
                "deck record #{} name must be a string, got {}",
                index + 1,
                kind_of(other)
            ))
        }
        None => return Err(format!("deck record #{} has no 'name'", index + 1)),
    };
    let records = match map.get("cards") {
        Some(Value::Sequence(records)) => records,
        Some(other) => {
            return Err(format!(
                "deck '{}' cards must be a list, got {}",
                name,
                kind_of(other)
            ))
        }
        None => return Err(format!("deck '{}' has no 'cards'", name)),
    };

    let mut cards = Vec::with_capacity(records.len());
    for (card_index, card) in records.iter().enumerate() {
        match Card::from_record(card) {
            Ok(card) => cards.push(card),
            Err(reason) => warnings.push(DeckWarning::validation(
                file,
                format!("deck '{}' card #{}: {}", name, card_index + 1, reason),
            )),
        }
    }
    Ok(Deck::new(name, cards))
}
