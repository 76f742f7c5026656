//! In-memory registry of decks with uniform random card draw.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::{FlashdeckError, Result};
use crate::models::{Card, Deck, DeckWarning};
use crate::repository;

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Ordered registry of deck name -> cards.
///
/// Deck names are unique. Adding a deck whose name is already present appends
/// its cards to the existing deck, never replacing them. Deck order is the
/// order in which each name was first seen.
///
/// The random source sits behind a `RefCell` so draws can be made through a
/// shared reference; seed it with [`Collection::seeded`] for reproducible
/// draws.
pub struct Collection {
    decks: Vec<Deck>,
    index: HashMap<String, usize>,
    rng: RefCell<StdRng>,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    /// Create an empty collection with an entropy-seeded random source.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty collection with a deterministic random source.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            decks: Vec::new(),
            index: HashMap::new(),
            rng: RefCell::new(rng),
        }
    }

    /// Build a collection from decks already in memory, merging duplicates.
    pub fn from_decks<I: IntoIterator<Item = Deck>>(decks: I) -> Self {
        let mut collection = Self::new();
        collection.extend(decks);
        collection
    }

    // -- Queries -----------------------------------------------------------

    /// Deck names in first-encounter order.
    pub fn deck_names(&self) -> Vec<String> {
        self.decks.iter().map(|d| d.name.clone()).collect()
    }

    pub fn deck(&self, name: &str) -> Option<&Deck> {
        self.index.get(name).map(|&i| &self.decks[i])
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of decks.
    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    /// Total number of cards across all decks.
    pub fn card_count(&self) -> usize {
        self.decks.iter().map(|d| d.cards.len()).sum()
    }

    /// Draw a card uniformly at random from `deck_name`.
    ///
    /// Each call is an independent draw, so repeats are possible.
    ///
    /// # Errors
    ///
    /// * [`FlashdeckError::DeckNotFound`] if no deck has that name.
    /// * [`FlashdeckError::EmptyDeck`] if the deck exists but has no cards.
    pub fn random_card(&self, deck_name: &str) -> Result<Card> {
        let deck = self
            .deck(deck_name)
            .ok_or_else(|| FlashdeckError::DeckNotFound(deck_name.to_string()))?;
        let mut rng = self.rng.borrow_mut();
        deck.cards
            .choose(&mut *rng)
            .cloned()
            .ok_or_else(|| FlashdeckError::EmptyDeck(deck_name.to_string()))
    }

    // -- Mutation ----------------------------------------------------------

    /// Parse and validate one deck file and fold its decks in.
    ///
    /// Unrelated decks are left untouched. Problems with the file come back as
    /// warnings; nothing in the file is applied until it has been fully
    /// validated.
    pub fn merge_deck_file<P: AsRef<Path>>(&mut self, path: P) -> Vec<DeckWarning> {
        let (decks, warnings) = repository::load_deck_file(path.as_ref());
        self.extend(decks);
        warnings
    }

    /// Fold decks in, concatenating cards of same-named decks in order.
    pub fn extend<I: IntoIterator<Item = Deck>>(&mut self, decks: I) {
        for deck in decks {
            match self.index.get(&deck.name) {
                Some(&i) => self.decks[i].cards.extend(deck.cards),
                None => {
                    self.index.insert(deck.name.clone(), self.decks.len());
                    self.decks.push(deck);
                }
            }
        }
    }
}
