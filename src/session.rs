//! Card session state machine.
//!
//! A [`Session`] decides which card is on screen, which face of it is
//! visible, and whether auto-advance is running. It is driven by discrete
//! [`Event`]s and answers each one with a list of [`Effect`]s for the host to
//! apply (redraw the label, arm or cancel the timer). It owns no timer and no
//! UI, so it can be exercised without either.
//!
//! Events are processed one at a time to completion; nothing here blocks.

use std::collections::BTreeSet;
use std::time::Duration;

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::collection::Collection;
use crate::config;
use crate::error::{FlashdeckError, Result};
use crate::models::Card;

pub const NO_DECKS_MESSAGE: &str = "No decks selected";

// ---------------------------------------------------------------------------
// States, events, effects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoCard,
    ShowingQuestion,
    ShowingAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Question,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The auto-advance timer fired.
    Tick,
    /// An explicit request for the next card, honored even while paused.
    Next,
    ManualFlip,
    Pause,
    Resume,
    /// Pause if running, resume if paused.
    TogglePause,
    ActiveDecksChanged(BTreeSet<String>),
    IntervalChanged(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show one face of the current card.
    ShowCard { text: String, face: Face },
    /// Show a message in place of a card.
    ShowMessage(String),
    /// (Re)arm the periodic timer with this period.
    StartTimer(Duration),
    /// Cancel the timer and any pending tick.
    StopTimer,
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub interval_secs: u64,
    pub auto_advance: bool,
    /// Pause auto-advance when the user flips a card by hand.
    pub pause_on_flip: bool,
    /// Seed for the active-deck choice; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval_secs: config::DEFAULT_INTERVAL_SECS,
            auto_advance: true,
            pause_on_flip: false,
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    state: SessionState,
    current: Option<Card>,
    active: BTreeSet<String>,
    auto_advance: bool,
    interval_secs: u64,
    pause_on_flip: bool,
    display: String,
    rng: StdRng,
}

impl Session {
    /// Create a session in `NoCard`.
    ///
    /// # Errors
    ///
    /// [`FlashdeckError::InvalidInterval`] if `config.interval_secs` is
    /// outside 1..=60.
    pub fn new<I, S>(active_decks: I, config: SessionConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !config::interval_in_range(config.interval_secs) {
            return Err(FlashdeckError::InvalidInterval(config.interval_secs));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            state: SessionState::NoCard,
            current: None,
            active: active_decks.into_iter().map(Into::into).collect(),
            auto_advance: config.auto_advance,
            interval_secs: config.interval_secs,
            pause_on_flip: config.pause_on_flip,
            display: String::new(),
            rng,
        })
    }

    // -- Accessors ---------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.current.as_ref()
    }

    /// Visible face, or `None` while there is no card.
    pub fn visible_face(&self) -> Option<Face> {
        match self.state {
            SessionState::NoCard => None,
            SessionState::ShowingQuestion => Some(Face::Question),
            SessionState::ShowingAnswer => Some(Face::Answer),
        }
    }

    pub fn active_decks(&self) -> &BTreeSet<String> {
        &self.active
    }

    pub fn auto_advance_enabled(&self) -> bool {
        self.auto_advance
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The text currently on screen (empty before anything was shown).
    pub fn display_text(&self) -> &str {
        &self.display
    }

    // -- Transition function -----------------------------------------------

    /// Effects to apply when the host comes up: arms the timer if
    /// auto-advance is on. Does not draw a card.
    pub fn start(&self) -> Vec<Effect> {
        if self.auto_advance {
            vec![Effect::StartTimer(self.interval())]
        } else {
            Vec::new()
        }
    }

    /// Feed one event through the state machine.
    ///
    /// Only [`Event::IntervalChanged`] can fail; every collection failure is
    /// turned into an [`Effect::ShowMessage`].
    pub fn handle(&mut self, collection: &Collection, event: Event) -> Result<Vec<Effect>> {
        let before = self.state;
        let effects = match event {
            Event::Tick => self.tick(collection),
            Event::Next => self.next(collection),
            Event::ManualFlip => self.manual_flip(),
            Event::Pause => self.pause(),
            Event::Resume => self.resume(collection),
            Event::TogglePause => self.toggle_pause(collection),
            Event::ActiveDecksChanged(decks) => self.set_active_decks(decks),
            Event::IntervalChanged(seconds) => self.set_interval(seconds)?,
        };
        log::debug!("session: {:?} -> {:?} ({} effect(s))", before, self.state, effects.len());
        Ok(effects)
    }

    /// Timer tick. Ignored while auto-advance is disabled, since a paused
    /// timer has no pending ticks.
    pub fn tick(&mut self, collection: &Collection) -> Vec<Effect> {
        if !self.auto_advance {
            log::debug!("session: ignoring tick while paused");
            return Vec::new();
        }
        self.draw(collection)
    }

    /// Draw a new card right away, whether or not auto-advance is running.
    pub fn next(&mut self, collection: &Collection) -> Vec<Effect> {
        self.draw(collection)
    }

    /// Toggle between question and answer of the current card.
    pub fn manual_flip(&mut self) -> Vec<Effect> {
        let card = match &self.current {
            Some(card) => card,
            None => return Vec::new(),
        };
        let (text, face, state) = match self.state {
            SessionState::ShowingQuestion => {
                (card.answer_text(), Face::Answer, SessionState::ShowingAnswer)
            }
            SessionState::ShowingAnswer => {
                (card.front().to_string(), Face::Question, SessionState::ShowingQuestion)
            }
            SessionState::NoCard => return Vec::new(),
        };

        let mut effects = Vec::new();
        if self.pause_on_flip && self.auto_advance {
            self.auto_advance = false;
            effects.push(Effect::StopTimer);
        }
        self.state = state;
        self.display = text.clone();
        effects.push(Effect::ShowCard { text, face });
        effects
    }

    /// Stop auto-advance without touching the card or face.
    pub fn pause(&mut self) -> Vec<Effect> {
        if !self.auto_advance {
            return Vec::new();
        }
        self.auto_advance = false;
        vec![Effect::StopTimer]
    }

    /// Restart auto-advance and immediately draw one card.
    pub fn resume(&mut self, collection: &Collection) -> Vec<Effect> {
        if self.auto_advance {
            return Vec::new();
        }
        self.auto_advance = true;
        let mut effects = vec![Effect::StartTimer(self.interval())];
        effects.extend(self.draw(collection));
        effects
    }

    pub fn toggle_pause(&mut self, collection: &Collection) -> Vec<Effect> {
        if self.auto_advance {
            self.pause()
        } else {
            self.resume(collection)
        }
    }

    /// Replace the active decks. Does not draw.
    pub fn set_active_decks<I, S>(&mut self, decks: I) -> Vec<Effect>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active = decks.into_iter().map(Into::into).collect();
        Vec::new()
    }

    /// Change the auto-advance period. A running timer is re-armed.
    ///
    /// # Errors
    ///
    /// [`FlashdeckError::InvalidInterval`] for values outside 1..=60; the
    /// session is left unchanged.
    pub fn set_interval(&mut self, seconds: u64) -> Result<Vec<Effect>> {
        if !config::interval_in_range(seconds) {
            return Err(FlashdeckError::InvalidInterval(seconds));
        }
        self.interval_secs = seconds;
        if self.auto_advance {
            Ok(vec![Effect::StartTimer(self.interval())])
        } else {
            Ok(Vec::new())
        }
    }

    // -- Helpers -----------------------------------------------------------

    /// Pick a random active deck, draw from it and land on the question face.
    ///
    /// A failed draw clears the current card and lands in `NoCard` with the
    /// error on screen, so a later flip cannot reveal a stale answer.
    fn draw(&mut self, collection: &Collection) -> Vec<Effect> {
        let deck_name = match self.active.iter().choose(&mut self.rng) {
            Some(name) => name.clone(),
            None => return vec![self.show_message(NO_DECKS_MESSAGE.to_string())],
        };
        match collection.random_card(&deck_name) {
            Ok(card) => {
                let text = card.front().to_string();
                self.current = Some(card);
                self.state = SessionState::ShowingQuestion;
                self.display = text.clone();
                vec![Effect::ShowCard {
                    text,
                    face: Face::Question,
                }]
            }
            Err(e) => {
                log::warn!("Could not draw from deck '{}': {}", deck_name, e);
                vec![self.show_message(e.to_string())]
            }
        }
    }

    fn show_message(&mut self, message: String) -> Effect {
        self.current = None;
        self.state = SessionState::NoCard;
        self.display = message.clone();
        Effect::ShowMessage(message)
    }
}
