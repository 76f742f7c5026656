//! Async wrapper around [`Flashdeck`] for use in async runtimes (Tokio, etc.).
//!
//! Directory scans, deck merges and downloads do blocking file and network
//! I/O, so they run on the blocking thread pool via
//! [`tokio::task::spawn_blocking`]. The work happens outside the state lock
//! and the result is swapped in under a short lock, so readers see either the
//! previous collection or the fully updated one.
//!
//! Scans, merges and downloads also pass through a writer gate: a second one
//! requested while another is in flight waits for it to finish.
//!
//! # Example
//!
//! ```no_run
//! use flashdeck::{AsyncFlashdeck, Event, Flashdeck};
//!
//! #[tokio::main]
//! async fn main() {
//!     let deck = AsyncFlashdeck::build(Flashdeck::builder()).await.unwrap();
//!     let effects = deck.handle(Event::Next).await.unwrap();
//!     let warnings = deck.rescan().await.unwrap();
//! }
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::catalog::BatchReport;
use crate::error::{FlashdeckError, Result};
use crate::models::{DeckWarning, DownloadFailure};
use crate::repository::{self, DeckRepository};
use crate::session::{Effect, Event};
use crate::{Flashdeck, FlashdeckBuilder};

/// Async wrapper around [`Flashdeck`].
///
/// The underlying [`Flashdeck`] is protected by a [`Mutex`] since its
/// collection keeps its random source in a `RefCell`.
#[derive(Clone)]
pub struct AsyncFlashdeck {
    inner: Arc<Mutex<Flashdeck>>,
    writer: Arc<tokio::sync::Mutex<()>>,
}

impl AsyncFlashdeck {
    /// Build the engine on the blocking pool (directory setup, settings load
    /// and the initial scan all touch the disk).
    pub async fn build(builder: FlashdeckBuilder) -> Result<Self> {
        let deck = blocking(move || builder.build()).await?;
        Ok(Self {
            inner: Arc::new(Mutex::new(deck)),
            writer: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Run a sync operation against the engine on the blocking pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Flashdeck) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        blocking(move || {
            let mut guard = lock(&inner)?;
            f(&mut guard)
        })
        .await
    }

    /// Feed an event to the session. Never blocks on a scan in flight.
    pub async fn handle(&self, event: Event) -> Result<Vec<Effect>> {
        self.run(move |d| d.handle(event)).await
    }

    /// Effects to apply once the host is ready.
    pub async fn start(&self) -> Result<Vec<Effect>> {
        self.run(|d| Ok(d.start())).await
    }

    pub async fn deck_names(&self) -> Result<Vec<String>> {
        self.run(|d| Ok(d.collection().deck_names())).await
    }

    /// Rescan the deck directory and swap in the new collection.
    pub async fn rescan(&self) -> Result<Vec<DeckWarning>> {
        let _gate = self.writer.lock().await;
        let (dir, empty) = self
            .run(|d| Ok((d.decks_dir().to_path_buf(), d.empty_collection())))
            .await?;
        let (collection, warnings) =
            blocking(move || DeckRepository::new(dir).scan_into(empty)).await?;
        self.run(move |d| {
            d.replace_collection(collection, warnings.clone());
            Ok(warnings)
        })
        .await
    }

    /// Parse one deck file off the lock, then merge it in one step.
    pub async fn add_deck_file(&self, path: PathBuf) -> Result<Vec<DeckWarning>> {
        let _gate = self.writer.lock().await;
        let (decks, warnings) = blocking(move || Ok(repository::load_deck_file(&path))).await?;
        self.run(move |d| {
            d.merge_decks(decks);
            Ok(warnings)
        })
        .await
    }

    /// Download decks one after another, merging each as it arrives.
    ///
    /// A failed deck is recorded and the rest of the batch still runs.
    pub async fn download_decks(&self, names: Vec<String>) -> Result<BatchReport> {
        let _gate = self.writer.lock().await;
        let (catalog, dir) = self
            .run(|d| Ok((d.catalog().clone(), d.decks_dir().to_path_buf())))
            .await?;

        let mut report = BatchReport::default();
        let mut catalog = Some(catalog);
        for name in names {
            let mut client = catalog.take().ok_or_else(|| {
                FlashdeckError::InvalidArgument("catalog client unavailable".into())
            })?;
            let target = dir.clone();
            let deck_name = name.clone();
            let (client, outcome) = blocking(move || {
                let outcome = client
                    .download_deck(&deck_name, &target)
                    .map(|path| (repository::load_deck_file(&path), path));
                Ok((client, outcome))
            })
            .await?;
            catalog = Some(client);

            match outcome {
                Ok(((decks, warnings), path)) => {
                    self.run(move |d| {
                        d.merge_decks(decks);
                        Ok(())
                    })
                    .await?;
                    report.warnings.extend(warnings);
                    report.added.push(path);
                }
                Err(e) => {
                    let reason = match e {
                        FlashdeckError::Download { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    let failure = DownloadFailure { deck: name, reason };
                    log::warn!("{}", failure);
                    report.failures.push(failure);
                }
            }
        }
        // The blocking HTTP client must not be dropped on an async worker.
        if let Some(client) = catalog {
            blocking(move || {
                drop(client);
                Ok(())
            })
            .await?;
        }
        Ok(report)
    }

    /// Fetch the remote catalog's deck names.
    pub async fn fetch_catalog(&self) -> Result<Vec<String>> {
        let mut catalog = self.run(|d| Ok(d.catalog().clone())).await?;
        blocking(move || catalog.fetch_catalog()).await
    }
}

fn lock(inner: &Mutex<Flashdeck>) -> Result<std::sync::MutexGuard<'_, Flashdeck>> {
    inner
        .lock()
        .map_err(|_| FlashdeckError::InvalidArgument("Flashdeck lock poisoned".into()))
}

async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| FlashdeckError::InvalidArgument(format!("Task join error: {e}")))?
}
