//! Remote deck catalog and deck downloads.
//!
//! The catalog is a single YAML document listing deck names under `decks`.
//! Each deck is fetched from `<base>/<name>.yaml`, written verbatim into the
//! local deck directory, and then merged into a [`Collection`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::collection::Collection;
use crate::config;
use crate::error::{FlashdeckError, Result};
use crate::models::{DeckWarning, DownloadFailure};

#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    decks: Vec<String>,
}

/// Outcome of [`CatalogClient::download_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files written and merged, in request order.
    pub added: Vec<PathBuf>,
    /// Warnings from merging the downloaded files.
    pub warnings: Vec<DeckWarning>,
    pub failures: Vec<DownloadFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CatalogClient
// ---------------------------------------------------------------------------

/// Fetches the remote catalog and downloads decks from it.
#[derive(Clone)]
pub struct CatalogClient {
    pub base_url: String,
    pub catalog_url: String,
    /// If true, every request is refused.
    pub offline: bool,
    timeout: Duration,
    client: Option<Client>,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(config::DECK_BASE_URL, config::CATALOG_URL, false, Duration::from_secs(30))
    }
}

impl CatalogClient {
    pub fn new(
        base_url: impl Into<String>,
        catalog_url: impl Into<String>,
        offline: bool,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            catalog_url: catalog_url.into(),
            offline,
            timeout,
            client: None,
        }
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            self.client = Some(
                Client::builder()
                    .timeout(self.timeout)
                    .redirect(reqwest::redirect::Policy::limited(10))
                    .build()?,
            );
        }
        self.client
            .as_ref()
            .ok_or_else(|| FlashdeckError::InvalidArgument("HTTP client unavailable".into()))
    }

    /// Deck names listed by the remote catalog.
    pub fn fetch_catalog(&mut self) -> Result<Vec<String>> {
        if self.offline {
            return Err(FlashdeckError::Offline(format!(
                "cannot fetch catalog {}",
                self.catalog_url
            )));
        }
        let url = self.catalog_url.clone();
        log::info!("Fetching deck catalog {}", url);
        let body = self.client()?.get(&url).send()?.error_for_status()?.text()?;
        let document: Option<CatalogDocument> = serde_yaml::from_str(&body)?;
        Ok(document.unwrap_or_default().decks)
    }

    /// Download one deck to `<dest_dir>/<name>.yaml` and return that path.
    ///
    /// The body goes to a temp file that is renamed on success, so a failed
    /// download never leaves a partial deck behind.
    pub fn download_deck(&mut self, name: &str, dest_dir: &Path) -> Result<PathBuf> {
        validate_deck_name(name)?;
        if self.offline {
            return Err(FlashdeckError::Offline(format!("cannot download deck {}", name)));
        }

        let url = format!("{}/{}.yaml", self.base_url, name);
        let dest = dest_dir.join(format!("{}.yaml", name));
        let tmp_dest = dest_dir.join(format!("{}.yaml.tmp", name));
        log::info!("Downloading {}", url);

        let client = self.client()?.clone();
        let result = (|| -> Result<()> {
            fs::create_dir_all(dest_dir)?;
            let resp = client.get(&url).send()?.error_for_status()?;
            let bytes = resp.bytes()?;
            fs::write(&tmp_dest, &bytes)?;
            fs::rename(&tmp_dest, &dest)?;
            Ok(())
        })();

        match result {
            Ok(()) => Ok(dest),
            Err(e) => {
                let _ = fs::remove_file(&tmp_dest);
                Err(FlashdeckError::Download {
                    deck: name.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Download several decks one after another, merging each success into
    /// `collection` as soon as it lands.
    ///
    /// A failure is recorded and the batch carries on with the next name.
    pub fn download_batch<I, S>(
        &mut self,
        names: I,
        dest_dir: &Path,
        collection: &mut Collection,
    ) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BatchReport::default();
        for name in names {
            let name = name.as_ref();
            match self.download_deck(name, dest_dir) {
                Ok(path) => {
                    report.warnings.extend(collection.merge_deck_file(&path));
                    report.added.push(path);
                }
                Err(e) => {
                    let reason = match e {
                        FlashdeckError::Download { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    let failure = DownloadFailure {
                        deck: name.to_string(),
                        reason,
                    };
                    log::warn!("{}", failure);
                    report.failures.push(failure);
                }
            }
        }
        log::info!(
            "Downloaded {} deck file(s), {} failure(s)",
            report.added.len(),
            report.failures.len()
        );
        report
    }
}

/// Reject names that would escape the deck directory.
pub fn validate_deck_name(name: &str) -> Result<()> {
    let bad = name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.');
    if bad {
        return Err(FlashdeckError::InvalidArgument(format!(
            "invalid deck name '{}'",
            name
        )));
    }
    Ok(())
}
