//! Catalog and download tests against a loopback HTTP server.

mod common;

use std::time::Duration;

use flashdeck::catalog::validate_deck_name;
use flashdeck::{CatalogClient, Collection, FlashdeckError};

fn client(base: &str) -> CatalogClient {
    CatalogClient::new(
        base,
        format!("{}/repo.yaml", base),
        false,
        Duration::from_secs(5),
    )
}

// ---------------------------------------------------------------------------
// fetch_catalog
// ---------------------------------------------------------------------------

#[test]
fn fetch_catalog_lists_deck_names() {
    let base = common::serve(&[("/repo.yaml", "decks:\n  - geo\n  - math\n")]);
    let names = client(&base).fetch_catalog().unwrap();
    assert_eq!(names, vec!["geo", "math"]);
}

#[test]
fn fetch_catalog_without_decks_key_is_empty() {
    let base = common::serve(&[("/repo.yaml", "title: nothing here\n")]);
    assert!(client(&base).fetch_catalog().unwrap().is_empty());
}

#[test]
fn fetch_catalog_http_error_is_raised() {
    let base = common::serve(&[]);
    let err = client(&base).fetch_catalog().unwrap_err();
    assert!(matches!(err, FlashdeckError::Http(_)), "{err}");
}

#[test]
fn offline_refuses_requests() {
    let tmp = tempfile::tempdir().unwrap();
    let mut catalog = CatalogClient::new("http://127.0.0.1:9", "http://127.0.0.1:9/repo.yaml", true, Duration::from_secs(1));
    assert!(matches!(catalog.fetch_catalog(), Err(FlashdeckError::Offline(_))));
    assert!(matches!(
        catalog.download_deck("geo", tmp.path()),
        Err(FlashdeckError::Offline(_))
    ));
}

// ---------------------------------------------------------------------------
// download_deck
// ---------------------------------------------------------------------------

#[test]
fn download_deck_writes_body_verbatim() {
    let base = common::serve(&[("/geo.yaml", common::GEO_YAML)]);
    let tmp = tempfile::tempdir().unwrap();

    let path = client(&base).download_deck("geo", tmp.path()).unwrap();
    assert_eq!(path, tmp.path().join("geo.yaml"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), common::GEO_YAML);
    assert!(!tmp.path().join("geo.yaml.tmp").exists());
}

#[test]
fn failed_download_leaves_no_file() {
    let base = common::serve(&[]);
    let tmp = tempfile::tempdir().unwrap();

    let err = client(&base).download_deck("geo", tmp.path()).unwrap_err();
    assert!(matches!(err, FlashdeckError::Download { ref deck, .. } if deck == "geo"));
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn deck_names_cannot_escape_the_directory() {
    for bad in ["", "../etc/passwd", "a/b", "a\\b", ".hidden"] {
        assert!(validate_deck_name(bad).is_err(), "{bad:?} accepted");
    }
    assert!(validate_deck_name("geo-europe_2").is_ok());
}

// ---------------------------------------------------------------------------
// download_batch
// ---------------------------------------------------------------------------

#[test]
fn batch_continues_past_failures_and_merges_successes() {
    let base = common::serve(&[
        ("/geo.yaml", common::GEO_YAML),
        ("/math.yaml", common::MATH_YAML),
        ("/broken.yaml", "decks: 5\n"),
    ]);
    let tmp = tempfile::tempdir().unwrap();
    let mut collection = Collection::seeded(1);

    let report = client(&base).download_batch(
        ["geo", "missing", "../evil", "math", "broken"],
        tmp.path(),
        &mut collection,
    );

    assert_eq!(report.added.len(), 3);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].deck, "missing");
    assert_eq!(report.failures[1].deck, "../evil");
    assert_eq!(report.warnings.len(), 1);
    assert!(!report.is_clean());

    assert_eq!(collection.deck_names(), vec!["geo", "math"]);
    assert_eq!(collection.card_count(), 3);
}
