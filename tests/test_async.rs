//! Async wrapper and ticker tests.

#![cfg(feature = "async")]

mod common;

use std::time::Duration;

use flashdeck::timer::Ticker;
use flashdeck::{AsyncFlashdeck, Effect, Event, Flashdeck, SessionState};
use tokio::time::timeout;

async fn build(root: &std::path::Path) -> AsyncFlashdeck {
    AsyncFlashdeck::build(Flashdeck::builder().config_dir(root).seed(4))
        .await
        .unwrap()
}

#[tokio::test]
async fn handle_runs_events_through_the_session() {
    let root = common::config_root(&[("geo.yaml", common::GEO_YAML)]);
    let deck = build(root.path()).await;

    let effects = deck.handle(Event::Next).await.unwrap();
    assert!(matches!(effects[0], Effect::ShowCard { .. }));
    let state = deck.run(|d| Ok(d.session().state())).await.unwrap();
    assert_eq!(state, SessionState::ShowingQuestion);
}

#[tokio::test]
async fn rescan_swaps_in_complete_collection() {
    let root = common::config_root(&[("geo.yaml", common::GEO_YAML)]);
    let deck = build(root.path()).await;
    assert_eq!(deck.deck_names().await.unwrap(), vec!["geo"]);

    common::write_file(&root.path().join("decks"), "math.yaml", common::MATH_YAML);
    let warnings = deck.rescan().await.unwrap();
    assert!(warnings.is_empty());
    assert_eq!(deck.deck_names().await.unwrap(), vec!["geo", "math"]);
}

#[tokio::test]
async fn failed_rescan_keeps_the_engine_usable() {
    let root = common::config_root(&[("geo.yaml", common::GEO_YAML)]);
    let deck = build(root.path()).await;

    std::fs::remove_dir_all(root.path().join("decks")).unwrap();
    assert!(deck.rescan().await.is_err());

    assert_eq!(deck.deck_names().await.unwrap(), vec!["geo"]);
    let effects = deck.handle(Event::Next).await.unwrap();
    assert!(matches!(effects[0], Effect::ShowCard { .. }));
}

#[tokio::test]
async fn concurrent_merges_do_not_interleave() {
    let root = common::config_root(&[]);
    let deck = build(root.path()).await;
    let extra = tempfile::tempdir().unwrap();
    let a = common::write_file(
        extra.path(),
        "a.yaml",
        "decks:\n  - name: D\n    cards:\n      - [a1, x]\n      - [a2, x]\n",
    );
    let b = common::write_file(
        extra.path(),
        "b.yaml",
        "decks:\n  - name: D\n    cards:\n      - [b1, x]\n      - [b2, x]\n",
    );

    let (ra, rb) = tokio::join!(deck.add_deck_file(a), deck.add_deck_file(b));
    ra.unwrap();
    rb.unwrap();

    let fronts = deck
        .run(|d| {
            Ok(d.collection()
                .deck("D")
                .unwrap()
                .cards
                .iter()
                .map(|c| c.front().to_string())
                .collect::<Vec<_>>())
        })
        .await
        .unwrap();
    assert_eq!(fronts.len(), 4);
    let joined = fronts.join(",");
    assert!(joined == "a1,a2,b1,b2" || joined == "b1,b2,a1,a2", "{joined}");
}

#[tokio::test]
async fn download_batch_collects_failures() {
    let base = common::serve(&[("/geo.yaml", common::GEO_YAML)]);
    let root = common::config_root(&[]);
    let deck = AsyncFlashdeck::build(
        Flashdeck::builder()
            .config_dir(root.path())
            .catalog_urls(base.clone(), format!("{}/repo.yaml", base)),
    )
    .await
    .unwrap();

    let report = deck
        .download_decks(vec!["missing".into(), "geo".into()])
        .await
        .unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.added.len(), 1);
    assert_eq!(deck.deck_names().await.unwrap(), vec!["geo"]);
}

#[tokio::test(start_paused = true)]
async fn ticker_ticks_until_cancelled() {
    let mut ticker = Ticker::new();

    ticker.apply(&Effect::StartTimer(Duration::from_secs(10)));
    assert!(ticker.is_armed());
    assert_eq!(ticker.period(), Some(Duration::from_secs(10)));
    assert_eq!(ticker.next_tick().await, Event::Tick);
    assert_eq!(ticker.next_tick().await, Event::Tick);

    ticker.apply(&Effect::StopTimer);
    assert!(!ticker.is_armed());
    let pending = timeout(Duration::from_secs(60), ticker.next_tick()).await;
    assert!(pending.is_err());
}

#[tokio::test(start_paused = true)]
async fn rearming_replaces_the_period() {
    let mut ticker = Ticker::new();
    ticker.arm(Duration::from_secs(60));
    ticker.arm(Duration::from_secs(1));

    let start = tokio::time::Instant::now();
    assert_eq!(ticker.next_tick().await, Event::Tick);
    assert!(start.elapsed() < Duration::from_secs(60));
    ticker.cancel();
}

#[tokio::test(start_paused = true)]
async fn queued_tick_is_dropped_after_rearm() {
    let mut ticker = Ticker::new();
    ticker.arm(Duration::from_secs(1));
    // Let the first tick land in the queue without consuming it.
    tokio::time::sleep(Duration::from_millis(1500)).await;

    ticker.arm(Duration::from_secs(10));
    let start = tokio::time::Instant::now();
    assert_eq!(ticker.next_tick().await, Event::Tick);
    assert!(start.elapsed() >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn queued_tick_is_dropped_after_cancel() {
    let mut ticker = Ticker::new();
    ticker.arm(Duration::from_secs(1));
    tokio::time::sleep(Duration::from_millis(1500)).await;

    ticker.cancel();
    let pending = timeout(Duration::from_secs(30), ticker.next_tick()).await;
    assert!(pending.is_err());
}
