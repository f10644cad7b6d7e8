//! Timing tests for the polling wait loop.
//!
//! These use the real clock with a short poll interval, so bounds carry
//! generous slack for scheduler jitter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use call_slot_ledger::config::TrackerConfig;
use call_slot_ledger::core::CallSlotTracker;
use call_slot_ledger::infra::InMemoryLedger;
use call_slot_ledger::util::clock::now_ms;

const POLL_MS: u64 = 50;

fn tracker(max: u32) -> Arc<CallSlotTracker<InMemoryLedger>> {
    let config = TrackerConfig {
        max_concurrent_calls: max,
        poll_interval_ms: POLL_MS,
        default_wait_timeout_ms: 300,
        ..TrackerConfig::default()
    };
    Arc::new(CallSlotTracker::new(config, InMemoryLedger::new()))
}

#[tokio::test]
async fn returns_immediately_when_slots_are_free() {
    let tracker = tracker(2);
    let started = Instant::now();
    assert!(tracker.wait_for_slot(None).await);
    assert!(started.elapsed() < Duration::from_millis(POLL_MS));
}

#[tokio::test]
async fn times_out_when_no_slot_frees() {
    let tracker = tracker(1);
    tracker.record_start("campaign-1", "call-a", None, now_ms()).await.unwrap();

    let started = Instant::now();
    assert!(!tracker.wait_for_slot(Some(Duration::from_millis(200))).await);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(200), "gave up early: {elapsed:?}");
    // Worst case: timeout plus one full poll interval plus jitter.
    assert!(elapsed < Duration::from_millis(500), "overran timeout: {elapsed:?}");
}

#[tokio::test]
async fn wakes_within_one_poll_of_a_slot_freeing() {
    let tracker = tracker(1);
    tracker.record_start("campaign-1", "call-a", None, now_ms()).await.unwrap();

    let completer = Arc::clone(&tracker);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        completer.record_completion("call-a", Some(1), now_ms()).await;
    });

    let started = Instant::now();
    assert!(tracker.wait_for_slot(Some(Duration::from_secs(2))).await);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(100), "woke before the slot freed: {elapsed:?}");
    // The slot frees at ~120ms; the next poll lands within one interval.
    assert!(elapsed < Duration::from_millis(500), "missed the freed slot: {elapsed:?}");
}

#[tokio::test]
async fn default_timeout_comes_from_config() {
    let tracker = tracker(1);
    tracker.record_start("campaign-1", "call-a", None, now_ms()).await.unwrap();

    let started = Instant::now();
    assert!(!tracker.wait_for_slot(None).await);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(300), "ignored configured timeout: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(700), "overran configured timeout: {elapsed:?}");
}
