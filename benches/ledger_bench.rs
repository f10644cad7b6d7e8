//! Benchmarks for the call-slot ledger and admission path.
//!
//! Benchmarks cover:
//! - Ledger operations (insert/count/select under active-filtering)
//! - The admission decision (count + cap comparison)
//! - Full start/complete lifecycle round-trips
//! - Reclamation sweeps over mixed fresh/stale populations

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;

use call_slot_ledger::config::TrackerConfig;
use call_slot_ledger::core::{CallSlotTracker, LedgerStore, NewCallSlot, RecordFilter};
use call_slot_ledger::infra::InMemoryLedger;
use call_slot_ledger::util::clock::now_ms;

use tokio::runtime::Runtime;

const HOUR_MS: u128 = 3_600_000;

// ============================================================================
// Helper Functions
// ============================================================================

fn new_slot(n: u64, started_at_ms: u128) -> NewCallSlot {
    NewCallSlot {
        campaign_id: format!("campaign-{}", n % 10),
        execution_id: None,
        provider_call_id: format!("call-{n}"),
        call_started_at_ms: started_at_ms,
    }
}

// `stale_every` of 0 seeds no stale rows.
async fn populated_ledger(size: u64, stale_every: u64) -> Arc<InMemoryLedger> {
    let ledger = Arc::new(InMemoryLedger::new());
    let now = now_ms();
    for n in 0..size {
        let started = if stale_every > 0 && n % stale_every == 0 {
            now - 2 * HOUR_MS
        } else {
            now - u128::from(n % 50) * 1000
        };
        ledger.insert(new_slot(n, started)).await.unwrap();
    }
    ledger
}

// ============================================================================
// Ledger Benchmarks
// ============================================================================

fn bench_ledger_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_insert");

    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.to_async(Runtime::new().unwrap()).iter(|| async move {
                let ledger = InMemoryLedger::new();
                let now = now_ms();
                for n in 0..size {
                    ledger.insert(new_slot(n, now)).await.unwrap();
                }
                black_box(ledger);
            });
        });
    }
    group.finish();
}

fn bench_active_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_active_count");

    for size in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let rt = Runtime::new().unwrap();
            let ledger = rt.block_on(populated_ledger(size, 7));
            let filter = RecordFilter::new()
                .uncompleted()
                .started_after(now_ms() - HOUR_MS);
            b.to_async(&rt).iter(|| {
                let ledger = Arc::clone(&ledger);
                let filter = filter.clone();
                async move {
                    let count = ledger.count_where(&filter).await.unwrap();
                    black_box(count);
                }
            });
        });
    }
    group.finish();
}

// ============================================================================
// Admission and Lifecycle Benchmarks
// ============================================================================

fn bench_admission_decision(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission_decision");

    for active in [5, 500, 5_000] {
        group.bench_with_input(BenchmarkId::from_parameter(active), &active, |b, &active| {
            let rt = Runtime::new().unwrap();
            let ledger = rt.block_on(populated_ledger(active, 0));
            let tracker = Arc::new(CallSlotTracker::new(TrackerConfig::default(), ledger));
            b.to_async(&rt).iter(|| {
                let tracker = Arc::clone(&tracker);
                async move {
                    black_box(tracker.can_admit(now_ms()).await);
                }
            });
        });
    }
    group.finish();
}

fn bench_lifecycle_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle_round_trip");

    group.bench_function("start_then_complete", |b| {
        let rt = Runtime::new().unwrap();
        let tracker = Arc::new(CallSlotTracker::new(
            TrackerConfig::default(),
            InMemoryLedger::new(),
        ));
        let mut n = 0u64;
        b.to_async(&rt).iter(|| {
            let tracker = Arc::clone(&tracker);
            n += 1;
            let call_id = format!("call-{n}");
            async move {
                let now = now_ms();
                tracker.record_start("campaign-1", &call_id, None, now).await;
                black_box(tracker.record_completion(&call_id, Some(1), now).await);
            }
        });
    });
    group.finish();
}

// ============================================================================
// Reclamation Benchmarks
// ============================================================================

fn bench_reclaim_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("reclaim_sweep");

    for size in [100, 1_000, 5_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.to_async(Runtime::new().unwrap()).iter(|| async move {
                // Half the population is stale; the sweep closes it all.
                let ledger = populated_ledger(size, 2).await;
                let tracker = CallSlotTracker::new(TrackerConfig::default(), ledger);
                let reclaimed = tracker.reclaim_stale(now_ms()).await.unwrap();
                black_box(reclaimed);
            });
        });
    }
    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(ledger_benches, bench_ledger_insert, bench_active_count);

criterion_group!(
    tracker_benches,
    bench_admission_decision,
    bench_lifecycle_round_trip
);

criterion_group!(reclaim_benches, bench_reclaim_sweep);

criterion_main!(ledger_benches, tracker_benches, reclaim_benches);
