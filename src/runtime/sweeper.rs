//! Recurring stale-slot reclamation.
//!
//! The tracker's `reclaim_stale` is a single sweep; this module runs it on
//! a schedule, independent of any single campaign, so slots leaked by
//! crashed workers are recovered even when no worker is actively calling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::core::store::LedgerStore;
use crate::core::tracker::CallSlotTracker;
use crate::util::clock::now_ms;

/// Periodic maintenance loop invoking [`CallSlotTracker::reclaim_stale`].
///
/// Store failures are logged and retried on the next tick. The first sweep
/// runs immediately, recovering slots left over from a previous process.
///
/// # Example
///
/// ```rust,ignore
/// let sweeper = ReclaimSweeper::new(Arc::clone(&tracker), Duration::from_secs(300));
/// let handle = sweeper.shutdown_handle();
/// tokio::spawn(sweeper.run());
/// // ... on shutdown:
/// handle.shutdown();
/// ```
pub struct ReclaimSweeper<S> {
    tracker: Arc<CallSlotTracker<S>>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl<S: LedgerStore> ReclaimSweeper<S> {
    /// Create a sweeper over `tracker` ticking every `interval`.
    pub fn new(tracker: Arc<CallSlotTracker<S>>, interval: Duration) -> Self {
        Self {
            tracker,
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle that stops the sweeper from another task.
    pub fn shutdown_handle(&self) -> SweeperHandle {
        SweeperHandle {
            notify: Arc::clone(&self.shutdown),
        }
    }

    /// Run until shut down. Each tick performs one reclamation sweep.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.tracker.reclaim_stale(now_ms()).await {
                        Ok(0) => {}
                        Ok(reclaimed) => {
                            tracing::info!(reclaimed, "sweep reclaimed stale call slots");
                        }
                        Err(e) => {
                            tracing::error!("reclamation sweep failed, retrying next tick: {e}");
                        }
                    }
                }
                () = self.shutdown.notified() => {
                    tracing::info!("reclaim sweeper shutting down");
                    break;
                }
            }
        }
    }
}

/// Stops a running [`ReclaimSweeper`].
pub struct SweeperHandle {
    notify: Arc<Notify>,
}

impl SweeperHandle {
    /// Signal the sweeper to stop after its current tick.
    pub fn shutdown(&self) {
        // notify_one stores a permit, so a signal sent mid-sweep is not lost.
        self.notify.notify_one();
    }
}
