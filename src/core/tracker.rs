//! The call-slot tracker: admission control, lifecycle tracking, stale
//! reclamation, and utilization reporting over a shared ledger.
//!
//! Every decision is derived from the ledger at the moment it is made.
//! Counts are never cached across admission decisions, since a stale count
//! directly weakens the concurrency bound this subsystem exists to provide.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::TrackerConfig;
use crate::core::audit::{build_audit_event, AuditSink};
use crate::core::error::TrackerError;
use crate::core::record::{ActiveCallInfo, NewCallSlot, RecordId, SlotStats};
use crate::core::store::{CompletionPatch, LedgerStore, OrderBy, RecordFilter};

/// Assumed average call duration, in minutes, for the wait-time heuristic.
const AVG_CALL_DURATION_MINUTES: u64 = 5;

/// Coordinates admission to a provider-enforced cap on concurrent outbound
/// calls, using a shared durable ledger as the only coordination channel.
///
/// The limiter is advisory: `can_admit` followed by `record_start` is two
/// store calls, so two workers can both observe the last free slot and both
/// proceed. The provider's own cap is the backstop. Callers wanting a hard
/// guarantee should move the count check into the store's insert (see
/// [`LedgerStore`]).
pub struct CallSlotTracker<S> {
    config: TrackerConfig,
    store: S,
    audit: Option<Arc<Mutex<Box<dyn AuditSink>>>>,
}

impl<S> CallSlotTracker<S> {
    /// Create a tracker over `store` with the given configuration.
    pub fn new(config: TrackerConfig, store: S) -> Self {
        Self {
            config,
            store,
            audit: None,
        }
    }

    /// Attach an audit sink recording start/complete/reclaim actions.
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// The configuration this tracker was built with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Record an audit event (sync operation with parking_lot mutex).
    fn record_audit(&self, provider_call_id: &str, campaign_id: &str, action: &str, now_ms: u128) {
        if let Some(audit_sink) = &self.audit {
            let mut sink = audit_sink.lock();
            sink.record(build_audit_event(
                format!("{provider_call_id}-{action}-{now_ms}"),
                provider_call_id,
                campaign_id,
                action,
                None,
            ));
        }
    }

    /// Filter selecting active rows: uncompleted, started within the
    /// staleness window, optionally scoped to one campaign.
    fn active_filter(&self, scope: Option<&str>, now_ms: u128) -> RecordFilter {
        let threshold = now_ms.saturating_sub(self.config.staleness_window_ms());
        let mut filter = RecordFilter::new().uncompleted().started_after(threshold);
        if let Some(campaign) = scope {
            filter = filter.campaign(campaign);
        }
        filter
    }
}

impl<S: LedgerStore> CallSlotTracker<S> {
    /// Count currently active calls.
    ///
    /// `scope` restricts the count to one campaign for reporting; admission
    /// always uses the unscoped count because the provider cap is global.
    /// Uncompleted rows older than the staleness window are excluded, so an
    /// abandoned row cannot hold a slot forever.
    pub async fn active_count(
        &self,
        scope: Option<&str>,
        now_ms: u128,
    ) -> Result<usize, TrackerError> {
        self.store
            .count_where(&self.active_filter(scope, now_ms))
            .await
    }

    /// Whether a new call may start now.
    ///
    /// Fails closed: if the ledger cannot be read the count is unknown, and
    /// an unknown count never admits past the cap.
    pub async fn can_admit(&self, now_ms: u128) -> bool {
        match self.active_count(None, now_ms).await {
            Ok(active) => active < self.config.max_concurrent_calls as usize,
            Err(e) => {
                tracing::error!("active-count lookup failed, denying admission: {e}");
                false
            }
        }
    }

    /// Record the start of an admitted call.
    ///
    /// Fails open: by this point the call may already be placed with the
    /// provider, so a storage failure must not fail the caller's placement.
    /// It is logged and surfaced as `None` ("tracking unavailable", not
    /// "admission denied").
    pub async fn record_start(
        &self,
        campaign_id: &str,
        provider_call_id: &str,
        execution_id: Option<&str>,
        now_ms: u128,
    ) -> Option<RecordId> {
        let new = NewCallSlot {
            campaign_id: campaign_id.to_owned(),
            execution_id: execution_id.map(str::to_owned),
            provider_call_id: provider_call_id.to_owned(),
            call_started_at_ms: now_ms,
        };
        match self.store.insert(new).await {
            Ok(id) => {
                tracing::info!(campaign = campaign_id, call = provider_call_id, "call start tracked");
                self.record_audit(provider_call_id, campaign_id, "start", now_ms);
                Some(id)
            }
            Err(e) => {
                tracing::error!(
                    campaign = campaign_id,
                    call = provider_call_id,
                    "failed to track call start: {e}"
                );
                None
            }
        }
    }

    /// Record the completion of a call.
    ///
    /// Sets the completion timestamp (and duration, if supplied) on the open
    /// record for `provider_call_id`. Idempotent: a repeat call matches zero
    /// rows and is a no-op. Returns false only on storage failure.
    pub async fn record_completion(
        &self,
        provider_call_id: &str,
        duration_secs: Option<u64>,
        now_ms: u128,
    ) -> bool {
        let filter = RecordFilter::new()
            .provider_call(provider_call_id)
            .uncompleted();
        let patch = CompletionPatch {
            completed_at_ms: now_ms,
            duration_secs,
        };
        match self.store.update_where(&filter, &patch).await {
            Ok(0) => {
                tracing::debug!(call = provider_call_id, "no open record; completion already tracked");
                true
            }
            Ok(_) => {
                tracing::info!(call = provider_call_id, "call completion tracked");
                self.record_audit(provider_call_id, "unknown", "complete", now_ms);
                true
            }
            Err(e) => {
                tracing::error!(call = provider_call_id, "failed to track call completion: {e}");
                false
            }
        }
    }

    /// Force-close every uncompleted record older than the staleness window
    /// and return the number reclaimed.
    ///
    /// This is the self-healing path for worker crashes and lost completion
    /// signals; without it, leaked slots deadlock admission at the cap. The
    /// reclaimed records get a duration equal to the full window. Intended
    /// to run on a recurring schedule (see [`crate::runtime`]).
    pub async fn reclaim_stale(&self, now_ms: u128) -> Result<usize, TrackerError> {
        let threshold = now_ms.saturating_sub(self.config.staleness_window_ms());
        let filter = RecordFilter::new().uncompleted().started_before(threshold);
        let patch = CompletionPatch {
            completed_at_ms: now_ms,
            duration_secs: Some(self.config.staleness_window_secs()),
        };
        let reclaimed = self.store.update_where(&filter, &patch).await?;
        if reclaimed > 0 {
            tracing::warn!(reclaimed, "force-closed stale call records");
            self.record_audit("stale-sweep", "unknown", "reclaim", now_ms);
        }
        Ok(reclaimed)
    }

    /// Utilization snapshot for monitoring.
    pub async fn stats(&self, now_ms: u128) -> Result<SlotStats, TrackerError> {
        let active = self.active_count(None, now_ms).await?;
        let max = self.config.max_concurrent_calls;
        let available = (max as usize).saturating_sub(active);
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let utilization_percent = ((active as f64 / f64::from(max)) * 100.0).round() as u32;
        Ok(SlotStats {
            active,
            available,
            max,
            utilization_percent,
        })
    }

    /// Detailed view of currently active calls, newest first.
    pub async fn active_calls(
        &self,
        scope: Option<&str>,
        now_ms: u128,
    ) -> Result<Vec<ActiveCallInfo>, TrackerError> {
        let records = self
            .store
            .select_where(&self.active_filter(scope, now_ms), Some(OrderBy::StartedAtDesc))
            .await?;
        Ok(records
            .into_iter()
            .map(|r| ActiveCallInfo {
                elapsed_minutes: elapsed_minutes(now_ms, r.call_started_at_ms),
                id: r.id,
                campaign_id: r.campaign_id,
                execution_id: r.execution_id,
                provider_call_id: r.provider_call_id,
                call_started_at_ms: r.call_started_at_ms,
            })
            .collect())
    }

    /// Heuristic estimate of the wait for the next free slot, in seconds.
    ///
    /// Zero when a slot is free. Otherwise takes the active call that
    /// started earliest (statistically the next to finish under a roughly
    /// uniform duration assumption) and returns the remainder of the
    /// assumed average duration, floored at one minute. A display hint, not
    /// a scheduling guarantee.
    pub async fn estimate_wait_secs(&self, now_ms: u128) -> Result<u64, TrackerError> {
        let active = self
            .store
            .select_where(&self.active_filter(None, now_ms), Some(OrderBy::StartedAtAsc))
            .await?;
        if active.len() < self.config.max_concurrent_calls as usize {
            return Ok(0);
        }
        let Some(oldest) = active.first() else {
            return Ok(0);
        };
        let elapsed = elapsed_minutes(now_ms, oldest.call_started_at_ms);
        let estimate_minutes = AVG_CALL_DURATION_MINUTES.saturating_sub(elapsed).max(1);
        Ok(estimate_minutes * 60)
    }
}

#[cfg(feature = "tokio-runtime")]
impl<S: LedgerStore> CallSlotTracker<S> {
    /// Block the calling task until a slot is free or `timeout` elapses.
    ///
    /// Cooperative polling loop: re-checks [`Self::can_admit`] every
    /// configured poll interval. Returns false on timeout, a normal,
    /// expected outcome rather than an error. With `timeout` of `None` the
    /// configured default applies.
    ///
    /// There is no push mechanism; polling a shared ledger is the only
    /// discovery channel workers have in common.
    pub async fn wait_for_slot(&self, timeout: Option<std::time::Duration>) -> bool {
        let timeout = timeout
            .unwrap_or_else(|| std::time::Duration::from_millis(self.config.default_wait_timeout_ms));
        let poll_interval = std::time::Duration::from_millis(self.config.poll_interval_ms);
        let started = std::time::Instant::now();

        while started.elapsed() < timeout {
            if self.can_admit(crate::util::clock::now_ms()).await {
                return true;
            }
            tokio::time::sleep(poll_interval).await;
        }

        tracing::debug!(?timeout, "timed out waiting for a call slot");
        false
    }
}

/// Whole minutes between two epoch-millisecond timestamps.
fn elapsed_minutes(now_ms: u128, started_ms: u128) -> u64 {
    u64::try_from(now_ms.saturating_sub(started_ms) / 60_000).unwrap_or(u64::MAX)
}
