//! Ledger-store abstraction over the durable call-slot table.
//!
//! The concrete persistence technology lives behind [`LedgerStore`]; the
//! tracker only ever issues the four operations below, with predicates that
//! are conjunctions over campaign, completion state, start-time bounds, and
//! provider call id.

use async_trait::async_trait;

use crate::core::error::TrackerError;
use crate::core::record::{CallSlotRecord, NewCallSlot, RecordId};

/// Conjunctive row predicate for ledger queries.
///
/// Every clause left unset matches all rows. Clauses compose with builder
/// methods:
///
/// ```rust,ignore
/// let active = RecordFilter::new().uncompleted().started_after(threshold_ms);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// `campaign_id = X`.
    pub campaign_id: Option<String>,
    /// `call_completed_at IS NULL`.
    pub uncompleted: bool,
    /// `call_started_at > T` (strict).
    pub started_after_ms: Option<u128>,
    /// `call_started_at < T` (strict).
    pub started_before_ms: Option<u128>,
    /// `provider_call_id = X`.
    pub provider_call_id: Option<String>,
}

impl RecordFilter {
    /// Filter matching every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one campaign.
    pub fn campaign(mut self, id: impl Into<String>) -> Self {
        self.campaign_id = Some(id.into());
        self
    }

    /// Restrict to rows with no completion timestamp.
    pub fn uncompleted(mut self) -> Self {
        self.uncompleted = true;
        self
    }

    /// Restrict to rows started strictly after `ms`.
    pub fn started_after(mut self, ms: u128) -> Self {
        self.started_after_ms = Some(ms);
        self
    }

    /// Restrict to rows started strictly before `ms`.
    pub fn started_before(mut self, ms: u128) -> Self {
        self.started_before_ms = Some(ms);
        self
    }

    /// Restrict to one provider call id.
    pub fn provider_call(mut self, id: impl Into<String>) -> Self {
        self.provider_call_id = Some(id.into());
        self
    }

    /// Evaluate this filter against a record. Backends that hold rows in
    /// process (and tests) use this; SQL backends translate the clauses
    /// into a WHERE conjunction instead.
    pub fn matches(&self, record: &CallSlotRecord) -> bool {
        if let Some(ref campaign) = self.campaign_id {
            if record.campaign_id != *campaign {
                return false;
            }
        }
        if self.uncompleted && record.call_completed_at_ms.is_some() {
            return false;
        }
        if let Some(after) = self.started_after_ms {
            if record.call_started_at_ms <= after {
                return false;
            }
        }
        if let Some(before) = self.started_before_ms {
            if record.call_started_at_ms >= before {
                return false;
            }
        }
        if let Some(ref provider_id) = self.provider_call_id {
            if record.provider_call_id != *provider_id {
                return false;
            }
        }
        true
    }
}

/// Completion fields applied by [`LedgerStore::update_where`].
///
/// A patch only ever sets the completion timestamp; lifecycle is monotonic
/// and no patch can return a record to the active state.
#[derive(Debug, Clone, Copy)]
pub struct CompletionPatch {
    /// Completion timestamp to set, epoch milliseconds.
    pub completed_at_ms: u128,
    /// Duration to record, if known.
    pub duration_secs: Option<u64>,
}

/// Sort order for [`LedgerStore::select_where`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    /// Oldest start time first.
    StartedAtAsc,
    /// Newest start time first.
    StartedAtDesc,
}

/// Durable, multi-writer storage for call-slot records.
///
/// Implementations must be safe to call from many independent workers at
/// once; the tracker performs no coordination of its own. The read-count
/// then insert sequence in the tracker is deliberately not atomic. A store
/// wanting a hard concurrency guarantee can expose a conditional
/// "insert iff count < max" in its `insert` and reject with
/// [`TrackerError::Backend`], but none of the shipped backends do.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert a new record, returning the store-assigned id.
    async fn insert(&self, new: NewCallSlot) -> Result<RecordId, TrackerError>;

    /// Apply `patch` to every row matching `filter`; returns affected count.
    async fn update_where(
        &self,
        filter: &RecordFilter,
        patch: &CompletionPatch,
    ) -> Result<usize, TrackerError>;

    /// Count rows matching `filter`.
    async fn count_where(&self, filter: &RecordFilter) -> Result<usize, TrackerError>;

    /// Select rows matching `filter`, optionally ordered by start time.
    async fn select_where(
        &self,
        filter: &RecordFilter,
        order: Option<OrderBy>,
    ) -> Result<Vec<CallSlotRecord>, TrackerError>;
}

#[async_trait]
impl<T: LedgerStore + ?Sized> LedgerStore for std::sync::Arc<T> {
    async fn insert(&self, new: NewCallSlot) -> Result<RecordId, TrackerError> {
        (**self).insert(new).await
    }

    async fn update_where(
        &self,
        filter: &RecordFilter,
        patch: &CompletionPatch,
    ) -> Result<usize, TrackerError> {
        (**self).update_where(filter, patch).await
    }

    async fn count_where(&self, filter: &RecordFilter) -> Result<usize, TrackerError> {
        (**self).count_where(filter).await
    }

    async fn select_where(
        &self,
        filter: &RecordFilter,
        order: Option<OrderBy>,
    ) -> Result<Vec<CallSlotRecord>, TrackerError> {
        (**self).select_where(filter, order).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(campaign: &str, provider: &str, started: u128, completed: Option<u128>) -> CallSlotRecord {
        CallSlotRecord {
            id: uuid::Uuid::new_v4(),
            campaign_id: campaign.into(),
            execution_id: None,
            provider_call_id: provider.into(),
            call_started_at_ms: started,
            call_completed_at_ms: completed,
            call_duration_secs: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = RecordFilter::new();
        assert!(f.matches(&record("a", "p1", 100, None)));
        assert!(f.matches(&record("b", "p2", 200, Some(300))));
    }

    #[test]
    fn clauses_conjoin() {
        let f = RecordFilter::new()
            .campaign("a")
            .uncompleted()
            .started_after(100)
            .started_before(300);
        assert!(f.matches(&record("a", "p1", 200, None)));
        assert!(!f.matches(&record("b", "p1", 200, None)));
        assert!(!f.matches(&record("a", "p1", 200, Some(250))));
        assert!(!f.matches(&record("a", "p1", 50, None)));
        assert!(!f.matches(&record("a", "p1", 400, None)));
    }

    #[test]
    fn time_bounds_are_strict() {
        let f = RecordFilter::new().started_after(100).started_before(300);
        assert!(!f.matches(&record("a", "p1", 100, None)));
        assert!(!f.matches(&record("a", "p1", 300, None)));
        assert!(f.matches(&record("a", "p1", 101, None)));
    }

    #[test]
    fn provider_call_clause() {
        let f = RecordFilter::new().provider_call("p1");
        assert!(f.matches(&record("a", "p1", 100, None)));
        assert!(!f.matches(&record("a", "p2", 100, None)));
    }
}
