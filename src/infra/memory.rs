//! In-memory ledger backend for development and testing.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::error::TrackerError;
use crate::core::record::{CallSlotRecord, NewCallSlot, RecordId};
use crate::core::store::{CompletionPatch, LedgerStore, OrderBy, RecordFilter};

/// Ledger held in a process-local vector.
///
/// Multi-writer safe within one process via an internal mutex, with the same
/// filter semantics a SQL backend would provide. Records are appended in
/// insertion order and, matching the durable backends, never removed.
#[derive(Default)]
pub struct InMemoryLedger {
    rows: Mutex<Vec<CallSlotRecord>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row, in insertion order.
    pub fn records(&self) -> Vec<CallSlotRecord> {
        self.rows.lock().clone()
    }

    /// Insert a fully-specified row, bypassing id assignment. Lets tests
    /// seed backdated or pre-completed records.
    pub fn seed(&self, record: CallSlotRecord) {
        self.rows.lock().push(record);
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn insert(&self, new: NewCallSlot) -> Result<RecordId, TrackerError> {
        let id = uuid::Uuid::new_v4();
        self.rows.lock().push(CallSlotRecord {
            id,
            campaign_id: new.campaign_id,
            execution_id: new.execution_id,
            provider_call_id: new.provider_call_id,
            call_started_at_ms: new.call_started_at_ms,
            call_completed_at_ms: None,
            call_duration_secs: None,
        });
        Ok(id)
    }

    async fn update_where(
        &self,
        filter: &RecordFilter,
        patch: &CompletionPatch,
    ) -> Result<usize, TrackerError> {
        let mut rows = self.rows.lock();
        let mut affected = 0;
        for row in rows.iter_mut().filter(|r| filter.matches(r)) {
            row.call_completed_at_ms = Some(patch.completed_at_ms);
            if patch.duration_secs.is_some() {
                row.call_duration_secs = patch.duration_secs;
            }
            affected += 1;
        }
        Ok(affected)
    }

    async fn count_where(&self, filter: &RecordFilter) -> Result<usize, TrackerError> {
        Ok(self.rows.lock().iter().filter(|r| filter.matches(r)).count())
    }

    async fn select_where(
        &self,
        filter: &RecordFilter,
        order: Option<OrderBy>,
    ) -> Result<Vec<CallSlotRecord>, TrackerError> {
        let mut selected: Vec<CallSlotRecord> = self
            .rows
            .lock()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        match order {
            Some(OrderBy::StartedAtAsc) => {
                selected.sort_by_key(|r| r.call_started_at_ms);
            }
            Some(OrderBy::StartedAtDesc) => {
                selected.sort_by_key(|r| std::cmp::Reverse(r.call_started_at_ms));
            }
            None => {}
        }
        Ok(selected)
    }
}
