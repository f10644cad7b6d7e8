//! Postgres-backed ledger adapter (schema and interface stubs).

use async_trait::async_trait;

use crate::core::error::TrackerError;
use crate::core::record::{CallSlotRecord, NewCallSlot, RecordId};
use crate::core::store::{CompletionPatch, LedgerStore, OrderBy, RecordFilter};

/// Postgres ledger adapter placeholder.
///
/// Ships the table schema; the data path requires a runtime + client and is
/// left to the integration layer. Until wired, every operation reports a
/// backend error, which keeps admission failing closed.
#[derive(Default)]
pub struct PostgresLedger;

impl PostgresLedger {
    /// Create a new adapter.
    pub fn new() -> Self {
        Self
    }

    /// Migration statements for the call-slot table.
    pub fn migrations() -> &'static [&'static str] {
        &[
            r#"
CREATE TABLE IF NOT EXISTS campaign_call_slots (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    campaign_id TEXT NOT NULL,
    execution_id TEXT,
    provider_call_id TEXT NOT NULL,
    call_started_at TIMESTAMPTZ NOT NULL,
    call_completed_at TIMESTAMPTZ,
    call_duration_seconds BIGINT
);
CREATE INDEX IF NOT EXISTS idx_campaign_call_slots_active ON campaign_call_slots (call_started_at) WHERE call_completed_at IS NULL;
CREATE INDEX IF NOT EXISTS idx_campaign_call_slots_provider ON campaign_call_slots (provider_call_id);
CREATE INDEX IF NOT EXISTS idx_campaign_call_slots_campaign ON campaign_call_slots (campaign_id, call_started_at);
"#,
        ]
    }
}

#[async_trait]
impl LedgerStore for PostgresLedger {
    async fn insert(&self, _new: NewCallSlot) -> Result<RecordId, TrackerError> {
        Err(TrackerError::Backend(
            "postgres ledger not wired to database client".into(),
        ))
    }

    async fn update_where(
        &self,
        _filter: &RecordFilter,
        _patch: &CompletionPatch,
    ) -> Result<usize, TrackerError> {
        Err(TrackerError::Backend(
            "postgres ledger not wired to database client".into(),
        ))
    }

    async fn count_where(&self, _filter: &RecordFilter) -> Result<usize, TrackerError> {
        Err(TrackerError::Backend(
            "postgres ledger not wired to database client".into(),
        ))
    }

    async fn select_where(
        &self,
        _filter: &RecordFilter,
        _order: Option<OrderBy>,
    ) -> Result<Vec<CallSlotRecord>, TrackerError> {
        Err(TrackerError::Backend(
            "postgres ledger not wired to database client".into(),
        ))
    }
}
