//! Call-slot record types and the read models derived from them.

use serde::{Deserialize, Serialize};

/// Opaque record identifier assigned by the ledger store on insert.
pub type RecordId = uuid::Uuid;

/// One attempted call as stored in the ledger.
///
/// A record is created at admission, mutated exactly once (normal or forced
/// completion), and never deleted. Among records with no completion
/// timestamp, `provider_call_id` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSlotRecord {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Owning campaign; grouping key for scoped queries.
    pub campaign_id: String,
    /// Correlation identifier of the workflow run that placed the call.
    pub execution_id: Option<String>,
    /// The provider's identifier for the call; matches completion events.
    pub provider_call_id: String,
    /// Admission timestamp, epoch milliseconds.
    pub call_started_at_ms: u128,
    /// Completion timestamp; `None` while the call is considered active.
    /// Once set it is never cleared.
    pub call_completed_at_ms: Option<u128>,
    /// Call duration in seconds, populated at completion or by the reclaimer.
    pub call_duration_secs: Option<u64>,
}

impl CallSlotRecord {
    /// Whether this record counts toward the active-call total at `now_ms`.
    ///
    /// Active means uncompleted and started within the staleness window; an
    /// older uncompleted row is presumed abandoned and does not hold a slot.
    pub fn is_active(&self, now_ms: u128, staleness_window_ms: u128) -> bool {
        self.call_completed_at_ms.is_none()
            && self.call_started_at_ms > now_ms.saturating_sub(staleness_window_ms)
    }
}

/// Insert payload for a new call-slot record. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCallSlot {
    /// Owning campaign.
    pub campaign_id: String,
    /// Correlation identifier of the triggering workflow run, if any.
    pub execution_id: Option<String>,
    /// The provider's identifier for the call.
    pub provider_call_id: String,
    /// Admission timestamp, epoch milliseconds.
    pub call_started_at_ms: u128,
}

/// Monitoring view of one active call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveCallInfo {
    /// Ledger record identifier.
    pub id: RecordId,
    /// Owning campaign.
    pub campaign_id: String,
    /// Correlation identifier of the triggering workflow run, if any.
    pub execution_id: Option<String>,
    /// The provider's identifier for the call.
    pub provider_call_id: String,
    /// Admission timestamp, epoch milliseconds.
    pub call_started_at_ms: u128,
    /// Whole minutes elapsed since the call started.
    pub elapsed_minutes: u64,
}

/// Utilization snapshot of the shared call capacity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotStats {
    /// Currently active calls (unscoped).
    pub active: usize,
    /// Free slots, saturating at zero.
    pub available: usize,
    /// Configured concurrency cap.
    pub max: u32,
    /// `active / max` as a rounded percentage.
    pub utilization_percent: u32,
}
