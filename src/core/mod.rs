//! Core tracker, ledger abstractions, and capacity accounting.

pub mod audit;
pub mod error;
pub mod record;
pub mod store;
pub mod tracker;

pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, PostgresAuditSink};
pub use error::{AppResult, TrackerError};
pub use record::{ActiveCallInfo, CallSlotRecord, NewCallSlot, RecordId, SlotStats};
pub use store::{CompletionPatch, LedgerStore, OrderBy, RecordFilter};
pub use tracker::CallSlotTracker;
