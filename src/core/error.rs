//! Error types for tracker operations.

use thiserror::Error;

/// Errors produced by the call-slot tracker and its ledger backends.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A data-access call against the ledger store failed. Admission paths
    /// treat this as "count unknown" and deny; lifecycle writes log it and
    /// let the caller's higher-level action proceed.
    #[error("ledger store unavailable: {0}")]
    StoreUnavailable(String),
    /// Backend-specific failure with context.
    #[error("backend error: {0}")]
    Backend(String),
    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
