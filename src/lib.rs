//! # Call Slot Ledger
//!
//! Ledger-backed admission control for outbound campaign calls.
//!
//! This library coordinates access to an outbound calling provider that
//! enforces a hard cap on simultaneous in-flight calls, across many
//! independent worker processes that share nothing but a durable ledger.
//! Every admission decision derives from reads and writes against that
//! shared ledger; there is no central coordinator process.
//!
//! ## Core Problem Solved
//!
//! Horizontally-scaled call workers have no shared memory and no event bus,
//! yet collectively must stay under the provider's concurrency limit:
//!
//! - **Hard provider cap**: the provider rejects or queues calls beyond its
//!   documented concurrent-call limit
//! - **Crash recovery**: a worker that dies mid-call must not leak its slot
//!   forever
//! - **Polling discovery**: workers learn about freed slots by re-checking
//!   the ledger, not by push notification
//!
//! ## Key Features
//!
//! - **Slot accounting**: counts active (started, uncompleted, non-stale)
//!   call records straight from the ledger on every decision
//! - **Admission control**: `can_admit` plus a blocking `wait_for_slot`
//!   polling loop with a caller-overridable timeout
//! - **Lifecycle tracking**: one ledger record per admitted call, completed
//!   exactly once, never deleted
//! - **Stale reclamation**: a sweeper force-closes records older than the
//!   staleness window, recovering slots abandoned by crashed workers
//! - **Utilization reporting**: capacity stats and a heuristic wait-time
//!   estimate for monitoring surfaces
//!
//! ## Example
//!
//! ```rust,ignore
//! use call_slot_ledger::config::TrackerConfig;
//! use call_slot_ledger::core::CallSlotTracker;
//! use call_slot_ledger::infra::InMemoryLedger;
//! use call_slot_ledger::util::clock::now_ms;
//!
//! let tracker = CallSlotTracker::new(TrackerConfig::default(), InMemoryLedger::new());
//!
//! if tracker.wait_for_slot(None).await {
//!     // place the call with the provider, then:
//!     let id = tracker.record_start("campaign-1", "call-abc", None, now_ms()).await;
//!     // ... later, on the provider's completion event:
//!     tracker.record_completion("call-abc", Some(42), now_ms()).await;
//! }
//! ```
//!
//! The limiter is advisory, not a linearizable semaphore: two workers may
//! both observe a free slot and both proceed. The provider's own cap is the
//! backstop; this crate keeps steady-state usage under it. See
//! [`core::CallSlotTracker`] for the full contract.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core tracker, ledger abstractions, and capacity accounting.
pub mod core;
/// Configuration models for caps, windows, and polling cadence.
pub mod config;
/// Infrastructure adapters for ledger backends.
pub mod infra;
/// Runtime integration: the recurring reclaim sweeper.
pub mod runtime;
/// Shared utilities.
pub mod util;
