//! Runtime integration: the recurring reclaim sweeper.

#[cfg(feature = "tokio-runtime")]
pub mod sweeper;

#[cfg(feature = "tokio-runtime")]
pub use sweeper::{ReclaimSweeper, SweeperHandle};
