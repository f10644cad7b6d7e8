//! Configuration models for caps, windows, and polling cadence.

pub mod limits;

pub use limits::TrackerConfig;
