//! Polling of one Steam account and the scheduler that drives it.
//!
//! [`PlayerTracker::tick`](tracker::PlayerTracker::tick) fetches the
//! current profile, stores a snapshot, and records an event when the
//! presence state changed. [`TickScheduler`](scheduler::TickScheduler)
//! fires ticks on a fixed interval until shutdown.

pub mod error;
pub mod scheduler;
pub mod source;
pub mod tracker;

pub use error::TrackerError;
pub use scheduler::TickScheduler;
pub use source::PlayerSource;
pub use tracker::{PlayerTracker, TickOutcome};
