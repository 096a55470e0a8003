//! Utility functions module
//!
//! Shutdown signal handling and the wall clock used by the timer engine.

pub mod clock;
pub mod signals;

// Re-export main items
#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use signals::shutdown_signal;
