//! Background tasks module
//!
//! Scheduled work owned by the timer engine: the running ticker, the alarm
//! sequencer, notification clicks, and the rehydration of persisted state at startup.

pub mod alarm;
pub mod notifications;
pub mod recovery;
pub mod ticker;

// Re-export main functions
pub use alarm::AlarmHandles;
pub use notifications::spawn_click_listener;
pub use recovery::restore_timer;
pub use ticker::spawn_ticker;
