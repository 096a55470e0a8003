//! State management module
//!
//! The persisted timer state, the user options and the shared application
//! state that owns the single timer engine.

pub mod app_state;
pub mod events;
pub mod options;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, CommandError, Engine};
pub use events::TimerEvent;
pub use options::{Options, Preset};
pub use timer_state::{TimerSnapshot, TimerState, TimerStatus};
