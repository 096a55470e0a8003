//! Tea Timer - A persistent tea-brewing timer daemon
//!
//! This library provides the single-countdown timer engine that survives
//! restarts by recomputing from wall-clock timestamps, the badge presenter,
//! the alarm sequencer, and the HTTP surfaces that drive them.

pub mod api;
pub mod badge;
pub mod config;
pub mod services;
pub mod state;
pub mod store;
pub mod surfaces;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
