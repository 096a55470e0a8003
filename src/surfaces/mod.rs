//! User-facing surfaces
//!
//! The control surface (popup) and the settings surface (options page) hold
//! no state of their own: they render what the engine reports and turn user
//! input into engine commands.

pub mod control;
pub mod settings;

pub use control::{ControlView, DurationInput, QuickAdd};
pub use settings::SettingsForm;
