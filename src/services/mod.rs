//! Side effects on the host system
//!
//! The engine only talks to the outside world through [`Effects`]: audio for
//! the alarm chime and desktop notifications for the completion toast.

use tokio::sync::mpsc;

pub mod chime;
#[cfg(any(test, feature = "test-util"))]
pub mod recording;
pub mod system;

#[cfg(any(test, feature = "test-util"))]
pub use recording::RecordingEffects;
pub use system::{check_command_available, SystemEffects};

/// Fixed tag of the completion notification so a later dismissal can target it
pub const NOTIFICATION_TAG: &str = "tea-timer-done";
pub const NOTIFICATION_TITLE: &str = "Tea Timer";

/// Sender half that effects use to report a clicked notification by tag
pub type NotificationClicks = mpsc::UnboundedSender<String>;

/// Host side effects used by the timer engine and alarm sequencer
///
/// Implementations must not block: each call either hands work off to a
/// background task or returns immediately.
pub trait Effects: Send + Sync {
    /// Play the two-tone chime once
    fn play_chime(&self) -> Result<(), String>;

    /// Show (or replace) the notification identified by `tag`
    fn show_notification(&self, tag: &str, title: &str, message: &str) -> Result<(), String>;

    /// Close the notification identified by `tag`, if it is showing
    fn clear_notification(&self, tag: &str) -> Result<(), String>;
}
