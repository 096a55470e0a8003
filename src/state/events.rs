//! Notifications broadcast to listening surfaces

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    /// The countdown reached zero
    Finished,
    /// The timer state changed; listeners should re-read it
    StateChanged,
    /// Options were reloaded from the store
    OptionsUpdated,
}

impl TimerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::Finished => "finished",
            TimerEvent::StateChanged => "stateChanged",
            TimerEvent::OptionsUpdated => "optionsUpdated",
        }
    }
}
