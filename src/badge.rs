//! Badge indicator derived from the timer state

use serde::Serialize;

use crate::state::{TimerState, TimerStatus};

pub const ALERT_COLOR: &str = "#d93025";
pub const WARNING_COLOR: &str = "#ea8600";
pub const NEUTRAL_COLOR: &str = "#1a73e8";
pub const TEXT_COLOR: &str = "#ffffff";

/// Text and colors for the badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub text: String,
    /// Background color; absent when the badge is cleared
    pub color: Option<&'static str>,
    pub text_color: Option<&'static str>,
}

impl Badge {
    pub fn cleared() -> Self {
        Self {
            text: String::new(),
            color: None,
            text_color: None,
        }
    }

    fn colored(text: String, color: &'static str) -> Self {
        Self {
            text,
            color: Some(color),
            text_color: Some(TEXT_COLOR),
        }
    }

    /// Badge for a state whose cached `remaining_seconds` is current
    pub fn for_state(state: &TimerState) -> Self {
        match state.status {
            TimerStatus::Idle => Self::cleared(),
            TimerStatus::Finished => Self::colored("!".to_string(), ALERT_COLOR),
            TimerStatus::Running | TimerStatus::Paused => {
                let remaining = state.remaining_seconds.max(0.0).ceil() as u64;
                Self::colored(format_remaining(remaining), tier_color(remaining))
            }
        }
    }
}

impl Default for Badge {
    fn default() -> Self {
        Self::cleared()
    }
}

fn format_remaining(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}h", secs.div_ceil(3600))
    } else if secs >= 60 {
        format!("{}m", secs.div_ceil(60))
    } else {
        format!("{}s", secs)
    }
}

fn tier_color(secs: u64) -> &'static str {
    if secs <= 10 {
        ALERT_COLOR
    } else if secs <= 30 {
        WARNING_COLOR
    } else {
        NEUTRAL_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(remaining: f64) -> TimerState {
        TimerState {
            status: TimerStatus::Running,
            total_seconds: 7200,
            remaining_seconds: remaining,
            started_at: Some(0),
            paused_remaining: Some(remaining),
        }
    }

    #[test]
    fn idle_clears_badge() {
        assert_eq!(Badge::for_state(&TimerState::new()), Badge::cleared());
    }

    #[test]
    fn finished_shows_alert() {
        let mut state = running(0.0);
        state.finish();
        let badge = Badge::for_state(&state);
        assert_eq!(badge.text, "!");
        assert_eq!(badge.color, Some(ALERT_COLOR));
        assert_eq!(badge.text_color, Some(TEXT_COLOR));
    }

    #[test]
    fn text_uses_largest_unit_rounded_up() {
        assert_eq!(Badge::for_state(&running(3600.0)).text, "1h");
        assert_eq!(Badge::for_state(&running(3601.0)).text, "2h");
        assert_eq!(Badge::for_state(&running(240.0)).text, "4m");
        assert_eq!(Badge::for_state(&running(61.0)).text, "2m");
        assert_eq!(Badge::for_state(&running(59.2)).text, "1m");
        assert_eq!(Badge::for_state(&running(58.7)).text, "59s");
        assert_eq!(Badge::for_state(&running(0.4)).text, "1s");
    }

    #[test]
    fn color_tiers() {
        assert_eq!(Badge::for_state(&running(10.0)).color, Some(ALERT_COLOR));
        assert_eq!(Badge::for_state(&running(10.5)).color, Some(WARNING_COLOR));
        assert_eq!(Badge::for_state(&running(30.0)).color, Some(WARNING_COLOR));
        assert_eq!(Badge::for_state(&running(31.0)).color, Some(NEUTRAL_COLOR));
    }

    #[test]
    fn paused_uses_same_policy() {
        let mut state = running(25.0);
        state.status = TimerStatus::Paused;
        let badge = Badge::for_state(&state);
        assert_eq!(badge.text, "25s");
        assert_eq!(badge.color, Some(WARNING_COLOR));
    }
}
