//! Control surface (popup) view model
//!
//! Everything the popup shows is derived from a [`TimerSnapshot`] and the
//! current [`Options`]; user input is parsed and clamped here before it turns
//! into an engine command.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{
    options::{MAX_PRESET_MINUTES, MAX_PRESET_SECONDS},
    Options, TimerSnapshot, TimerStatus,
};

pub const MAX_MINUTES: u32 = MAX_PRESET_MINUTES;
pub const MAX_SECONDS: u32 = MAX_PRESET_SECONDS;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The popup shakes its inputs for this one
    #[error("Enter a duration longer than zero")]
    ZeroDuration,
}

/// Keep the first two digits of a raw field and clamp them to `max`
pub fn parse_field(raw: &str, max: u32) -> u32 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(2).collect();
    digits.parse::<u32>().unwrap_or(0).min(max)
}

/// `MM:SS` with minutes allowed past 59
pub fn format_clock(secs: f64) -> String {
    let secs = secs.max(0.0);
    let minutes = (secs / 60.0).floor() as u64;
    let seconds = (secs % 60.0).floor() as u64;
    format!("{:02}:{:02}", minutes, seconds)
}

/// The minutes/seconds pair typed into the popup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationInput {
    pub minutes: u32,
    pub seconds: u32,
}

impl DurationInput {
    pub fn parse(minutes: &str, seconds: &str) -> Self {
        Self {
            minutes: parse_field(minutes, MAX_MINUTES),
            seconds: parse_field(seconds, MAX_SECONDS),
        }
    }

    pub fn total_seconds(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }

    /// Seconds to start the timer with
    pub fn start_seconds(&self) -> Result<u32, InputError> {
        match self.total_seconds() {
            0 => Err(InputError::ZeroDuration),
            total => Ok(total),
        }
    }

    /// Zero-padded field values as the popup displays them
    pub fn display(&self) -> (String, String) {
        (format!("{:02}", self.minutes), format!("{:02}", self.seconds))
    }
}

/// What a quick-add chip does in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAdd {
    /// Idle: only the inputs change
    Inputs(DurationInput),
    /// Running or paused: extend the countdown
    AddTime(u32),
    /// Finished: nothing to extend
    Ignored,
}

pub fn quick_add(status: TimerStatus, input: DurationInput, add_seconds: u32) -> QuickAdd {
    match status {
        TimerStatus::Idle => {
            let total = input.total_seconds().saturating_add(add_seconds);
            QuickAdd::Inputs(DurationInput {
                minutes: (total / 60).min(MAX_MINUTES),
                seconds: total % 60,
            })
        }
        TimerStatus::Running | TimerStatus::Paused => QuickAdd::AddTime(add_seconds),
        TimerStatus::Finished => QuickAdd::Ignored,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetButton {
    pub index: usize,
    pub name: String,
    pub time: String,
    pub title: String,
    pub minutes: u32,
    pub seconds: u32,
    pub active: bool,
}

/// Buttons for every preset with a non-zero duration
pub fn preset_buttons(options: &Options, input: DurationInput) -> Vec<PresetButton> {
    options
        .presets
        .iter()
        .enumerate()
        .filter(|(_, preset)| preset.total_seconds() > 0)
        .map(|(index, preset)| {
            let name = match preset.label.trim() {
                "" => "Timer".to_string(),
                label => label.to_string(),
            };
            let time = format_clock(f64::from(preset.total_seconds()));
            PresetButton {
                index,
                title: format!("{} — {}", name, time),
                name,
                time,
                minutes: preset.minutes,
                seconds: preset.seconds,
                active: preset.minutes == input.minutes && preset.seconds == input.seconds,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RingTone {
    Normal,
    Warn,
    Crit,
    Done,
}

impl RingTone {
    pub fn for_progress(progress: f64) -> Self {
        if progress <= 0.0 {
            RingTone::Done
        } else if progress < 0.1 {
            RingTone::Crit
        } else if progress < 0.25 {
            RingTone::Warn
        } else {
            RingTone::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    pub start: bool,
    pub pause: bool,
    pub resume: bool,
    pub reset: bool,
}

/// Everything the popup renders for one state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlView {
    pub status: TimerStatus,
    pub show_inputs: bool,
    pub show_countdown: bool,
    pub show_presets: bool,
    pub show_overlay: bool,
    pub countdown: Option<String>,
    pub label: Option<&'static str>,
    pub progress: f64,
    pub ring: RingTone,
    pub controls: Controls,
    pub done_text: String,
}

impl ControlView {
    pub fn new(snapshot: &TimerSnapshot, options: &Options) -> Self {
        let progress = if snapshot.total_seconds > 0 {
            (snapshot.remaining_seconds / f64::from(snapshot.total_seconds)).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let (countdown, label, progress, controls) = match snapshot.status {
            TimerStatus::Idle => (
                None,
                None,
                1.0,
                Controls { start: true, ..Controls::default() },
            ),
            TimerStatus::Running => (
                Some(format_clock(snapshot.remaining_seconds)),
                Some("remaining"),
                progress,
                Controls { pause: true, reset: true, ..Controls::default() },
            ),
            TimerStatus::Paused => (
                Some(format_clock(snapshot.remaining_seconds)),
                Some("paused"),
                progress,
                Controls { resume: true, reset: true, ..Controls::default() },
            ),
            TimerStatus::Finished => (
                Some("00:00".to_string()),
                Some("done!"),
                0.0,
                Controls::default(),
            ),
        };

        let idle = snapshot.status == TimerStatus::Idle;
        Self {
            status: snapshot.status,
            show_inputs: idle,
            show_countdown: !idle,
            show_presets: idle,
            show_overlay: snapshot.status == TimerStatus::Finished,
            countdown,
            label,
            progress,
            ring: RingTone::for_progress(progress),
            controls,
            done_text: options.toast_text().to_string(),
        }
    }
}
