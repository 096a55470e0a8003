//! Settings surface (options page)
//!
//! Loads options with a bounded retry, turns them into form values, and
//! validates edited form values back into [`Options`] before saving.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    state::{
        options::{DEFAULT_TOAST_TEXT, MAX_ALARM_DURATION, MIN_ALARM_DURATION},
        AppState, Options, Preset,
    },
    store::{KeyValueStore, StoreError, OPTIONS_KEY},
    surfaces::control::{MAX_MINUTES, MAX_SECONDS},
};

pub const LOAD_RETRIES: u32 = 3;
pub const RETRY_BACKOFF: Duration = Duration::from_millis(200);
/// Quick-pick buttons next to the alarm duration field
pub const DURATION_CHOICES: [u32; 5] = [5, 10, 15, 30, 60];

/// Leading integer of a string, the way a lenient form field reads it
fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = digits.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<i64>().ok().map(|n| sign * n)
}

fn clamp_field(raw: &str, max: u32) -> u32 {
    parse_int(raw).unwrap_or(0).clamp(0, i64::from(max)) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetForm {
    pub label: String,
    pub minutes: String,
    pub seconds: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationChoice {
    pub seconds: u32,
    pub active: bool,
}

/// Raw form contents, as typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    pub presets: Vec<PresetForm>,
    pub show_toast: bool,
    pub toast_text: String,
    pub auto_dismiss: bool,
    pub alarm_duration: String,
    /// Derived on fill; ignored when reading the form back
    #[serde(default)]
    pub show_toast_text_row: bool,
    #[serde(default)]
    pub show_alarm_duration_row: bool,
    #[serde(default)]
    pub duration_choices: Vec<DurationChoice>,
}

impl SettingsForm {
    /// Populate the form from options
    pub fn fill(options: &Options) -> Self {
        let alarm_duration = if options.alarm_duration == 0 {
            Options::default().alarm_duration
        } else {
            options.alarm_duration
        };

        Self {
            presets: options
                .presets
                .iter()
                .map(|preset| PresetForm {
                    label: preset.label.clone(),
                    minutes: preset.minutes.to_string(),
                    seconds: preset.seconds.to_string(),
                })
                .collect(),
            show_toast: options.show_toast,
            toast_text: options.toast_text().to_string(),
            auto_dismiss: options.auto_dismiss,
            alarm_duration: alarm_duration.to_string(),
            show_toast_text_row: options.show_toast,
            show_alarm_duration_row: options.auto_dismiss,
            duration_choices: DURATION_CHOICES
                .iter()
                .map(|&seconds| DurationChoice {
                    seconds,
                    active: seconds == alarm_duration,
                })
                .collect(),
        }
    }

    pub fn defaults() -> Self {
        Self::fill(&Options::default())
    }

    /// Validate the form into options, clamping every numeric field
    pub fn read(&self) -> Options {
        let defaults = Options::default();
        let presets = (0..defaults.presets.len())
            .map(|i| match self.presets.get(i) {
                Some(form) => Preset {
                    label: match form.label.trim() {
                        "" => "Timer".to_string(),
                        label => label.to_string(),
                    },
                    minutes: clamp_field(&form.minutes, MAX_MINUTES),
                    seconds: clamp_field(&form.seconds, MAX_SECONDS),
                },
                None => defaults.presets[i].clone(),
            })
            .collect();

        let alarm_duration = parse_int(&self.alarm_duration)
            .unwrap_or(0)
            .clamp(i64::from(MIN_ALARM_DURATION), i64::from(MAX_ALARM_DURATION)) as u32;

        Options {
            presets,
            show_toast: self.show_toast,
            toast_text: match self.toast_text.trim() {
                "" => DEFAULT_TOAST_TEXT.to_string(),
                text => text.to_string(),
            },
            auto_dismiss: self.auto_dismiss,
            alarm_duration,
        }
    }
}

/// Read options, retrying with a growing backoff, falling back to defaults
pub async fn load_with_retry(store: &dyn KeyValueStore, retries: u32) -> Options {
    for attempt in 1..=retries {
        match store.get(OPTIONS_KEY) {
            Ok(stored) => return Options::from_stored(stored.as_ref()),
            Err(e) => {
                warn!("Options load attempt {} failed: {}", attempt, e);
                if attempt < retries {
                    sleep(RETRY_BACKOFF * attempt).await;
                }
            }
        }
    }
    warn!("Using default options after {} failed attempts", retries);
    Options::default()
}

/// Load the form the way the options page does on open
pub async fn load_form(state: &AppState) -> SettingsForm {
    let options = load_with_retry(state.store().as_ref(), LOAD_RETRIES).await;
    SettingsForm::fill(&options)
}

/// Validate and store the form, then tell the engine to reload
pub fn save(state: &Arc<AppState>, form: &SettingsForm) -> Result<Options, StoreError> {
    let options = form.read();
    state.store().set(OPTIONS_KEY, &serde_json::to_value(&options)?)?;
    info!("Options saved");
    state.options_changed();
    Ok(options)
}
