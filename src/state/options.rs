//! User options (record `options`) and their repair against defaults

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub const PRESET_COUNT: usize = 3;
pub const MIN_ALARM_DURATION: u32 = 3;
pub const MAX_ALARM_DURATION: u32 = 300;
pub const DEFAULT_TOAST_TEXT: &str = "Your tea is ready! 🍵";
pub const MAX_PRESET_MINUTES: u32 = 99;
pub const MAX_PRESET_SECONDS: u32 = 59;

/// One quick-start preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub label: String,
    pub minutes: u32,
    pub seconds: u32,
}

impl Preset {
    pub fn new(label: &str, minutes: u32, seconds: u32) -> Self {
        Self {
            label: label.to_string(),
            minutes,
            seconds,
        }
    }

    pub fn total_seconds(&self) -> u32 {
        self.minutes.saturating_mul(60).saturating_add(self.seconds)
    }

    /// Pull minutes and seconds back into the range the inputs accept
    fn clamped(self) -> Self {
        if self.minutes > MAX_PRESET_MINUTES || self.seconds > MAX_PRESET_SECONDS {
            warn!("Preset '{}' is out of range, clamping", self.label);
        }
        Self {
            minutes: self.minutes.min(MAX_PRESET_MINUTES),
            seconds: self.seconds.min(MAX_PRESET_SECONDS),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub presets: Vec<Preset>,
    pub show_toast: bool,
    pub toast_text: String,
    pub auto_dismiss: bool,
    /// Seconds the alarm sounds before auto-dismissing
    pub alarm_duration: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            presets: default_presets(),
            show_toast: true,
            toast_text: DEFAULT_TOAST_TEXT.to_string(),
            auto_dismiss: true,
            alarm_duration: 15,
        }
    }
}

pub fn default_presets() -> Vec<Preset> {
    vec![
        Preset::new("Green", 2, 0),
        Preset::new("Black", 4, 0),
        Preset::new("Herbal", 7, 0),
    ]
}

fn field<T: DeserializeOwned>(object: &serde_json::Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring malformed option '{}': {}", key, e);
            None
        }
    }
}

impl Options {
    /// Build options from a stored blob, keeping every valid field and
    /// falling back to the default for anything missing or malformed.
    pub fn from_stored(stored: Option<&Value>) -> Self {
        let defaults = Self::default();
        let Some(object) = stored.and_then(Value::as_object) else {
            return defaults;
        };

        let presets = match field::<Vec<Preset>>(object, "presets") {
            Some(presets) if presets.len() == PRESET_COUNT => {
                presets.into_iter().map(Preset::clamped).collect()
            }
            Some(presets) => {
                warn!("Stored options have {} presets, restoring defaults", presets.len());
                defaults.presets
            }
            None => defaults.presets,
        };

        Self {
            presets,
            show_toast: field(object, "showToast").unwrap_or(defaults.show_toast),
            toast_text: field(object, "toastText").unwrap_or(defaults.toast_text),
            auto_dismiss: field(object, "autoDismiss").unwrap_or(defaults.auto_dismiss),
            alarm_duration: field::<u32>(object, "alarmDuration")
                .filter(|d| *d > 0)
                .map(|d| d.clamp(MIN_ALARM_DURATION, MAX_ALARM_DURATION))
                .unwrap_or(defaults.alarm_duration),
        }
    }

    /// Toast body, never empty
    pub fn toast_text(&self) -> &str {
        if self.toast_text.trim().is_empty() {
            DEFAULT_TOAST_TEXT
        } else {
            &self.toast_text
        }
    }
}
