//! Effects that only record what was asked of them

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use super::{Effects, NotificationClicks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownNotification {
    pub tag: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct RecordingEffects {
    chimes: AtomicUsize,
    fail_audio: AtomicBool,
    shown: Mutex<Vec<ShownNotification>>,
    cleared: Mutex<Vec<String>>,
    clicks: Mutex<Option<NotificationClicks>>,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every chime report an audio failure
    pub fn fail_audio(&self) {
        self.fail_audio.store(true, Ordering::SeqCst);
    }

    pub fn chime_count(&self) -> usize {
        self.chimes.load(Ordering::SeqCst)
    }

    pub fn shown(&self) -> Vec<ShownNotification> {
        self.shown.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn cleared(&self) -> Vec<String> {
        self.cleared.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Route simulated clicks to `clicks`
    pub fn connect_clicks(&self, clicks: NotificationClicks) {
        if let Ok(mut slot) = self.clicks.lock() {
            *slot = Some(clicks);
        }
    }

    /// Act as if the user clicked the notification tagged `tag`. Returns
    /// false when nothing listens.
    pub fn click(&self, tag: &str) -> bool {
        match self.clicks.lock() {
            Ok(slot) => slot
                .as_ref()
                .is_some_and(|clicks| clicks.send(tag.to_string()).is_ok()),
            Err(_) => false,
        }
    }
}

impl Effects for RecordingEffects {
    fn play_chime(&self) -> Result<(), String> {
        self.chimes.fetch_add(1, Ordering::SeqCst);
        if self.fail_audio.load(Ordering::SeqCst) {
            return Err("audio device unavailable".to_string());
        }
        Ok(())
    }

    fn show_notification(&self, tag: &str, title: &str, message: &str) -> Result<(), String> {
        let mut shown = self.shown.lock().map_err(|e| e.to_string())?;
        shown.push(ShownNotification {
            tag: tag.to_string(),
            title: title.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn clear_notification(&self, tag: &str) -> Result<(), String> {
        let mut cleared = self.cleared.lock().map_err(|e| e.to_string())?;
        cleared.push(tag.to_string());
        Ok(())
    }
}
