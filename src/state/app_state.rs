//! Main application state: the single timer engine and its collaborators
//!
//! All timer mutation happens while holding the engine mutex, so commands never
//! interleave. Scheduled work (tick, chime, auto-dismiss) runs as tokio tasks
//! whose handles live next to the state in [`Engine`]; any transition that
//! invalidates one aborts it before scheduling a replacement. State is always
//! persisted before the notification that depends on it is broadcast.

use std::{
    sync::{Arc, RwLock},
    time::{Duration, Instant},
};

use thiserror::Error;
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use super::{Options, TimerEvent, TimerSnapshot, TimerState, TimerStatus};
use crate::{
    badge::Badge,
    services::{Effects, NOTIFICATION_TAG, NOTIFICATION_TITLE},
    store::{KeyValueStore, OPTIONS_KEY, TIMER_STATE_KEY},
    tasks::{alarm::AlarmHandles, ticker::spawn_ticker},
    utils::Clock,
};

/// Commands the engine refuses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Timer duration must be a positive number of seconds, got {0}")]
    InvalidDuration(i64),

    #[error("Added time must be a non-negative number of seconds, got {0}")]
    InvalidAddTime(i64),
}

/// The timer together with the handles of its scheduled tasks
#[derive(Debug, Default)]
pub struct Engine {
    pub timer: TimerState,
    pub(crate) ticker: Option<JoinHandle<()>>,
    pub(crate) alarm: AlarmHandles,
}

impl Engine {
    pub(crate) fn stop_ticking(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn is_alarm_sounding(&self) -> bool {
        self.alarm.is_sounding()
    }
}

/// Shared application state
pub struct AppState {
    pub(crate) engine: Mutex<Engine>,
    /// Swapped wholesale on reload, never mutated in place
    options: RwLock<Arc<Options>>,
    store: Arc<dyn KeyValueStore>,
    effects: Arc<dyn Effects>,
    clock: Arc<dyn Clock>,
    /// Channel for listener notifications
    pub events_tx: broadcast::Sender<TimerEvent>,
    /// Latest badge
    pub badge_tx: watch::Sender<Badge>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, effects: Arc<dyn Effects>, clock: Arc<dyn Clock>) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        let (badge_tx, _) = watch::channel(Badge::cleared());

        Self {
            engine: Mutex::new(Engine::default()),
            options: RwLock::new(Arc::new(Options::default())),
            store,
            effects,
            clock,
            events_tx,
            badge_tx,
            start_time: Instant::now(),
        }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub fn effects(&self) -> Arc<dyn Effects> {
        Arc::clone(&self.effects)
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events_tx.subscribe()
    }

    pub fn badge(&self) -> Badge {
        self.badge_tx.borrow().clone()
    }

    /// Current options snapshot
    pub fn options(&self) -> Arc<Options> {
        match self.options.read() {
            Ok(options) => Arc::clone(&options),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Re-read options from the store, repairing them against defaults.
    /// A failed read keeps the options already loaded.
    pub fn reload_options(&self) -> Arc<Options> {
        let options = match self.store.get(OPTIONS_KEY) {
            Ok(stored) => Arc::new(Options::from_stored(stored.as_ref())),
            Err(e) => {
                warn!("Failed to read options, keeping current ones: {}", e);
                return self.options();
            }
        };

        match self.options.write() {
            Ok(mut current) => *current = Arc::clone(&options),
            Err(poisoned) => *poisoned.into_inner() = Arc::clone(&options),
        }
        debug!("Options reloaded: {:?}", options);
        options
    }

    /// Handle `optionsChanged`: reload, then tell listeners
    pub fn options_changed(&self) {
        self.reload_options();
        info!("Options changed, broadcasting update");
        self.notify(TimerEvent::OptionsUpdated);
    }

    pub async fn start(self: &Arc<Self>, total_seconds: i64) -> Result<(), CommandError> {
        let total = u32::try_from(total_seconds)
            .ok()
            .filter(|t| *t > 0)
            .ok_or(CommandError::InvalidDuration(total_seconds))?;

        let mut engine = self.engine.lock().await;
        let was_finished = engine.timer.status == TimerStatus::Finished;
        engine.alarm.stop();
        engine.timer.start(total, self.clock.now_ms());
        self.persist(&engine.timer);
        self.start_ticking(&mut engine);
        self.publish_badge(&engine.timer);
        drop(engine);

        if was_finished {
            self.clear_notification();
        }
        info!("Timer started for {}s", total);
        self.notify(TimerEvent::StateChanged);
        Ok(())
    }

    pub async fn pause(&self) {
        let mut engine = self.engine.lock().await;
        if !engine.timer.pause(self.clock.now_ms()) {
            debug!("Pause ignored while {}", engine.timer.status.as_str());
            return;
        }
        engine.stop_ticking();
        self.persist(&engine.timer);
        self.publish_badge(&engine.timer);
        let remaining = engine.timer.remaining_seconds;
        drop(engine);

        info!("Timer paused with {:.1}s remaining", remaining);
        self.notify(TimerEvent::StateChanged);
    }

    pub async fn resume(self: &Arc<Self>) {
        let mut engine = self.engine.lock().await;
        if !engine.timer.resume(self.clock.now_ms()) {
            debug!("Resume ignored while {}", engine.timer.status.as_str());
            return;
        }
        self.persist(&engine.timer);
        self.start_ticking(&mut engine);
        self.publish_badge(&engine.timer);
        drop(engine);

        info!("Timer resumed");
        self.notify(TimerEvent::StateChanged);
    }

    pub async fn reset(&self) {
        let mut engine = self.engine.lock().await;
        let was_finished = engine.timer.status == TimerStatus::Finished;
        self.reset_locked(&mut engine);
        drop(engine);

        if was_finished {
            self.clear_notification();
        }
        info!("Timer reset");
        self.notify(TimerEvent::StateChanged);
    }

    pub async fn add_time(&self, seconds: i64) -> Result<(), CommandError> {
        let extra = u32::try_from(seconds).map_err(|_| CommandError::InvalidAddTime(seconds))?;

        let mut engine = self.engine.lock().await;
        if !engine.timer.add_time(extra) {
            debug!("Add time ignored while {}", engine.timer.status.as_str());
            return Ok(());
        }
        engine.timer.refresh(self.clock.now_ms());
        self.persist(&engine.timer);
        self.publish_badge(&engine.timer);
        drop(engine);

        info!("Added {}s to the timer", extra);
        self.notify(TimerEvent::StateChanged);
        Ok(())
    }

    /// The user closed the completion notice or clicked the notification
    pub async fn dismiss(&self) {
        let mut engine = self.engine.lock().await;
        self.reset_locked(&mut engine);
        drop(engine);

        self.clear_notification();
        info!("Alarm dismissed");
        self.notify(TimerEvent::StateChanged);
    }

    /// The user clicked a system notification. Only the completion
    /// notification of a finished timer dismisses anything.
    pub async fn notification_clicked(&self, tag: &str) {
        if tag != NOTIFICATION_TAG {
            debug!("Ignoring click on unknown notification {}", tag);
            return;
        }

        let mut engine = self.engine.lock().await;
        if engine.timer.status != TimerStatus::Finished {
            debug!("Notification click ignored while {}", engine.timer.status.as_str());
            return;
        }
        self.reset_locked(&mut engine);
        drop(engine);

        self.clear_notification();
        info!("Alarm dismissed from notification");
        self.notify(TimerEvent::StateChanged);
    }

    /// Snapshot with a freshly recomputed remaining time
    pub async fn get_state(&self) -> TimerSnapshot {
        let mut engine = self.engine.lock().await;
        let now = self.clock.now_ms();
        engine.timer.refresh(now);
        engine.timer.snapshot(now)
    }

    /// Periodic recomputation while running. Returns false once the ticker
    /// should stop.
    pub(crate) async fn tick(self: &Arc<Self>) -> bool {
        let mut engine = self.engine.lock().await;
        if !engine.timer.is_running() {
            return false;
        }

        let remaining = engine.timer.refresh(self.clock.now_ms());
        if remaining <= 0.0 {
            // This tick is the ticker; let it run to completion
            engine.ticker.take();
            self.finish_locked(&mut engine);
            return false;
        }

        debug!("Tick: {:.1}s remaining", remaining);
        self.publish_badge(&engine.timer);
        true
    }

    /// Deferred reset scheduled by the alarm sequencer
    pub(crate) async fn auto_dismiss(&self) {
        let mut engine = self.engine.lock().await;
        engine.alarm.release_auto_dismiss();
        if engine.timer.status != TimerStatus::Finished {
            return;
        }
        engine.alarm.stop();
        self.reset_locked(&mut engine);
        drop(engine);

        self.clear_notification();
        info!("Alarm auto-dismissed");
        self.notify(TimerEvent::StateChanged);
    }

    /// Enter `finished`: persist, badge, alarm, then notify
    pub(crate) fn finish_locked(self: &Arc<Self>, engine: &mut Engine) {
        engine.stop_ticking();
        engine.timer.finish();
        self.persist(&engine.timer);
        self.publish_badge(&engine.timer);
        self.start_alarm_locked(engine);

        info!("Timer finished");
        self.notify(TimerEvent::Finished);

        let options = self.options();
        if options.show_toast {
            if let Err(e) = self
                .effects
                .show_notification(NOTIFICATION_TAG, NOTIFICATION_TITLE, options.toast_text())
            {
                warn!("Failed to show completion notification: {}", e);
            }
        }
    }

    /// Start the alarm unless it is already sounding
    pub(crate) fn start_alarm_locked(self: &Arc<Self>, engine: &mut Engine) {
        if engine.alarm.is_sounding() {
            debug!("Alarm already sounding");
            return;
        }
        let options = self.options();
        let auto_dismiss_after = options
            .auto_dismiss
            .then(|| Duration::from_secs(u64::from(options.alarm_duration)));
        engine.alarm.start(self, auto_dismiss_after);
    }

    pub(crate) fn start_ticking(self: &Arc<Self>, engine: &mut Engine) {
        engine.stop_ticking();
        engine.ticker = Some(spawn_ticker(Arc::clone(self)));
    }

    fn reset_locked(&self, engine: &mut Engine) {
        engine.stop_ticking();
        engine.alarm.stop();
        engine.timer.reset();
        self.persist(&engine.timer);
        self.publish_badge(&engine.timer);
    }

    pub(crate) fn persist(&self, timer: &TimerState) {
        let value = match serde_json::to_value(timer) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize timer state: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(TIMER_STATE_KEY, &value) {
            warn!("Failed to persist timer state: {}", e);
        }
    }

    pub(crate) fn publish_badge(&self, timer: &TimerState) {
        let badge = Badge::for_state(timer);
        self.badge_tx.send_if_modified(|current| {
            if *current == badge {
                false
            } else {
                debug!("Badge: {:?} {:?}", badge.text, badge.color);
                *current = badge;
                true
            }
        });
    }

    pub(crate) fn notify(&self, event: TimerEvent) {
        if let Err(e) = self.events_tx.send(event) {
            debug!("No listeners for {}: {}", event.name(), e);
        }
    }

    fn clear_notification(&self) {
        if let Err(e) = self.effects.clear_notification(NOTIFICATION_TAG) {
            warn!("Failed to clear completion notification: {}", e);
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
