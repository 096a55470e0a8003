//! Alarm sequencer: repeating chime plus an optional deferred auto-dismiss

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{interval, sleep, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{services::Effects, state::AppState};

pub const CHIME_INTERVAL: Duration = Duration::from_millis(1200);

/// Handles of the alarm's scheduled tasks
#[derive(Debug, Default)]
pub struct AlarmHandles {
    chime: Option<JoinHandle<()>>,
    auto_dismiss: Option<JoinHandle<()>>,
}

impl AlarmHandles {
    pub fn is_sounding(&self) -> bool {
        self.chime.is_some()
    }

    pub fn has_pending_dismiss(&self) -> bool {
        self.auto_dismiss.is_some()
    }

    /// Start chiming and, when given a delay, schedule the auto-dismiss.
    /// Anything already scheduled is cancelled first.
    pub fn start(&mut self, state: &Arc<AppState>, auto_dismiss_after: Option<Duration>) {
        self.stop();
        info!(
            "Alarm started{}",
            auto_dismiss_after
                .map(|d| format!(", auto-dismiss in {}s", d.as_secs()))
                .unwrap_or_default()
        );
        self.chime = Some(spawn_chime(state.effects()));
        self.auto_dismiss = auto_dismiss_after.map(|after| spawn_auto_dismiss(Arc::clone(state), after));
    }

    /// Cancel both the repeating chime and the deferred reset
    pub fn stop(&mut self) {
        let mut stopped = false;
        if let Some(handle) = self.chime.take() {
            handle.abort();
            stopped = true;
        }
        if let Some(handle) = self.auto_dismiss.take() {
            handle.abort();
            stopped = true;
        }
        if stopped {
            debug!("Alarm stopped");
        }
    }

    /// Forget the auto-dismiss handle without aborting it; called by the
    /// auto-dismiss task itself
    pub(crate) fn release_auto_dismiss(&mut self) {
        self.auto_dismiss.take();
    }
}

fn spawn_chime(effects: Arc<dyn Effects>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(CHIME_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = effects.play_chime() {
                warn!("Chime failed: {}", e);
            }
        }
    })
}

fn spawn_auto_dismiss(state: Arc<AppState>, after: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep(after).await;
        state.auto_dismiss().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_state::tests::{advance, harness};

    #[tokio::test(start_paused = true)]
    async fn chimes_immediately_then_on_interval() {
        let h = harness();
        let mut alarm = AlarmHandles::default();
        alarm.start(&h.state, None);
        assert!(alarm.is_sounding());
        assert!(!alarm.has_pending_dismiss());

        advance(0.0).await;
        assert_eq!(h.effects.chime_count(), 1);
        advance(1.1).await;
        assert_eq!(h.effects.chime_count(), 1);
        advance(0.1).await;
        assert_eq!(h.effects.chime_count(), 2);

        alarm.stop();
        assert!(!alarm.is_sounding());
        advance(5.0).await;
        assert_eq!(h.effects.chime_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_tasks() {
        let h = harness();
        let mut alarm = AlarmHandles::default();
        alarm.start(&h.state, Some(Duration::from_secs(15)));
        advance(0.0).await;
        alarm.start(&h.state, None);
        assert!(!alarm.has_pending_dismiss());
        advance(0.0).await;
        // One chime from each start, never two loops at once
        assert_eq!(h.effects.chime_count(), 2);
        advance(1.2).await;
        assert_eq!(h.effects.chime_count(), 3);
        alarm.stop();
    }
}
