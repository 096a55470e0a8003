//! Startup recovery of the persisted timer
//!
//! The process may have been stopped at any point, including through the
//! whole countdown. Remaining time is recomputed from the persisted
//! `startedAt` against the current wall clock.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    state::{AppState, TimerState, TimerStatus},
    store::TIMER_STATE_KEY,
};

fn load_timer_state(state: &AppState) -> TimerState {
    let stored = match state.store().get(TIMER_STATE_KEY) {
        Ok(Some(stored)) => stored,
        Ok(None) => return TimerState::new(),
        Err(e) => {
            warn!("Failed to read persisted timer state, starting idle: {}", e);
            return TimerState::new();
        }
    };

    match serde_json::from_value(stored) {
        Ok(timer) => timer,
        Err(e) => {
            warn!("Persisted timer state is malformed, starting idle: {}", e);
            TimerState::new()
        }
    }
}

/// Reload options and timer state, then resume whatever was in progress
pub async fn restore_timer(state: &Arc<AppState>) {
    state.reload_options();
    let timer = load_timer_state(state);

    let mut engine = state.engine.lock().await;
    engine.stop_ticking();
    engine.alarm.stop();
    engine.timer = timer;

    match engine.timer.status {
        TimerStatus::Running => {
            let remaining = engine.timer.refresh(state.now_ms());
            if remaining <= 0.0 {
                info!("Countdown elapsed while stopped, finishing now");
                state.finish_locked(&mut engine);
            } else {
                info!("Resuming countdown with {:.1}s remaining", remaining);
                state.start_ticking(&mut engine);
                state.publish_badge(&engine.timer);
            }
        }
        TimerStatus::Paused => {
            let remaining = engine.timer.refresh(state.now_ms());
            info!("Restored paused timer with {:.1}s remaining", remaining);
            state.publish_badge(&engine.timer);
        }
        TimerStatus::Finished => {
            engine.timer.finish();
            info!("Restored finished timer, restarting alarm");
            state.publish_badge(&engine.timer);
            state.start_alarm_locked(&mut engine);
        }
        TimerStatus::Idle => {
            engine.timer.reset();
            state.publish_badge(&engine.timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        badge::Badge,
        state::{
            app_state::tests::{advance, harness_with, T0},
            TimerEvent,
        },
        store::{MemoryStore, OPTIONS_KEY},
    };
    use serde_json::json;

    fn stored(status: &str, started_at: Option<i64>, paused_remaining: Option<f64>) -> MemoryStore {
        MemoryStore::new().with_record(
            TIMER_STATE_KEY,
            json!({
                "status": status,
                "totalSeconds": 90,
                "remainingSeconds": 90.0,
                "startedAt": started_at,
                "pausedRemaining": paused_remaining,
            }),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_that_elapsed_while_stopped_finishes_immediately() {
        let h = harness_with(stored("running", Some(T0), Some(90.0)));
        h.clock.set(T0 + 100_000);
        let mut rx = h.state.subscribe();

        restore_timer(&h.state).await;

        let snapshot = h.state.get_state().await;
        assert_eq!(snapshot.status, TimerStatus::Finished);
        assert_eq!(snapshot.remaining_seconds, 0.0);
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::Finished);
        assert!(rx.try_recv().is_err());
        assert!(h.state.engine.lock().await.is_alarm_sounding());
        assert_eq!(h.state.badge().text, "!");
    }

    #[tokio::test(start_paused = true)]
    async fn running_countdown_resumes_ticking() {
        let h = harness_with(stored("running", Some(T0), Some(90.0)));
        h.clock.set(T0 + 30_000);

        restore_timer(&h.state).await;

        let snapshot = h.state.get_state().await;
        assert_eq!(snapshot.status, TimerStatus::Running);
        assert_eq!(snapshot.remaining_seconds, 60.0);
        assert!(h.state.engine.lock().await.is_ticking());
        assert_eq!(h.state.badge().text, "1m");

        h.clock.set(T0 + 91_000);
        advance(0.5).await;
        advance(0.5).await;
        assert_eq!(h.state.get_state().await.status, TimerStatus::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_timer_is_restored_without_ticking() {
        let h = harness_with(stored("paused", Some(T0), Some(42.0)));
        h.clock.set(T0 + 1_000_000);

        restore_timer(&h.state).await;

        let snapshot = h.state.get_state().await;
        assert_eq!(snapshot.status, TimerStatus::Paused);
        assert_eq!(snapshot.remaining_seconds, 42.0);
        assert!(!h.state.engine.lock().await.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn negative_paused_baseline_restores_as_zero() {
        let h = harness_with(stored("paused", None, Some(-4.0)));
        restore_timer(&h.state).await;
        assert_eq!(h.state.get_state().await.remaining_seconds, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn finished_timer_restarts_alarm_without_new_notification() {
        let h = harness_with(
            stored("finished", None, None).with_record(OPTIONS_KEY, json!({"autoDismiss": true, "alarmDuration": 3})),
        );
        let mut rx = h.state.subscribe();

        restore_timer(&h.state).await;
        advance(0.0).await;

        assert!(h.state.engine.lock().await.is_alarm_sounding());
        assert_eq!(h.effects.chime_count(), 1);
        assert!(h.effects.shown().is_empty());
        assert!(rx.try_recv().is_err());

        // Auto-dismiss uses the reloaded options
        advance(3.0).await;
        assert_eq!(h.state.get_state().await.status, TimerStatus::Idle);
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::StateChanged);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_state_starts_idle() {
        let h = harness_with(MemoryStore::new().with_record(TIMER_STATE_KEY, json!({"status": "brewing"})));
        restore_timer(&h.state).await;
        assert_eq!(h.state.get_state().await.status, TimerStatus::Idle);
        assert_eq!(h.state.badge(), Badge::cleared());
    }
}
