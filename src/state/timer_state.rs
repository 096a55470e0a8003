//! Timer state structure and its pure transitions
//!
//! Every method takes the current wall-clock time explicitly. Remaining time
//! is always recomputed from `started_at` and `paused_remaining`, never
//! decremented per tick, so a state reloaded after the process slept through
//! part (or all) of the countdown is still correct.

use serde::{Deserialize, Serialize};

/// Lifecycle of the single timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Finished => "finished",
        }
    }
}

/// Persisted timer state (record `timerState`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub total_seconds: u32,
    pub remaining_seconds: f64,
    /// Epoch milliseconds at which the current running interval began
    pub started_at: Option<i64>,
    /// Remaining seconds as of the last start/pause/resume
    pub paused_remaining: Option<f64>,
}

/// What `getState` hands out to surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub total_seconds: u32,
    pub remaining_seconds: f64,
}

fn elapsed_secs(started_at: Option<i64>, now_ms: i64) -> f64 {
    match started_at {
        Some(started) => (now_ms.saturating_sub(started)).max(0) as f64 / 1000.0,
        None => 0.0,
    }
}

impl TimerState {
    /// Create a new idle timer state
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline for recomputation; negative persisted values count as zero
    pub fn baseline(&self) -> f64 {
        self.paused_remaining.unwrap_or(0.0).max(0.0)
    }

    /// Remaining seconds at `now_ms` without touching any field
    pub fn compute_remaining(&self, now_ms: i64) -> f64 {
        match self.status {
            TimerStatus::Running => {
                (self.baseline() - elapsed_secs(self.started_at, now_ms)).max(0.0)
            }
            TimerStatus::Paused => self.baseline(),
            TimerStatus::Idle | TimerStatus::Finished => 0.0,
        }
    }

    /// Refresh the cached display value and return it
    pub fn refresh(&mut self, now_ms: i64) -> f64 {
        self.remaining_seconds = self.compute_remaining(now_ms);
        self.remaining_seconds
    }

    pub fn snapshot(&self, now_ms: i64) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            total_seconds: self.total_seconds,
            remaining_seconds: self.compute_remaining(now_ms),
        }
    }

    pub fn start(&mut self, total_seconds: u32, now_ms: i64) {
        let total = f64::from(total_seconds);
        self.status = TimerStatus::Running;
        self.total_seconds = total_seconds;
        self.remaining_seconds = total;
        self.paused_remaining = Some(total);
        self.started_at = Some(now_ms);
    }

    /// Running → paused. Returns false when nothing changed.
    pub fn pause(&mut self, now_ms: i64) -> bool {
        if self.status != TimerStatus::Running {
            return false;
        }
        let remaining = (self.baseline() - elapsed_secs(self.started_at, now_ms)).max(0.0);
        self.paused_remaining = Some(remaining);
        self.remaining_seconds = remaining;
        self.status = TimerStatus::Paused;
        true
    }

    /// Paused → running. Returns false when nothing changed.
    pub fn resume(&mut self, now_ms: i64) -> bool {
        if self.status != TimerStatus::Paused {
            return false;
        }
        self.paused_remaining = Some(self.baseline());
        self.remaining_seconds = self.baseline();
        self.started_at = Some(now_ms);
        self.status = TimerStatus::Running;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Extend a running or paused countdown. Returns false when nothing changed.
    pub fn add_time(&mut self, seconds: u32) -> bool {
        let extra = f64::from(seconds);
        match self.status {
            TimerStatus::Running => {
                self.paused_remaining = Some(self.baseline() + extra);
                self.remaining_seconds += extra;
            }
            TimerStatus::Paused => {
                self.paused_remaining = Some(self.baseline() + extra);
                self.remaining_seconds = self.baseline();
            }
            TimerStatus::Idle | TimerStatus::Finished => return false,
        }
        self.total_seconds = self.total_seconds.saturating_add(seconds);
        true
    }

    pub fn finish(&mut self) {
        self.status = TimerStatus::Finished;
        self.remaining_seconds = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn running_remaining_is_baseline_minus_elapsed() {
        for (baseline, elapsed) in [(90.0, 0.0), (90.0, 30.5), (90.0, 90.0), (90.0, 100.0), (5.0, 4.2)] {
            let mut state = TimerState::new();
            state.start(1, T0);
            state.paused_remaining = Some(baseline);
            let now = T0 + (elapsed * 1000.0) as i64;
            let expected = f64::max(0.0, baseline - elapsed);
            assert!((state.compute_remaining(now) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn clock_going_backwards_does_not_add_time() {
        let mut state = TimerState::new();
        state.start(60, T0);
        assert_eq!(state.compute_remaining(T0 - 5_000), 60.0);
    }

    #[test]
    fn pause_then_resume_keeps_remaining() {
        let mut state = TimerState::new();
        state.start(120, T0);
        assert!(state.pause(T0 + 20_000));
        assert_eq!(state.remaining_seconds, 100.0);
        assert!(state.resume(T0 + 20_000));
        assert_eq!(state.compute_remaining(T0 + 20_000), 100.0);
        // Time spent paused does not count
        assert!(state.pause(T0 + 20_000));
        assert!(state.resume(T0 + 500_000));
        assert_eq!(state.compute_remaining(T0 + 510_000), 90.0);
    }

    #[test]
    fn pause_and_resume_only_from_matching_status() {
        let mut state = TimerState::new();
        assert!(!state.pause(T0));
        assert!(!state.resume(T0));
        state.start(10, T0);
        assert!(!state.resume(T0));
        state.finish();
        assert!(!state.pause(T0));
    }

    #[test]
    fn add_time_while_running_extends_total_and_remaining() {
        let mut state = TimerState::new();
        state.start(60, T0);
        let before = state.compute_remaining(T0 + 10_000);
        assert!(state.add_time(30));
        assert_eq!(state.total_seconds, 90);
        assert_eq!(state.compute_remaining(T0 + 10_000), before + 30.0);
    }

    #[test]
    fn add_time_while_paused_updates_display() {
        let mut state = TimerState::new();
        state.start(60, T0);
        state.pause(T0 + 15_000);
        assert!(state.add_time(60));
        assert_eq!(state.remaining_seconds, 105.0);
        assert_eq!(state.total_seconds, 120);
    }

    #[test]
    fn add_time_is_noop_when_idle_or_finished() {
        let mut state = TimerState::new();
        assert!(!state.add_time(30));
        assert_eq!(state, TimerState::new());

        state.start(5, T0);
        state.finish();
        let before = state.clone();
        assert!(!state.add_time(30));
        assert_eq!(state, before);
    }

    #[test]
    fn reset_clears_every_field() {
        let mut state = TimerState::new();
        state.start(300, T0);
        state.pause(T0 + 1_000);
        state.reset();
        assert_eq!(state.status, TimerStatus::Idle);
        assert_eq!(state.total_seconds, 0);
        assert_eq!(state.remaining_seconds, 0.0);
        assert_eq!(state.started_at, None);
        assert_eq!(state.paused_remaining, None);
    }

    #[test]
    fn negative_paused_baseline_reads_as_zero() {
        let state = TimerState {
            status: TimerStatus::Paused,
            total_seconds: 10,
            remaining_seconds: -3.0,
            started_at: None,
            paused_remaining: Some(-3.0),
        };
        assert_eq!(state.compute_remaining(T0), 0.0);
    }

    #[test]
    fn serializes_in_camel_case() {
        let mut state = TimerState::new();
        state.start(90, T0);
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["status"], "running");
        assert_eq!(value["totalSeconds"], 90);
        assert_eq!(value["startedAt"], T0);
        assert_eq!(value["pausedRemaining"], 90.0);

        let idle = serde_json::to_value(TimerState::new()).unwrap();
        assert!(idle["startedAt"].is_null());
        assert!(idle["pausedRemaining"].is_null());
    }
}
