//! Wall clock abstraction
//!
//! The engine stores `startedAt` as epoch milliseconds and recomputes the
//! remaining time from it, so it needs real wall-clock time rather than a
//! monotonic instant: the value has to stay meaningful across restarts.

#[cfg(any(test, feature = "test-util"))]
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::Utc;

/// Source of wall-clock time in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

#[cfg(any(test, feature = "test-util"))]
impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.now.fetch_add((secs * 1000.0) as i64, Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_shared_handle() {
        let clock = ManualClock::new(1_000);
        let handle = clock.clone();
        handle.advance_secs(2.5);
        assert_eq!(clock.now_ms(), 3_500);
        clock.set(10);
        assert_eq!(handle.now_ms(), 10);
    }
}
