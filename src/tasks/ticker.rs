//! Periodic recomputation while the timer runs

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::debug;

use crate::state::AppState;

pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Spawn the ticker. It stops by itself once the timer leaves `running`;
/// commands that stop it earlier abort the returned handle.
pub fn spawn_ticker(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            if !state.tick().await {
                break;
            }
        }
        debug!("Ticker stopped");
    })
}
