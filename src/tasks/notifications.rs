//! Routes clicks on system notifications back into the engine

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

use crate::state::AppState;

/// Dismiss the alarm whenever the completion notification is clicked
pub fn spawn_click_listener(state: Arc<AppState>, mut clicks: mpsc::UnboundedReceiver<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(tag) = clicks.recv().await {
            state.notification_clicked(&tag).await;
        }
        debug!("Notification click channel closed");
    })
}
