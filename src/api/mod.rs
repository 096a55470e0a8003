//! HTTP API module
//!
//! Commands and queries for the timer engine, the event stream, and the
//! popup/options surfaces.

pub mod events;
pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use events::events_handler;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Engine commands
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .route("/reset", post(reset_handler))
        .route("/add-time", post(add_time_handler))
        .route("/dismiss", post(dismiss_handler))
        .route("/state", get(state_handler))
        .route("/options", get(options_handler))
        .route("/options/changed", post(options_changed_handler))
        .route("/badge", get(badge_handler))
        .route("/events", get(events_handler))
        // Control surface
        .route("/popup", get(popup_handler))
        .route("/popup/start", post(popup_start_handler))
        .route("/popup/quick-add", post(quick_add_handler))
        // Settings surface
        .route("/settings", get(settings_handler).put(save_settings_handler))
        .route("/settings/defaults", get(settings_defaults_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
