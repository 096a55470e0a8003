//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use super::responses::{
    api_error, Ack, AddTimeRequest, ApiError, HealthResponse, PopupInputs, PopupResponse,
    QuickAddRequest, QuickAddResponse, StartRequest,
};
use crate::{
    badge::Badge,
    state::{AppState, Options, TimerSnapshot},
    surfaces::{
        control::{preset_buttons, quick_add},
        settings, ControlView, DurationInput, QuickAdd, SettingsForm,
    },
};

/// Handle POST /start - Start a countdown of `totalSeconds`
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> Result<Json<Ack>, ApiError> {
    state
        .start(request.total_seconds)
        .await
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;
    Ok(Json(Ack::ok()))
}

/// Handle POST /pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<Ack> {
    state.pause().await;
    Json(Ack::ok())
}

/// Handle POST /resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Json<Ack> {
    state.resume().await;
    Json(Ack::ok())
}

/// Handle POST /reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<Ack> {
    state.reset().await;
    Json(Ack::ok())
}

/// Handle POST /add-time - Extend a running or paused countdown
pub async fn add_time_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddTimeRequest>,
) -> Result<Json<Ack>, ApiError> {
    state
        .add_time(request.seconds)
        .await
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;
    Ok(Json(Ack::ok()))
}

/// Handle POST /dismiss - The completion notice was closed or clicked
pub async fn dismiss_handler(State(state): State<Arc<AppState>>) -> Json<Ack> {
    state.dismiss().await;
    Json(Ack::ok())
}

/// Handle GET /state
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Json<TimerSnapshot> {
    Json(state.get_state().await)
}

/// Handle GET /options
pub async fn options_handler(State(state): State<Arc<AppState>>) -> Json<Options> {
    Json(state.options().as_ref().clone())
}

/// Handle POST /options/changed - Reload options and broadcast `optionsUpdated`
pub async fn options_changed_handler(State(state): State<Arc<AppState>>) -> Json<Ack> {
    state.options_changed();
    Json(Ack::ok())
}

/// Handle GET /badge
pub async fn badge_handler(State(state): State<Arc<AppState>>) -> Json<Badge> {
    Json(state.badge())
}

/// Handle GET /popup - Render the control surface for the given inputs
pub async fn popup_handler(
    State(state): State<Arc<AppState>>,
    Query(inputs): Query<PopupInputs>,
) -> Json<PopupResponse> {
    let snapshot = state.get_state().await;
    let options = state.options();
    let input = DurationInput::parse(&inputs.minutes, &inputs.seconds);

    Json(PopupResponse {
        view: ControlView::new(&snapshot, &options),
        presets: preset_buttons(&options, input),
        badge: state.badge(),
    })
}

/// Handle POST /popup/start - Start from the raw duration inputs
pub async fn popup_start_handler(
    State(state): State<Arc<AppState>>,
    Json(inputs): Json<PopupInputs>,
) -> Result<Json<Ack>, ApiError> {
    let total = DurationInput::parse(&inputs.minutes, &inputs.seconds)
        .start_seconds()
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;

    state
        .start(i64::from(total))
        .await
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;
    Ok(Json(Ack::ok()))
}

/// Handle POST /popup/quick-add - Apply a "+N" chip
pub async fn quick_add_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuickAddRequest>,
) -> Result<Json<QuickAddResponse>, ApiError> {
    let status = state.get_state().await.status;
    let input = DurationInput::parse(&request.inputs.minutes, &request.inputs.seconds);

    let response = match quick_add(status, input, request.add) {
        QuickAdd::Inputs(updated) => {
            let (minutes, seconds) = updated.display();
            QuickAddResponse {
                ok: true,
                minutes: Some(minutes),
                seconds: Some(seconds),
            }
        }
        QuickAdd::AddTime(seconds) => {
            state
                .add_time(i64::from(seconds))
                .await
                .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;
            QuickAddResponse { ok: true, minutes: None, seconds: None }
        }
        QuickAdd::Ignored => QuickAddResponse { ok: true, minutes: None, seconds: None },
    };
    Ok(Json(response))
}

/// Handle GET /settings - Load the options form, retrying on storage errors
pub async fn settings_handler(State(state): State<Arc<AppState>>) -> Json<SettingsForm> {
    Json(settings::load_form(&state).await)
}

/// Handle GET /settings/defaults - The form with default values
pub async fn settings_defaults_handler() -> Json<SettingsForm> {
    Json(SettingsForm::defaults())
}

/// Handle PUT /settings - Validate and save the options form
pub async fn save_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SettingsForm>,
) -> Result<Json<Options>, ApiError> {
    match settings::save(&state, &form) {
        Ok(options) => {
            info!("Settings saved from options page");
            Ok(Json(options))
        }
        Err(e) => {
            error!("Failed to save settings: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.get_uptime()))
}
