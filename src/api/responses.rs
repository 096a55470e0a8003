//! API request and response structures

use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    badge::Badge,
    surfaces::{control::PresetButton, ControlView},
};

/// Acknowledgement for fire-and-forget commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Body returned when a command is refused
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Build an error response with the given status
pub fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            ok: false,
            error: error.to_string(),
            timestamp: Utc::now(),
        }),
    )
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub total_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTimeRequest {
    pub seconds: i64,
}

/// Raw popup inputs, exactly as typed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PopupInputs {
    #[serde(default)]
    pub minutes: String,
    #[serde(default)]
    pub seconds: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickAddRequest {
    /// Seconds the chip adds
    pub add: u32,
    #[serde(flatten)]
    pub inputs: PopupInputs,
}

/// Outcome of a quick-add chip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickAddResponse {
    pub ok: bool,
    /// New input values when the timer was idle
    pub minutes: Option<String>,
    pub seconds: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopupResponse {
    pub view: ControlView,
    pub presets: Vec<PresetButton>,
    pub badge: Badge,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok(uptime: String) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime,
        }
    }
}
