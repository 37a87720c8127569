use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde_json::{json, Value};

use lexcheck_core::{
    config::Config, engine::Engine, feedback::FeedbackRequest, types::ValidationRequest,
    EngineError,
};

// ── App state ─────────────────────────────────────────────────────────────

pub struct AppState {
    pub engine: Arc<Engine>,
    pub config: Arc<Config>,
    /// Per-session feedback submission counters: session → (window start
    /// epoch seconds, submissions in window). Abuse control, not correctness.
    feedback_windows: Mutex<HashMap<String, (i64, u32)>>,
}

const RATE_WINDOW_SECS: i64 = 60;

impl AppState {
    pub fn new(engine: Arc<Engine>, config: Arc<Config>) -> Self {
        Self {
            engine,
            config,
            feedback_windows: Mutex::new(HashMap::new()),
        }
    }

    /// Fixed-window rate check; true when the session may submit.
    fn allow_feedback(&self, session_id: &str) -> bool {
        let mut windows = self
            .feedback_windows
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        allow_in_window(
            &mut windows,
            session_id,
            Utc::now().timestamp(),
            self.config.feedback_rate_limit,
        )
    }
}

/// Counts a submission against the session's current window. Expired
/// windows are swept on every call so the map stays bounded by the number
/// of sessions active in the last window.
fn allow_in_window(
    windows: &mut HashMap<String, (i64, u32)>,
    session_id: &str,
    now: i64,
    limit: u32,
) -> bool {
    windows.retain(|_, (start, _)| now - *start < RATE_WINDOW_SECS);
    let entry = windows.entry(session_id.to_string()).or_insert((now, 0));
    if entry.1 >= limit {
        return false;
    }
    entry.1 += 1;
    true
}

// ── Error mapping ─────────────────────────────────────────────────────────

pub enum ApiError {
    Engine(EngineError),
    RateLimited,
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": "rate_limited", "reason": "feedback submission limit reached" }),
            ),
            Self::Engine(EngineError::InvalidCaseContext { field, reason }) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_case_context", "field": field, "reason": reason }),
            ),
            Self::Engine(EngineError::InvalidFeedback { field, reason }) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_feedback", "field": field, "reason": reason }),
            ),
            Self::Engine(e @ EngineError::CollaboratorUnavailable)
            | Self::Engine(e @ EngineError::CollaboratorTimeout { .. }) => {
                tracing::warn!("collaborators unavailable: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "collaborators_unavailable", "reason": "retry later" }),
                )
            }
            Self::Engine(e) => {
                tracing::error!("internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn validate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValidationRequest>,
) -> Result<Json<Value>, ApiError> {
    let out = state.engine.validate(&body).await?;
    Ok(Json(json!(out)))
}

pub async fn post_feedback(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FeedbackRequest>,
) -> Result<Json<Value>, ApiError> {
    // Same 200 whether the vote was created or replaced; clients cannot
    // distinguish the two.
    if !body.session_id.trim().is_empty() && !state.allow_feedback(body.session_id.trim()) {
        return Err(ApiError::RateLimited);
    }
    let stored = state.engine.record_feedback(&body)?;
    Ok(Json(json!(stored)))
}

pub async fn get_session_feedback(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let records = state.engine.session_feedback(&session_id)?;
    Ok(Json(json!({ "feedback": records })))
}
