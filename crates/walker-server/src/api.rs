//! API handlers for the server.

use crate::protocol::ServerMessage;
use crate::session::{Session, SessionStatus};
use crate::ws;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use walker_core::ModelConfig;
use walker_world::MetricsTable;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub page: Arc<str>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/ws", get(ws::ws_handler))
        .route("/api/params", get(get_params).post(submit_params))
        .route("/api/frame", get(get_frame))
        .route("/api/step", post(step))
        .route("/api/reset", post(reset))
        .route("/api/stop", post(stop))
        .route("/api/metrics", get(get_metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Visualization page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.to_string())
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    model: SessionStatus,
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.session.status(),
    })
}

/// Parameters used by the next reset
pub async fn get_params(State(state): State<AppState>) -> Json<ModelConfig> {
    Json(state.session.params())
}

#[derive(Deserialize)]
pub struct ParamUpdate {
    param: String,
    value: serde_json::Value,
}

pub async fn submit_params(
    State(state): State<AppState>,
    Json(update): Json<ParamUpdate>,
) -> Result<Json<ModelConfig>, ApiError> {
    info!("Parameter {} submitted", update.param);
    let params = state.session.submit_param(&update.param, &update.value)?;
    Ok(Json(params))
}

/// Current frame without stepping
pub async fn get_frame(State(state): State<AppState>) -> Json<ServerMessage> {
    let (step, frame) = state.session.frame();
    Json(ServerMessage::VizState {
        step,
        data: vec![frame],
    })
}

/// Advance the model one step
pub async fn step(State(state): State<AppState>) -> Result<Json<ServerMessage>, ApiError> {
    let reply = match state.session.step()? {
        Some((step, frame)) => ServerMessage::VizState {
            step,
            data: vec![frame],
        },
        None => ServerMessage::End,
    };
    Ok(Json(reply))
}

/// Rebuild the model from the current parameters
pub async fn reset(State(state): State<AppState>) -> Result<Json<ServerMessage>, ApiError> {
    let (step, frame) = state.session.reset()?;
    Ok(Json(ServerMessage::VizState {
        step,
        data: vec![frame],
    }))
}

/// Clear the model's running flag
pub async fn stop(State(state): State<AppState>) -> Json<SessionStatus> {
    state.session.stop();
    Json(state.session.status())
}

/// Collected metric log
pub async fn get_metrics(State(state): State<AppState>) -> Json<MetricsTable> {
    Json(state.session.metrics())
}

// Error handling
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<walker_core::Error> for ApiError {
    fn from(err: walker_core::Error) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            error!("Core error: {}", err);
            ApiError::Internal(err.to_string())
        }
    }
}
