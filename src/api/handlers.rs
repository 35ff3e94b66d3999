//! HTTP request handlers

use super::types::{
    ConnectedResponse, ErrorResponse, GridResponse, InboundRequest, QueuedResponse,
    RespondentListResponse,
};
use super::AppState;
use crate::state_machine::InboundMessage;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Channel ingress
        .route("/api/inbound", post(receive_inbound))
        .route("/api/connected", post(channel_connected))
        // Operator views
        .route("/api/respondents", get(list_respondents))
        .route("/api/grid", get(get_grid))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Channel Ingress
// ============================================================

async fn receive_inbound(
    State(state): State<AppState>,
    Json(req): Json<InboundRequest>,
) -> Result<(StatusCode, Json<QueuedResponse>), AppError> {
    let from = req.from.trim();
    if from.is_empty() {
        return Err(AppError::BadRequest("Sender id is required".to_string()));
    }

    let message = InboundMessage {
        respondent_id: from.to_string(),
        media: req.media,
        text: req.text,
    };
    let queued = state
        .runtime
        .dispatch(message)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((StatusCode::ACCEPTED, Json(QueuedResponse { queued })))
}

async fn channel_connected(State(state): State<AppState>) -> Json<ConnectedResponse> {
    let notified = state.runtime.connected().await;
    Json(ConnectedResponse { notified })
}

// ============================================================
// Operator Views
// ============================================================

async fn list_respondents(State(state): State<AppState>) -> Json<RespondentListResponse> {
    Json(RespondentListResponse {
        respondents: state.runtime.snapshot().await,
    })
}

async fn get_grid(State(state): State<AppState>) -> Json<GridResponse> {
    let mut rows = state.runtime.grid().snapshot().await.to_rows().into_iter();
    let header = rows.next().unwrap_or_default();
    Json(GridResponse {
        header,
        rows: rows.collect(),
    })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("survey-bot ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
