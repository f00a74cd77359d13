//! HTTP request handlers

use super::AppState;
use crate::runtime::{ChartRenderer, Transport};
use crate::telegram::{self, types::Update};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

/// Create the HTTP router
pub fn create_router<T, C>(state: AppState<T, C>) -> Router
where
    T: Transport + 'static,
    C: ChartRenderer + 'static,
{
    Router::new()
        // Liveness (GET and HEAD)
        .route("/", get(liveness))
        .route("/webhook/:token", post(receive_update::<T, C>))
        .with_state(state)
}

async fn liveness() -> &'static str {
    tracing::debug!(at = %chrono::Utc::now().to_rfc3339(), "Liveness ping");
    "Bot is running"
}

// ============================================================
// Webhook
// ============================================================

async fn receive_update<T, C>(
    State(state): State<AppState<T, C>>,
    Path(token): Path<String>,
    Json(body): Json<Value>,
) -> Result<&'static str, AppError>
where
    T: Transport + 'static,
    C: ChartRenderer + 'static,
{
    if token != *state.webhook_token {
        tracing::warn!("Webhook called with wrong token");
        return Err(AppError::NotFound);
    }

    // Malformed updates are acknowledged so the platform does not redeliver them
    let update: Update = match serde_json::from_value(body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed update");
            return Ok("OK");
        }
    };

    if let Some(message) = telegram::parse_update(update) {
        state
            .registry
            .dispatch(message)
            .await
            .map_err(AppError::Internal)?;
    }
    Ok("OK")
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    NotFound,
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Failed to dispatch update");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}
