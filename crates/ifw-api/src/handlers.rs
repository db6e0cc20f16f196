//! Route handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /send`. A missing `text` counts as empty.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET / - the editing page.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page_html.to_string())
}

/// POST /send - inject the text into the focused desktop input.
///
/// The body is parsed as JSON whatever the content type says.
pub async fn send(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SendResponse>, ApiError> {
    let request: SendRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, bytes = body.len(), "Unparseable send body");
        ApiError::InvalidJson
    })?;
    if request.text.is_empty() {
        return Err(ApiError::Empty);
    }

    state
        .dispatcher
        .inject(&request.text, state.method)
        .await?;

    Ok(Json(SendResponse { ok: true }))
}

/// GET /health - liveness check, no token required.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
