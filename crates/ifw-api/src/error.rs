//! API error types and JSON error responses.
//!
//! Every failure maps to a status code and an `{"error": "<code>"}` body.
//! Causes are logged here, never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ifw_inject::DispatchError;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400, the text was empty.
    Empty,
    /// 400, the body was not a JSON object with a string `text`.
    InvalidJson,
    /// 403, token missing or wrong.
    Forbidden,
    /// 500, the backend failed. Carries the cause for the log.
    Injection(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Empty | ApiError::InvalidJson => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Injection(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Empty => "empty",
            ApiError::InvalidJson => "invalid json",
            ApiError::Forbidden => "forbidden",
            ApiError::Injection(_) => "injection failed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Injection(cause) = &self {
            tracing::error!(error = %cause, "Injection failed");
        }
        let body = ErrorBody {
            error: self.code().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Empty => ApiError::Empty,
            DispatchError::Injection(e) => ApiError::Injection(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(_: AuthError) -> Self {
        ApiError::Forbidden
    }
}
