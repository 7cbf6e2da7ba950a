//! Request-boundary errors.
//!
//! DESIGN
//! ======
//! Every failure inside a handler is mapped to one `ApiError` and rendered
//! as a complete `{ "error": text }` JSON object. Internal details (gateway
//! bodies, raw model text) are logged here and never sent to the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use crate::llm::types::GatewayError;
use crate::services::analyze::AnalyzeError;

/// Grepable code + retry hint for any error that crosses a layer boundary.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Body shape for every non-success response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required input missing; the message names the field.
    #[error("{0}")]
    Validation(String),

    /// Request body exceeded the configured upload limit.
    #[error("upload exceeds limit: {0}")]
    PayloadTooLarge(String),

    #[error("chat failed: {0}")]
    Chat(#[from] GatewayError),

    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalyzeError),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::PayloadTooLarge(_) => "E_PAYLOAD_TOO_LARGE",
            Self::Chat(e) => e.error_code(),
            Self::Analysis(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::PayloadTooLarge(_) => false,
            Self::Chat(e) => e.retryable(),
            Self::Analysis(e) => e.retryable(),
        }
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Chat(_) | Self::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing message. Only validation errors echo their detail.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::PayloadTooLarge(_) => "Image too large".into(),
            Self::Chat(_) => "Chat service unavailable".into(),
            Self::Analysis(_) => "AI analysis failed".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.error_code(), retryable = self.retryable(), error = %self, "request failed");
        } else {
            warn!(code = self.error_code(), error = %self, "request rejected");
        }
        (status, Json(ErrorBody { error: self.public_message() })).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
