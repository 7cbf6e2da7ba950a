//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two JSON endpoints in front of the completion gateway, plus a health
//! probe. CORS is fully open; every request is traced; the body limit
//! bounds how much image data a single request can hold in memory.

pub mod analyze;
pub mod chat;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/chat", post(chat::chat))
        .route("/analyze", post(analyze::analyze))
        .route("/healthz", get(healthz))
        .layer(body_limit)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
