//! `POST /chat` — plant-doctor conversation.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;
use crate::services::chat as chat_svc;
use crate::services::history::ChatTurn;
use crate::services::prompts::ReportContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub report_context: Option<ReportContext>,
    #[serde(default, deserialize_with = "lenient_history")]
    pub history: Vec<ChatTurn>,
}

/// Anything but an array is treated as no history.
fn lenient_history<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ChatTurn>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(ChatTurn::from).collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        warn!(error = %rejection, "chat: unreadable body");
        ApiError::Validation("Message is required".into())
    })?;

    let message = body
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Message is required".into()))?;

    let report = body.report_context.unwrap_or_default();

    let reply = chat_svc::reply(state.gateway.as_ref(), message, &report, &body.history).await?;
    Ok(Json(ChatReply { reply }))
}
