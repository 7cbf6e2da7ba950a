//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/v1/messages`. Pure building and parsing for
//! testability.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::GatewayError;
use crate::services::history::{NormalizedHistory, Role};

const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    pub async fn chat(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        history: &NormalizedHistory,
        message: &str,
    ) -> Result<String, GatewayError> {
        let messages = build_chat_messages(history, message);
        let system = Some(system).filter(|s| !s.trim().is_empty());
        self.send(&ApiRequest { model, max_tokens, system, messages: &messages })
            .await
    }

    pub async fn vision(
        &self,
        model: &str,
        max_tokens: u32,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, GatewayError> {
        let messages = build_vision_messages(prompt, image, mime_type);
        self.send(&ApiRequest { model, max_tokens, system: None, messages: &messages })
            .await
    }

    async fn send(&self, body: &ApiRequest<'_>) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(GatewayError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ApiMessage],
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiMessage {
    role: &'static str,
    content: Vec<InputBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum InputBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "image")]
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<OutputBlock>,
}

/// Response content block. Only text is kept; thinking, tool use, and
/// future block types are ignored.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum OutputBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(other)]
    Other,
}

// =============================================================================
// REQUEST BUILDING
// =============================================================================

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "assistant",
    }
}

pub(crate) fn build_chat_messages(history: &NormalizedHistory, message: &str) -> Vec<ApiMessage> {
    let mut out: Vec<ApiMessage> = history
        .turns()
        .iter()
        .map(|turn| ApiMessage {
            role: role_name(turn.role),
            content: vec![InputBlock::Text { text: turn.text.clone() }],
        })
        .collect();
    out.push(ApiMessage { role: "user", content: vec![InputBlock::Text { text: message.to_string() }] });
    out
}

pub(crate) fn build_vision_messages(prompt: &str, image: &[u8], mime_type: &str) -> Vec<ApiMessage> {
    vec![ApiMessage {
        role: "user",
        content: vec![
            InputBlock::Image {
                source: ImageSource {
                    source_type: "base64",
                    media_type: mime_type.to_string(),
                    data: BASE64.encode(image),
                },
            },
            InputBlock::Text { text: prompt.to_string() },
        ],
    }]
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_response(json: &str) -> Result<String, GatewayError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| GatewayError::ApiParse(e.to_string()))?;

    let text: String = api
        .content
        .into_iter()
        .filter_map(|block| match block {
            OutputBlock::Text { text } => Some(text),
            OutputBlock::Other => None,
        })
        .collect();

    if text.is_empty() {
        return Err(GatewayError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
