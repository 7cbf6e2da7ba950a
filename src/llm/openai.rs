//! OpenAI-compatible Chat Completions client.
//!
//! Works against any `/chat/completions` endpoint that accepts
//! `image_url` content parts (OpenAI, OpenRouter, local gateways).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::GatewayError;
use crate::services::history::{NormalizedHistory, Role};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
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
        let messages = build_chat_messages(system, history, message);
        let text = self
            .send_json(&CcRequest { model, max_tokens, messages: &messages })
            .await?;
        parse_chat_completions_response(&text)
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
        let text = self
            .send_json(&CcRequest { model, max_tokens, messages: &messages })
            .await?;
        parse_chat_completions_response(&text)
    }

    async fn send_json(&self, body: &impl Serialize) -> Result<String, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
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
        Ok(text)
    }
}

// =============================================================================
// CHAT COMPLETIONS — wire types
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [CcMessage],
}

#[derive(Debug, Serialize)]
pub(crate) struct CcMessage {
    role: &'static str,
    content: CcContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum CcContent {
    Text(String),
    Parts(Vec<CcPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum CcPart {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "image_url")]
    ImageUrl { image_url: CcImageUrl },
}

#[derive(Debug, Serialize)]
struct CcImageUrl {
    url: String,
}

pub(crate) fn build_chat_messages(system: &str, history: &NormalizedHistory, message: &str) -> Vec<CcMessage> {
    let mut out = Vec::with_capacity(history.len() + 2);
    if !system.trim().is_empty() {
        out.push(CcMessage { role: "system", content: CcContent::Text(system.to_string()) });
    }
    for turn in history.turns() {
        let role = match turn.role {
            Role::User => "user",
            Role::Model => "assistant",
        };
        out.push(CcMessage { role, content: CcContent::Text(turn.text.clone()) });
    }
    out.push(CcMessage { role: "user", content: CcContent::Text(message.to_string()) });
    out
}

pub(crate) fn build_vision_messages(prompt: &str, image: &[u8], mime_type: &str) -> Vec<CcMessage> {
    let url = format!("data:{mime_type};base64,{}", BASE64.encode(image));
    vec![CcMessage {
        role: "user",
        content: CcContent::Parts(vec![
            CcPart::Text { text: prompt.to_string() },
            CcPart::ImageUrl { image_url: CcImageUrl { url } },
        ]),
    }]
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<String, GatewayError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| GatewayError::ApiParse(e.to_string()))?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(GatewayError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };

    let content = choice.get("message").and_then(|m| m.get("content"));
    let text = match content {
        Some(Value::String(s)) => s.clone(),
        // Some compatible servers return content as an array of parts.
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect(),
        _ => String::new(),
    };

    if text.is_empty() {
        return Err(GatewayError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
