//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper. Request building and response parsing are pure
//! functions so they can be tested without a network.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::GatewayError;
use crate::services::history::NormalizedHistory;

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
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
        let body = build_chat_request(max_tokens, system, history, message);
        self.generate(model, &body).await
    }

    pub async fn vision(
        &self,
        model: &str,
        max_tokens: u32,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, GatewayError> {
        let body = build_vision_request(max_tokens, prompt, image, mime_type);
        self.generate(model, &body).await
    }

    async fn generate(&self, model: &str, body: &GenerateRequest) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(endpoint(&self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
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

fn endpoint(base_url: &str, model: &str) -> String {
    let model = model.trim();
    if model.starts_with("models/") {
        format!("{base_url}/{model}:generateContent")
    } else {
        format!("{base_url}/models/{model}:generateContent")
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

// =============================================================================
// REQUEST BUILDING
// =============================================================================

pub(crate) fn build_chat_request(
    max_tokens: u32,
    system: &str,
    history: &NormalizedHistory,
    message: &str,
) -> GenerateRequest {
    let mut contents: Vec<Content> = history
        .turns()
        .iter()
        .map(|turn| Content { role: Some(turn.role.as_str()), parts: vec![Part::Text { text: turn.text.clone() }] })
        .collect();
    contents.push(Content { role: Some("user"), parts: vec![Part::Text { text: message.to_string() }] });

    let system_instruction = (!system.trim().is_empty())
        .then(|| Content { role: None, parts: vec![Part::Text { text: system.to_string() }] });

    GenerateRequest { system_instruction, contents, generation_config: GenerationConfig { max_output_tokens: max_tokens } }
}

pub(crate) fn build_vision_request(max_tokens: u32, prompt: &str, image: &[u8], mime_type: &str) -> GenerateRequest {
    let parts = vec![
        Part::Text { text: prompt.to_string() },
        Part::Inline { inline_data: InlineData { mime_type: mime_type.to_string(), data: BASE64.encode(image) } },
    ];
    GenerateRequest {
        system_instruction: None,
        contents: vec![Content { role: Some("user"), parts }],
        generation_config: GenerationConfig { max_output_tokens: max_tokens },
    }
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_response(json: &str) -> Result<String, GatewayError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| GatewayError::ApiParse(e.to_string()))?;

    if api.candidates.is_empty() {
        if let Some(reason) = api.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GatewayError::ApiParse(format!("prompt blocked: {reason}")));
        }
        return Err(GatewayError::EmptyResponse);
    }

    let text: String = api
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| part.thought != Some(true))
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GatewayError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
