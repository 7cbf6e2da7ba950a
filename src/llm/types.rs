//! LLM types — gateway errors and the provider-neutral completion trait.
//!
//! Every provider client speaks in terms of a system instruction, a
//! normalized history, and raw text out. Nothing here knows about
//! diagnoses; the services layer owns response interpretation.

use crate::error::ErrorCode;
use crate::services::history::NormalizedHistory;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by completion gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The provider answered but produced no text (blocked or empty candidate).
    #[error("API response contained no text")]
    EmptyResponse,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::EmptyResponse => "E_EMPTY_RESPONSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// COMPLETION GATEWAY TRAIT
// =============================================================================

/// Provider-neutral async trait for multimodal completions. Built once at
/// startup and shared by handlers; substitutable with a mock in tests.
///
/// Implementations do not retry. A failure is surfaced immediately so the
/// caller can decide.
#[async_trait::async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Continue a conversation: `history` followed by a new user `message`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on network, auth, quota, or parse failure.
    async fn complete_chat(
        &self,
        system_instruction: &str,
        history: &NormalizedHistory,
        message: &str,
    ) -> Result<String, GatewayError>;

    /// Single-turn prompt with one inline image.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on network, auth, quota, or parse failure.
    async fn complete_vision(&self, prompt_text: &str, image: &[u8], mime_type: &str) -> Result<String, GatewayError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
