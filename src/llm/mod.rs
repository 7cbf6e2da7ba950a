//! LLM — multi-provider completion gateway.
//!
//! DESIGN
//! ======
//! Configured once from environment variables at startup. The `LlmClient`
//! dispatches to Gemini, Anthropic, or `OpenAI` based on `LLM_PROVIDER` and
//! is handed to request handlers as an `Arc<dyn CompletionGateway>`.

pub mod anthropic;
pub mod config;
pub mod gemini;
pub mod openai;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
pub use types::{CompletionGateway, GatewayError};

use crate::services::history::NormalizedHistory;

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete gateway that dispatches to the configured provider.
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
    max_tokens: u32,
}

enum LlmProvider {
    Gemini(gemini::GeminiClient),
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build a client from environment variables. See [`LlmConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the HTTP client fails.
    pub fn from_env() -> Result<Self, GatewayError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build a client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, GatewayError> {
        let inner = match config.provider {
            LlmProviderKind::Gemini => {
                LlmProvider::Gemini(gemini::GeminiClient::new(config.api_key, config.base_url, config.timeouts)?)
            }
            LlmProviderKind::Anthropic => LlmProvider::Anthropic(anthropic::AnthropicClient::new(
                config.api_key,
                config.base_url,
                config.timeouts,
            )?),
            LlmProviderKind::OpenAi => {
                LlmProvider::OpenAi(openai::OpenAiClient::new(config.api_key, config.base_url, config.timeouts)?)
            }
        };
        Ok(Self { inner, model: config.model, max_tokens: config.max_tokens })
    }

    /// Return the configured model name (e.g. `"gemini-2.5-flash"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        match &self.inner {
            LlmProvider::Gemini(_) => "gemini",
            LlmProvider::Anthropic(_) => "anthropic",
            LlmProvider::OpenAi(_) => "openai",
        }
    }
}

#[async_trait::async_trait]
impl CompletionGateway for LlmClient {
    async fn complete_chat(
        &self,
        system_instruction: &str,
        history: &NormalizedHistory,
        message: &str,
    ) -> Result<String, GatewayError> {
        let (model, max_tokens) = (self.model.as_str(), self.max_tokens);
        match &self.inner {
            LlmProvider::Gemini(c) => {
                c.chat(model, max_tokens, system_instruction, history, message)
                    .await
            }
            LlmProvider::Anthropic(c) => {
                c.chat(model, max_tokens, system_instruction, history, message)
                    .await
            }
            LlmProvider::OpenAi(c) => {
                c.chat(model, max_tokens, system_instruction, history, message)
                    .await
            }
        }
    }

    async fn complete_vision(&self, prompt_text: &str, image: &[u8], mime_type: &str) -> Result<String, GatewayError> {
        let (model, max_tokens) = (self.model.as_str(), self.max_tokens);
        match &self.inner {
            LlmProvider::Gemini(c) => {
                c.vision(model, max_tokens, prompt_text, image, mime_type)
                    .await
            }
            LlmProvider::Anthropic(c) => {
                c.vision(model, max_tokens, prompt_text, image, mime_type)
                    .await
            }
            LlmProvider::OpenAi(c) => {
                c.vision(model, max_tokens, prompt_text, image, mime_type)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::config::LlmTimeouts;

    fn config(provider: LlmProviderKind) -> LlmConfig {
        LlmConfig {
            provider,
            api_key: "k".into(),
            model: provider.default_model().into(),
            base_url: provider.default_base_url().into(),
            max_tokens: 64,
            timeouts: LlmTimeouts { request_secs: 5, connect_secs: 1 },
        }
    }

    #[test]
    fn from_config_selects_provider() {
        let client = LlmClient::from_config(config(LlmProviderKind::Gemini)).unwrap();
        assert_eq!(client.provider_name(), "gemini");
        assert_eq!(client.model(), "gemini-2.5-flash");

        let client = LlmClient::from_config(config(LlmProviderKind::Anthropic)).unwrap();
        assert_eq!(client.provider_name(), "anthropic");

        let client = LlmClient::from_config(config(LlmProviderKind::OpenAi)).unwrap();
        assert_eq!(client.provider_name(), "openai");
        assert_eq!(client.model(), "gpt-4o");
    }
}
