//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the completion gateway built once at startup and the server
//! config. There is no per-request or cross-request mutable state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::llm::CompletionGateway;

/// Clone is required by Axum; the gateway is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn CompletionGateway>,
    pub config: ServerConfig,
}

impl AppState {
    #[must_use]
    pub fn new(gateway: Arc<dyn CompletionGateway>, config: ServerConfig) -> Self {
        Self { gateway, config }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use std::sync::Mutex;

    use crate::llm::GatewayError;
    use crate::services::history::{NormalizedHistory, Turn};

    /// What the mock saw on each call.
    #[derive(Debug, Clone)]
    pub enum RecordedCall {
        Chat { system: String, history: Vec<Turn>, message: String },
        Vision { prompt: String, image_len: usize, mime_type: String },
    }

    /// Canned-reply gateway. Replies are consumed in order; when exhausted
    /// every call returns `"done"`.
    pub struct MockGateway {
        replies: Mutex<Vec<Result<String, GatewayError>>>,
        pub calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockGateway {
        #[must_use]
        pub fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
            Self { replies: Mutex::new(replies), calls: Mutex::new(Vec::new()) }
        }

        #[must_use]
        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        #[must_use]
        pub fn failing(err: GatewayError) -> Self {
            Self::new(vec![Err(err)])
        }

        pub fn recorded(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        fn next_reply(&self) -> Result<String, GatewayError> {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() { Ok("done".into()) } else { replies.remove(0) }
        }
    }

    #[async_trait::async_trait]
    impl CompletionGateway for MockGateway {
        async fn complete_chat(
            &self,
            system_instruction: &str,
            history: &NormalizedHistory,
            message: &str,
        ) -> Result<String, GatewayError> {
            self.calls.lock().unwrap().push(RecordedCall::Chat {
                system: system_instruction.to_string(),
                history: history.turns().to_vec(),
                message: message.to_string(),
            });
            self.next_reply()
        }

        async fn complete_vision(
            &self,
            prompt_text: &str,
            image: &[u8],
            mime_type: &str,
        ) -> Result<String, GatewayError> {
            self.calls.lock().unwrap().push(RecordedCall::Vision {
                prompt: prompt_text.to_string(),
                image_len: image.len(),
                mime_type: mime_type.to_string(),
            });
            self.next_reply()
        }
    }

    /// Create a test `AppState` around the given mock.
    #[must_use]
    pub fn test_app_state(gateway: Arc<MockGateway>) -> AppState {
        AppState::new(gateway, ServerConfig::default())
    }
}
