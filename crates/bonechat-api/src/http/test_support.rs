//! Providers and state builders for handler tests.

use bonechat_core::llm::box_provider::BoxLlmProvider;
use bonechat_core::llm::lazy::LazyProvider;
use bonechat_core::llm::provider::LlmProvider;
use bonechat_types::config::GlobalConfig;
use bonechat_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use crate::state::AppState;

/// Replies with the prompt prefixed by `echo: `.
pub(crate) struct EchoProvider;

impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            text: Some(format!("echo: {}", request.prompt)),
            model: "echo-1".to_string(),
            finish_reason: Some("STOP".to_string()),
            usage: Usage::default(),
        })
    }
}

pub(crate) fn echo_state() -> AppState {
    AppState::with_provider(
        GlobalConfig::default(),
        LazyProvider::ready(BoxLlmProvider::new(EchoProvider)),
    )
}

/// State whose provider can never be built, as when no API key is set.
pub(crate) fn unconfigured_state() -> AppState {
    AppState::with_provider(
        GlobalConfig::default(),
        LazyProvider::new(|| {
            Err(LlmError::MissingCredential {
                names: "GOOGLE_API_KEY/GEMINI_API_KEY".to_string(),
            })
        }),
    )
}
