//! Scripted provider for unit tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use bonechat_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use super::provider::LlmProvider;

#[derive(Clone)]
pub(crate) enum MockResult {
    Reply(Option<String>),
    RateLimited(String),
    Provider(String),
}

/// Provider returning a fixed result and recording every request it sees.
pub(crate) struct MockProvider {
    result: MockResult,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    pub(crate) fn replying(text: &str) -> Self {
        Self::with_result(MockResult::Reply(Some(text.to_string())))
    }

    pub(crate) fn with_result(result: MockResult) -> Self {
        Self {
            result,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the request log; stays valid after the provider is boxed.
    pub(crate) fn recorder(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let result = self.result.clone();
        async move {
            match result {
                MockResult::Reply(text) => Ok(CompletionResponse {
                    text,
                    model: "mock-model".to_string(),
                    finish_reason: Some("STOP".to_string()),
                    usage: Usage::default(),
                }),
                MockResult::RateLimited(msg) => Err(LlmError::RateLimited(msg)),
                MockResult::Provider(msg) => Err(LlmError::Provider { message: msg }),
            }
        }
    }
}
