//! LlmProvider trait definition.
//!
//! This is the core abstraction that generation backends implement.
//! Uses RPITIT for `complete` so implementations can be plain `async fn`.

use bonechat_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends.
///
/// Implementations live in bonechat-infra (e.g., `GeminiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send a completion request and receive the full response.
    ///
    /// May block on network I/O for as long as the service takes; there is
    /// no implicit timeout at this layer.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
