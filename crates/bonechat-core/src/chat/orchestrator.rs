//! Request/response turn orchestration with bounded memory.
//!
//! One call to [`ChatOrchestrator::handle_message`] moves through
//! READ_HISTORY -> CONVERTED -> CALLING_SERVICE -> SUCCESS | FAILURE ->
//! RECORDED. Both outcomes of the service call are recorded as a user/model
//! pair so the stored log always matches what the user saw, including error
//! replies.

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span};

use bonechat_types::chat::{Role, TurnLog};
use bonechat_types::error::ChatError;
use bonechat_types::llm::{CompletionRequest, ExternalTurn, GenerationConfig, LlmError};

use crate::chat::command::RESET_CONFIRMATION;
use crate::chat::history::to_external_format;
use crate::chat::turn_store::TurnStore;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::lazy::LazyProvider;
use crate::session::store::SessionStore;

/// Reply text substituted for a model response when generation fails.
pub fn fallback_reply(err: &LlmError) -> String {
    format!("⚠️ LLM error: {err}")
}

/// Runs one exchange with the generation service against a session's memory.
pub struct ChatOrchestrator {
    provider: Arc<LazyProvider>,
    turn_store: TurnStore,
    generation: GenerationConfig,
    system_instruction: Option<String>,
}

impl ChatOrchestrator {
    /// Create an orchestrator with default generation parameters
    /// (512 output tokens, temperature 0.6) and no system instruction.
    pub fn new(provider: Arc<LazyProvider>, turn_store: TurnStore) -> Self {
        Self {
            provider,
            turn_store,
            generation: GenerationConfig::default(),
            system_instruction: None,
        }
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        self.system_instruction = instruction;
        self
    }

    pub fn turn_store(&self) -> &TurnStore {
        &self.turn_store
    }

    pub fn provider(&self) -> &Arc<LazyProvider> {
        &self.provider
    }

    /// Send `prompt` with the session's history and record the exchange.
    ///
    /// `prompt` must be non-empty; callers reject empty input first.
    /// Returns the model's reply, or a fallback reply describing the failure.
    /// The only error is a provider that cannot be configured at all.
    pub async fn handle_message<S: SessionStore + ?Sized>(
        &self,
        session: &mut S,
        prompt: &str,
    ) -> Result<String, ChatError> {
        let provider = self
            .provider
            .get_or_init()
            .await
            .map_err(ChatError::Configuration)?;

        let turns = self.turn_store.get(session);
        let history = to_external_format(&turns);
        debug!(
            stored = turns.len(),
            sent = history.len(),
            "Assembled conversation history"
        );

        let reply = match self.generate(provider, history, prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!(
                    provider = provider.name(),
                    model = provider.model(),
                    error = ?e,
                    "LLM call failed: {e}"
                );
                fallback_reply(&e)
            }
        };

        self.turn_store.append(session, Role::User, prompt);
        self.turn_store.append(session, Role::Model, reply.clone());

        Ok(reply)
    }

    /// Clear the session's memory. Does not touch the provider.
    pub fn handle_reset<S: SessionStore + ?Sized>(&self, session: &mut S) -> &'static str {
        self.turn_store.reset(session);
        info!("Chat history reset");
        RESET_CONFIRMATION
    }

    /// Stored turns of the session, oldest first.
    pub fn history<S: SessionStore + ?Sized>(&self, session: &S) -> TurnLog {
        self.turn_store.get(session)
    }

    /// Call the provider; an absent reply text becomes the empty string.
    async fn generate(
        &self,
        provider: &BoxLlmProvider,
        history: Vec<ExternalTurn>,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest {
            history,
            prompt: prompt.to_string(),
            system_instruction: self.system_instruction.clone(),
            config: self.generation,
        };

        let span = info_span!(
            "gen_ai.chat",
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = provider.name(),
            gen_ai.request.model = provider.model(),
            gen_ai.request.max_tokens = request.config.max_output_tokens,
            gen_ai.request.temperature = request.config.temperature,
        );

        let response = provider.complete(&request).instrument(span).await?;
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            finish_reason = ?response.finish_reason,
            "LLM call completed"
        );
        Ok(response.text.unwrap_or_default())
    }
}
