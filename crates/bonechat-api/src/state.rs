//! Application state wiring the orchestrator and session backend together.
//!
//! Used by both the terminal chat loop and the HTTP handlers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bonechat_core::chat::orchestrator::ChatOrchestrator;
use bonechat_core::chat::turn_store::TurnStore;
use bonechat_core::llm::lazy::LazyProvider;
use bonechat_infra::config::resolve_config;
use bonechat_infra::llm::lazy_provider;
use bonechat_infra::session::InMemorySessionBackend;
use bonechat_types::config::GlobalConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub sessions: Arc<InMemorySessionBackend>,
    pub config: Arc<GlobalConfig>,
}

impl AppState {
    /// Load configuration and wire services. The provider is not built yet.
    pub async fn init(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = resolve_config(config_path).await?;
        tracing::debug!(
            model = %config.llm.model,
            max_turns = config.memory.max_turns,
            "Configuration loaded"
        );
        let provider = lazy_provider(config.llm.clone());
        Ok(Self::with_provider(config, provider))
    }

    /// Wire services around an explicit provider handle.
    pub fn with_provider(config: GlobalConfig, provider: LazyProvider) -> Self {
        let orchestrator = ChatOrchestrator::new(
            Arc::new(provider),
            TurnStore::new(config.memory.max_turns),
        )
        .with_generation_config(config.llm.generation_config())
        .with_system_instruction(config.llm.system_instruction.clone());

        let sessions =
            InMemorySessionBackend::new(Duration::from_secs(config.server.session_ttl_secs));

        Self {
            orchestrator: Arc::new(orchestrator),
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        }
    }
}
