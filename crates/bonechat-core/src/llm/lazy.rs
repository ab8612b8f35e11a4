//! LazyProvider -- a provider built on first use from injected configuration.
//!
//! The factory captures whatever the concrete provider needs (settings, a
//! credential resolver) at construction time. Nothing is read from global
//! state: `init()` builds the provider eagerly, `get_or_init()` builds it on
//! the first call that needs it, and both report a missing credential as an
//! error instead of panicking.

use tokio::sync::OnceCell;
use tracing::info;

use bonechat_types::llm::LlmError;

use super::box_provider::BoxLlmProvider;

type ProviderFactory = Box<dyn Fn() -> Result<BoxLlmProvider, LlmError> + Send + Sync>;

/// Provider handle with an explicit initialization lifecycle.
pub struct LazyProvider {
    factory: Option<ProviderFactory>,
    cell: OnceCell<BoxLlmProvider>,
}

impl LazyProvider {
    /// Create a handle that builds its provider with `factory` on first use.
    ///
    /// A failed build is not cached; the next call tries again.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<BoxLlmProvider, LlmError> + Send + Sync + 'static,
    {
        Self {
            factory: Some(Box::new(factory)),
            cell: OnceCell::new(),
        }
    }

    /// Create a handle around an already constructed provider.
    pub fn ready(provider: BoxLlmProvider) -> Self {
        Self {
            factory: None,
            cell: OnceCell::new_with(Some(provider)),
        }
    }

    /// Whether the provider has been built.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Build the provider now. Intended for startup so configuration errors
    /// surface before the first request.
    pub async fn init(&self) -> Result<&BoxLlmProvider, LlmError> {
        let provider = self.get_or_init().await?;
        info!(
            provider = provider.name(),
            model = provider.model(),
            "LLM provider initialized"
        );
        Ok(provider)
    }

    /// Return the provider, building it first if needed.
    pub async fn get_or_init(&self) -> Result<&BoxLlmProvider, LlmError> {
        self.cell
            .get_or_try_init(|| async {
                match &self.factory {
                    Some(factory) => factory(),
                    None => Err(LlmError::Provider {
                        message: "provider handle has no factory".to_string(),
                    }),
                }
            })
            .await
    }
}
