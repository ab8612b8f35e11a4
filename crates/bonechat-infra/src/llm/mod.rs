//! LLM provider implementations.
//!
//! Contains the Gemini implementation of the [`LlmProvider`] trait defined
//! in `bonechat-core`, plus the factory functions that build it from the
//! `[llm]` configuration section and an environment credential.
//!
//! [`LlmProvider`]: bonechat_core::llm::provider::LlmProvider

pub mod gemini;

use secrecy::SecretString;

use bonechat_core::llm::box_provider::BoxLlmProvider;
use bonechat_core::llm::lazy::LazyProvider;
use bonechat_types::config::LlmSettings;
use bonechat_types::llm::LlmError;

use crate::secret::env::EnvSecretProvider;

use self::gemini::GeminiProvider;

/// Create a [`BoxLlmProvider`] from settings and a resolved API key.
///
/// # Errors
///
/// Returns [`LlmError::MissingCredential`] when `api_key` is `None`, naming
/// every environment variable that was consulted.
pub fn create_provider(
    settings: &LlmSettings,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or_else(|| LlmError::MissingCredential {
        names: settings.api_key_env.join("/"),
    })?;
    let provider = GeminiProvider::from_settings(settings, key)?;
    Ok(BoxLlmProvider::new(provider))
}

/// A [`LazyProvider`] that resolves the API key from the environment the
/// first time a provider is needed.
///
/// The variables in `settings.api_key_env` are tried in order. A failed
/// lookup is retried on the next call, so exporting the key later works
/// without a restart of long-lived processes that have not yet chatted.
pub fn lazy_provider(settings: LlmSettings) -> LazyProvider {
    LazyProvider::new(move || {
        let key = EnvSecretProvider::new()
            .first_of(settings.api_key_env.as_slice())
            .map(|(name, key)| {
                tracing::debug!(env = %name, "Resolved Gemini API key");
                key
            });
        create_provider(&settings, key)
    })
}
