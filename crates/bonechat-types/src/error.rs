use std::path::PathBuf;

use thiserror::Error;

use crate::llm::LlmError;

/// Errors the chat orchestrator hands back to its caller.
///
/// Generation failures are never reported here; they become a fallback reply.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Configuration(LlmError),
}

/// Errors from loading an explicitly requested configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
