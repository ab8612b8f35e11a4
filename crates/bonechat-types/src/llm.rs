//! LLM request/response types for bonechat.
//!
//! These model the data shapes exchanged with the generation service:
//! the external turn format, completion requests and responses, and the
//! error taxonomy of provider calls.

use serde::{Deserialize, Serialize};

/// Default output budget for a reply.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 512;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.6;

/// One text segment of an [`ExternalTurn`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

/// A turn in the shape the generation service expects:
/// `{"role": "user", "parts": [{"text": "..."}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalTurn {
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl ExternalTurn {
    /// A single-part turn.
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Request to a provider: prior history plus the new prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub history: Vec<ExternalTurn>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    pub config: GenerationConfig,
}

/// Response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text; `None` when the service produced no text at all.
    pub text: Option<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

/// Token usage for a completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from LLM provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("missing {names} in environment")]
    MissingCredential { names: String },

    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("response blocked: {0}")]
    Blocked(String),
}

impl LlmError {
    /// Whether this error means the provider could not be configured at all,
    /// as opposed to a failed call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::MissingCredential { .. })
    }
}
