//! Global configuration types for bonechat.
//!
//! `GlobalConfig` represents the top-level `config.toml`. Every section and
//! field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::chat::DEFAULT_MAX_TURNS;
use crate::error::ConfigError;
use crate::llm::{DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, GenerationConfig};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub llm: LlmSettings,
}

impl GlobalConfig {
    /// Reject values the rest of the system cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory.max_turns == 0 {
            return Err(ConfigError::Invalid(
                "memory.max_turns must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.api_key_env.is_empty() {
            return Err(ConfigError::Invalid(
                "llm.api_key_env must name at least one variable".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP server and session transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Name of the cookie carrying the session id.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Idle time after which a session is discarded.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cookie_name() -> String {
    "bonechat_session".to_string()
}

fn default_session_ttl_secs() -> u64 {
    // two weeks
    1_209_600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cookie_name: default_cookie_name(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

/// Conversational memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of user/model pairs kept per session.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
        }
    }
}

/// Generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_system_instruction")]
    pub system_instruction: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-request timeout. Unset means the call may take as long as the
    /// service takes.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Environment variables checked, in order, for the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Vec<String>,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_system_instruction() -> Option<String> {
    Some("You are a helpful assistant.".to_string())
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_api_key_env() -> Vec<String> {
    vec!["GOOGLE_API_KEY".to_string(), "GEMINI_API_KEY".to_string()]
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_instruction: default_system_instruction(),
            base_url: default_base_url(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl LlmSettings {
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.cookie_name, "bonechat_session");
        assert_eq!(config.memory.max_turns, 12);
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.max_output_tokens, 512);
        assert!(config.llm.request_timeout_secs.is_none());
        assert_eq!(config.llm.api_key_env, vec!["GOOGLE_API_KEY", "GEMINI_API_KEY"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_global_config_deserialize_empty() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.memory.max_turns, 12);
        assert_eq!(
            config.llm.system_instruction.as_deref(),
            Some("You are a helpful assistant.")
        );
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
[server]
port = 9090

[memory]
max_turns = 4

[llm]
model = "gemini-2.5-flash"
temperature = 0.2
request_timeout_secs = 30
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.memory.max_turns, 4);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.request_timeout_secs, Some(30));
        assert_eq!(config.llm.generation_config().max_output_tokens, 512);
    }

    #[test]
    fn test_validate_rejects_zero_turns() {
        let mut config = GlobalConfig::default();
        config.memory.max_turns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let mut config = GlobalConfig::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }
}
