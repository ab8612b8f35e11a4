//! Global configuration loader for bonechat.
//!
//! Reads `config.toml` from the data directory (`~/.bonechat/` by default)
//! and deserializes it into [`GlobalConfig`]. The implicit file is lenient:
//! missing or malformed means defaults. A file the user names explicitly
//! (`--config` or `$BONECHAT_CONFIG`) must exist and parse.

use std::path::{Path, PathBuf};

use bonechat_types::config::GlobalConfig;
use bonechat_types::error::ConfigError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "BONECHAT_DATA_DIR";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "BONECHAT_CONFIG";

/// Resolve the data directory.
///
/// `$BONECHAT_DATA_DIR` if set, else `~/.bonechat`, else `./.bonechat`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".bonechat");
    }

    PathBuf::from(".bonechat")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Load a configuration file that must exist and parse.
pub async fn load_config_file(path: &Path) -> Result<GlobalConfig, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    toml::from_str::<GlobalConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Resolve the effective configuration and validate it.
///
/// Priority:
/// 1. `explicit` (the `--config` flag)
/// 2. `$BONECHAT_CONFIG`
/// 3. `{data_dir}/config.toml`, lenient
pub async fn resolve_config(explicit: Option<&Path>) -> Result<GlobalConfig, ConfigError> {
    let from_env = std::env::var_os(CONFIG_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    let config = match explicit.map(Path::to_path_buf).or(from_env) {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(&path).await?
        }
        None => load_global_config(&resolve_data_dir()).await,
    };

    config.validate()?;
    Ok(config)
}
