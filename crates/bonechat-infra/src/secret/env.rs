//! Environment variable secret provider.
//!
//! Read-only: values come from the process environment and are wrapped in
//! [`SecretString`] as soon as they are read. Empty values count as unset.

use secrecy::SecretString;

/// Environment variable secret provider.
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }

    /// Read `key` from the environment.
    pub fn get(&self, key: &str) -> Option<SecretString> {
        match std::env::var(key) {
            Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val)),
            Ok(_) => None,
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                // Env var exists but has invalid Unicode -- treat as not found
                // rather than erroring, since secrets must be valid strings
                None
            }
        }
    }

    /// First of `keys` that is set, together with the name it was found under.
    pub fn first_of<K: AsRef<str>>(&self, keys: &[K]) -> Option<(String, SecretString)> {
        keys.iter()
            .find_map(|key| self.get(key.as_ref()).map(|val| (key.as_ref().to_string(), val)))
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}
