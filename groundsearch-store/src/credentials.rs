//! API key lookup.
//!
//! The key only ever comes from the environment; it is never written to
//! the config file or shown by `config show`.

use tracing::debug;

use crate::error::ConfigError;

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Finds the API key using `lookup`. Blank values are ignored.
pub fn resolve_api_key<F>(lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for var in API_KEY_VARS {
        if let Some(key) = lookup(var).map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            debug!(source = var, "Using API key from environment");
            return Ok(key);
        }
    }
    Err(ConfigError::MissingCredential)
}

/// Finds the API key in the process environment.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    resolve_api_key(|var| std::env::var(var).ok())
}
