//! Configuration from environment.

use thiserror::Error;

use crate::backend::DEFAULT_BASE_URL;

pub const API_KEY_VAR: &str = "ELEVENLABS_API_KEY";
pub const BASE_URL_VAR: &str = "ELEVENLABS_BASE_URL";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key is required. Set ELEVENLABS_API_KEY or pass --api-key")]
    MissingApiKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
}

impl Config {
    /// Load from the process environment. Call `dotenv().ok()` first to
    /// pick up a `.env` file.
    pub fn from_env(
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::resolve(api_key, base_url, |name| std::env::var(name).ok())
    }

    /// Resolve explicit overrides against a variable lookup.
    pub fn resolve<F>(
        api_key: Option<String>,
        base_url: Option<String>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = api_key
            .or_else(|| lookup(API_KEY_VAR))
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = base_url
            .or_else(|| lookup(BASE_URL_VAR))
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self { api_key, base_url })
    }
}
