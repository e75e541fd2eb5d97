//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARIGOLD_API_URL` - Base URL of the Marigold backend (e.g., <https://api.marigoldmarket.dev>)
//!
//! ## Optional
//! - `MARIGOLD_LOCALE` - Default locale when none is persisted (default: en-US)
//! - `MARIGOLD_CURRENCY` - Default currency when none is persisted (default: USD)
//! - `MARIGOLD_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `MARIGOLD_STATE_FILE` - Path of the durable client state file
//!   (default: `.marigold/state.json` under the user's home directory)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use marigold_core::CurrencyCode;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend REST API.
    pub api_url: Url,
    /// Locale used until the user picks one.
    pub default_locale: String,
    /// Currency used until the user picks one.
    pub default_currency: CurrencyCode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Path of the durable client state file.
    pub state_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_required_env("MARIGOLD_API_URL")?)?;
        let default_locale = get_env_or_default("MARIGOLD_LOCALE", "en-US");
        let default_currency = get_env_or_default("MARIGOLD_CURRENCY", "USD")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("MARIGOLD_CURRENCY".to_string(), e))?;
        let timeout_secs = get_env_or_default("MARIGOLD_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("MARIGOLD_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let state_file = get_optional_env("MARIGOLD_STATE_FILE")
            .map_or_else(default_state_file, PathBuf::from);

        Ok(Self {
            api_url,
            default_locale,
            default_currency,
            timeout: Duration::from_secs(timeout_secs),
            state_file,
        })
    }
}

/// Parse and sanity-check the backend base URL.
fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("MARIGOLD_API_URL".to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "MARIGOLD_API_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    Ok(url)
}

/// Default location of the durable state file.
fn default_state_file() -> PathBuf {
    std::env::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".marigold")
        .join("state.json")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
