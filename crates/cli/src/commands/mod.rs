//! CLI command implementations.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod context;
pub mod order;
pub mod prefs;

use thiserror::Error;

/// Errors surfaced to the top-level command runner.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded from the environment.
    #[error("Configuration error: {0}")]
    Config(#[from] marigold_client::config::ConfigError),

    /// The durable state file could not be opened.
    #[error("Could not open the state file: {0}")]
    Storage(#[from] std::io::Error),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A backend request failed.
    #[error(transparent)]
    Api(#[from] marigold_client::api::ApiError),

    /// Invalid command arguments.
    #[error("{0}")]
    Invalid(String),
}
