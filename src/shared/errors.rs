//! Error handling for the application

use thiserror::Error;

/// Yields API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}
