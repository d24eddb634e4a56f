//! Error types for the Photos client.

use thiserror::Error;

/// Main error type for all Photos operations.
#[derive(Debug, Error)]
pub enum PhotosError {
    /// Token endpoint rejected the credentials or the grant.
    #[error("Bad credentials: {0}")]
    BadCredentials(String),

    /// The interactive consent step failed (denied, state mismatch, ...).
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// Client secrets file is missing required fields.
    #[error("Invalid client secrets: {0}")]
    InvalidClientSecrets(String),

    /// A date argument could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The API answered with a non-success status.
    #[error("HTTP {0}: {1}")]
    HttpStatus(u16, String),

    /// No data returned from API.
    #[error("No data from API: {0}")]
    NoDataApi(String),

    /// HTTP request failed.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic API error with message.
    #[error("API error: {0}")]
    ApiError(String),
}

/// Result type alias for Photos operations.
pub type Result<T> = std::result::Result<T, PhotosError>;
