//! Error types for tweet fetching.

use thiserror::Error;

/// Errors raised while fetching or projecting tweets.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading an input or credentials file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// OAuth signature generation failed
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Twitter API returned an error response
    #[error("Twitter API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        retry_after: Option<u64>,
    },

    /// Rate limited (HTTP 429)
    #[error("rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// A requested tweet id was not a decimal number
    #[error("invalid tweet id {raw:?}: expected a decimal number")]
    InvalidId { raw: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
