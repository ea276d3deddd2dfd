//! Error types for byte retrieval and payload decoding.

use thiserror::Error;

/// Result type alias using FetchError.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors reported by a [`ByteFetcher`](crate::ByteFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transport answered with a non-success status.
    #[error("request for {locator} failed with status {status}")]
    Status { locator: String, status: u16 },

    /// The resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Connection, timeout or body read failure.
    #[error("transport error for {locator}: {message}")]
    Transport { locator: String, message: String },

    /// The payload claimed to be gzip but could not be inflated.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// The fetcher could not be constructed.
    #[error("fetcher configuration error: {0}")]
    Config(String),
}

impl FetchError {
    /// Create a Transport error.
    pub fn transport(locator: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Transport {
            locator: locator.into(),
            message: message.to_string(),
        }
    }

    /// True for errors that say nothing exists at the locator.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Status { status: 404, .. })
    }
}
