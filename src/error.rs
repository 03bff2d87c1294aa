//! Error types for pickup-radar

use thiserror::Error;

/// Main error type for pickup-radar operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Gateway call timed out after {0} ms")]
    Timeout(u64),

    /// A debounced search was superseded by a newer one, or the client was disposed
    #[error("Search cancelled")]
    Cancelled,

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// True for the error a superseded search resolves with
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for pickup-radar operations
pub type Result<T> = std::result::Result<T, Error>;
