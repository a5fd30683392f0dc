//! Error handling module for the image metadata collector

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    /// Bad or missing configuration, raised before the cluster is contacted
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workload enumeration failed
    #[error("Enumeration error: {0}")]
    Enumeration(String),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Payload still exceeds the upload limit after compression
    #[error("content size is too large ({size} bytes)")]
    ContentTooLarge { size: usize },

    #[error("invalid header format: {0}")]
    InvalidHeader(String),

    #[error("got a Status '{0}' instead of an '200 OK' response for API request")]
    UnexpectedStatus(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, CollectorError>;
