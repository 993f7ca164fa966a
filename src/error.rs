//! Error types for the L2 delta service

use thiserror::Error;

/// Errors raised around the indicator core: feed input, IPC and configuration.
///
/// The indicators themselves never fail; malformed depth events are dropped.
#[derive(Error, Debug)]
pub enum L2DeltaError {
    #[error("Failed to parse feed record: {0}")]
    ParseError(String),

    #[error("Invalid feed record: {0}")]
    InvalidRecord(String),

    #[error("Feed I/O error: {0}")]
    FeedIo(String),

    #[error("IPC error: {0}")]
    IpcError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for L2DeltaError {
    fn from(err: serde_json::Error) -> Self {
        L2DeltaError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for L2DeltaError {
    fn from(err: std::io::Error) -> Self {
        L2DeltaError::FeedIo(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for L2DeltaError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        L2DeltaError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, L2DeltaError>;
