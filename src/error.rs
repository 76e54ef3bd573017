//! Error types for Vermilion
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::protocol::{DecodeError, ServerError};

/// Result type alias using VermilionError
pub type Result<T> = std::result::Result<T, VermilionError>;

/// Boxed error returned by caller-supplied reply parsers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for Vermilion operations
#[derive(Debug, Error)]
pub enum VermilionError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Context error: {0}")]
    Context(String),

    // -------------------------------------------------------------------------
    // Reply Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error: {0}")]
    Server(ServerError),

    #[error("Decode error: {0}")]
    Decode(DecodeError),

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: BoxError,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VermilionError {
    /// The server error carried by this error, if it is one
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            VermilionError::Server(e) => Some(e),
            _ => None,
        }
    }
}
