//! Reply definitions
//!
//! Decoded reply values and the error values a reply can carry as data.

use std::fmt;

use bytes::Bytes;

use crate::error::{Result, VermilionError};
use crate::serializer::Datum;

/// A decoded (and possibly parsed) reply
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Nil bulk string or nil array
    Nil,

    /// `+` status line, e.g. "OK"
    Status(String),

    /// `:` integer
    Int(i64),

    /// Bulk string holding UTF-8 text
    Text(String),

    /// Bulk string holding opaque bytes (binary marker or raw passthrough)
    Bytes(Bytes),

    /// Bulk string holding serializer output
    Thawed(Datum),

    /// `*` array
    Array(Vec<Reply>),

    /// `-` error line
    Error(ServerError),

    /// A payload that could not be thawed
    DecodeError(DecodeError),

    /// Produced by parsers, never by the decoder
    Float(f64),

    /// Produced by parsers, never by the decoder
    Bool(bool),

    /// Sentinel dropped from pipeline results
    Suppressed,
}

impl Reply {
    /// True for server errors and decode failures
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_) | Reply::DecodeError(_))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    /// Text view of status and text replies
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::Status(s) | Reply::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Reply::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Raise error values, pass everything else through
    pub fn into_result(self) -> Result<Reply> {
        match self {
            Reply::Error(e) => Err(VermilionError::Server(e)),
            Reply::DecodeError(e) => Err(VermilionError::Decode(e)),
            other => Ok(other),
        }
    }
}

impl From<ServerError> for Reply {
    fn from(e: ServerError) -> Self {
        Reply::Error(e)
    }
}

// =============================================================================
// Error Values
// =============================================================================

/// An error reported by the server (`-` reply)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    /// The full error line, without the tag and CRLF
    pub message: String,

    /// Lowercased leading token, e.g. "wrongtype" or "moved"
    pub category: Option<String>,
}

impl ServerError {
    /// Build from an error line, extracting its category token
    pub fn parse(line: &str) -> Self {
        let category = line
            .split_whitespace()
            .next()
            .map(|token| token.to_ascii_lowercase());

        Self {
            message: line.to_string(),
            category,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ServerError {}

/// A payload that carried a serialized marker but failed to thaw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub message: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to thaw payload: {}", self.message)
    }
}

impl std::error::Error for DecodeError {}
