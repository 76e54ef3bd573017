//! Protocol Module
//!
//! Defines the RESP-style wire protocol spoken with the server.
//!
//! ## Request Format
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<payload>\r\n      (once per argument)
//! ```
//!
//! ## Reply Tags
//! - `+` status line
//! - `-` error line
//! - `:` integer line
//! - `$` bulk string: length line + payload + CRLF (`-1` = nil)
//! - `*` array: count line + nested replies (`-1` = nil)
//!
//! ## Payload Markers
//! Bulk payloads may start with a two-byte marker naming their content:
//! - `0x00 '<'`: opaque binary bytes
//! - `0x00 '>'`: serializer output

mod arg;
mod reply;
mod codec;

pub use arg::{encode_args, keyword, raw, Arg, SMALL_INT_CACHE_MAX};
pub use reply::{DecodeError, Reply, ServerError};
pub use codec::{
    encode_requests, read_reply, write_requests, DecodeOptions, MAX_BULK_LEN,
};

/// Length of a payload marker
pub const MARKER_LEN: usize = 2;

/// Prefix for opaque binary payloads
pub const BINARY_MARKER: [u8; MARKER_LEN] = [0x00, b'<'];

/// Prefix for serialized payloads
pub const SERIALIZED_MARKER: [u8; MARKER_LEN] = [0x00, b'>'];
