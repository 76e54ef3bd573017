//! Serializer Module
//!
//! The freeze/thaw collaborator used for argument values that have no
//! native wire form.
//!
//! ## Responsibilities
//! - Freeze a `Datum` into bytes (sent behind the serialized-payload marker)
//! - Thaw bytes back into a `Datum`, honoring caller-supplied options
//! - Expose a magic header so legacy binary-marked payloads can be sniffed
//!
//! Thaw failures are returned as `VermilionError::Serialization`; the reply
//! decoder turns them into `Reply::DecodeError` values.

mod datum;
mod binary;

pub use datum::Datum;
pub use binary::BincodeSerializer;

use crate::error::Result;

/// Options forwarded to `Serializer::thaw`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThawOptions {
    /// Maximum number of bytes the thaw may consume
    pub limit: Option<u64>,
}

impl ThawOptions {
    pub fn with_limit(limit: u64) -> Self {
        Self { limit: Some(limit) }
    }
}

/// Converts otherwise-unencodable values to and from bytes
pub trait Serializer: Send + Sync {
    /// Serialize a value, including this serializer's header
    fn freeze(&self, value: &Datum) -> Result<Vec<u8>>;

    /// Deserialize bytes produced by `freeze`
    fn thaw(&self, bytes: &[u8], opts: Option<&ThawOptions>) -> Result<Datum>;

    /// Magic bytes every frozen payload starts with
    fn header(&self) -> &[u8];

    /// Whether `bytes` looks like this serializer's output
    fn has_header(&self, bytes: &[u8]) -> bool {
        let header = self.header();
        !header.is_empty() && bytes.starts_with(header)
    }
}
