//! Bincode-backed serializer
//!
//! ## Format
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ "VMB" v1 (4) │   bincode(Datum) (varint)    │
//! └──────────────┴──────────────────────────────┘
//! ```

use bincode::Options;

use crate::error::{Result, VermilionError};
use super::{Datum, Serializer, ThawOptions};

/// Magic header: "VMB" + format version
pub const HEADER: &[u8] = b"VMB\x01";

/// Default `Serializer` built on bincode
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeSerializer;

impl BincodeSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for BincodeSerializer {
    fn freeze(&self, value: &Datum) -> Result<Vec<u8>> {
        let body = bincode::DefaultOptions::new()
            .serialize(value)
            .map_err(|e| VermilionError::Serialization(e.to_string()))?;

        let mut out = Vec::with_capacity(HEADER.len() + body.len());
        out.extend_from_slice(HEADER);
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn thaw(&self, bytes: &[u8], opts: Option<&ThawOptions>) -> Result<Datum> {
        let body = bytes.strip_prefix(HEADER).ok_or_else(|| {
            VermilionError::Serialization("missing serializer header".to_string())
        })?;

        // Slice input skips the size check, so limited thaws go through the reader path
        let options = bincode::DefaultOptions::new();
        let thawed = match opts.and_then(|o| o.limit) {
            Some(limit) => options.with_limit(limit).deserialize_from::<_, Datum>(body),
            None => options.deserialize::<Datum>(body),
        };

        thawed.map_err(|e| VermilionError::Serialization(e.to_string()))
    }

    fn header(&self) -> &[u8] {
        HEADER
    }
}
