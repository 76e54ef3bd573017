//! Argument encoding
//!
//! Converts typed command arguments into wire byte-strings.

use std::sync::OnceLock;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, VermilionError};
use crate::serializer::{Datum, Serializer};
use super::{BINARY_MARKER, MARKER_LEN, SERIALIZED_MARKER};

/// Largest integer served from the shared digit cache
pub const SMALL_INT_CACHE_MAX: i64 = 32767;

static SMALL_INTS: OnceLock<Vec<Bytes>> = OnceLock::new();

/// A command argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Plain text
    Text(String),

    /// Identifier-like text (command names, field names)
    Keyword(String),

    Int(i64),

    Float(f64),

    /// Opaque bytes, sent behind the binary marker
    Bytes(Bytes),

    /// Bytes sent exactly as given
    Raw(Bytes),

    /// Absent value, sent through the serializer
    Nil,

    /// Any other value, sent through the serializer
    Opaque(Datum),
}

/// Wrap bytes so they are sent without a marker
///
/// The caller is responsible for the payload not colliding with a marker.
pub fn raw(bytes: impl Into<Bytes>) -> Arg {
    Arg::Raw(bytes.into())
}

/// Build an identifier-like argument
pub fn keyword(name: impl Into<String>) -> Arg {
    Arg::Keyword(name.into())
}

impl Arg {
    /// Encode to the bytes that go inside one `$` bulk string
    pub fn encode(&self, serializer: &dyn Serializer) -> Result<Bytes> {
        match self {
            Arg::Text(s) | Arg::Keyword(s) => encode_text(s),
            Arg::Int(n) => Ok(encode_int(*n)),
            Arg::Float(f) => Ok(Bytes::from(f.to_string())),
            Arg::Raw(b) => Ok(b.clone()),
            Arg::Bytes(b) => Ok(with_marker(&BINARY_MARKER, b)),
            Arg::Nil => freeze(serializer, &Datum::Nil),
            Arg::Opaque(datum) => freeze(serializer, datum),
        }
    }
}

/// Encode a full argument list
pub fn encode_args<I>(args: I, serializer: &dyn Serializer) -> Result<Vec<Bytes>>
where
    I: IntoIterator,
    I::Item: Into<Arg>,
{
    args.into_iter()
        .map(|arg| arg.into().encode(serializer))
        .collect()
}

fn encode_text(s: &str) -> Result<Bytes> {
    if s.as_bytes().first() == Some(&0x00) {
        return Err(VermilionError::Encode(format!(
            "argument {:?} starts with reserved byte 0x00",
            s
        )));
    }
    Ok(Bytes::copy_from_slice(s.as_bytes()))
}

fn encode_int(n: i64) -> Bytes {
    if (0..=SMALL_INT_CACHE_MAX).contains(&n) {
        let cache = SMALL_INTS.get_or_init(|| {
            (0..=SMALL_INT_CACHE_MAX)
                .map(|i| Bytes::from(i.to_string()))
                .collect()
        });
        return cache[n as usize].clone();
    }
    Bytes::from(n.to_string())
}

fn freeze(serializer: &dyn Serializer, datum: &Datum) -> Result<Bytes> {
    let frozen = serializer.freeze(datum)?;
    Ok(with_marker(&SERIALIZED_MARKER, &frozen))
}

fn with_marker(marker: &[u8; MARKER_LEN], payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(MARKER_LEN + payload.len());
    buf.put_slice(marker);
    buf.put_slice(payload);
    buf.freeze()
}

// =============================================================================
// Conversions
// =============================================================================

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Text(s)
    }
}

impl From<&String> for Arg {
    fn from(s: &String) -> Self {
        Arg::Text(s.clone())
    }
}

macro_rules! int_arg {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(n: $t) -> Self {
                    Arg::Int(i64::from(n))
                }
            }
        )*
    };
}

int_arg!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int_arg {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(n: $t) -> Self {
                    match i64::try_from(n) {
                        Ok(n) => Arg::Int(n),
                        Err(_) => Arg::Text(n.to_string()),
                    }
                }
            }
        )*
    };
}

wide_int_arg!(u64, usize, isize);

impl From<f64> for Arg {
    fn from(f: f64) -> Self {
        Arg::Float(f)
    }
}

impl From<f32> for Arg {
    fn from(f: f32) -> Self {
        // Widening through the shortest f32 text keeps "0.1" as "0.1"
        Arg::Float(f.to_string().parse().unwrap_or(f as f64))
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Opaque(Datum::Bool(b))
    }
}

impl From<Bytes> for Arg {
    fn from(b: Bytes) -> Self {
        Arg::Bytes(b)
    }
}

impl From<Vec<u8>> for Arg {
    fn from(b: Vec<u8>) -> Self {
        Arg::Bytes(Bytes::from(b))
    }
}

impl From<&[u8]> for Arg {
    fn from(b: &[u8]) -> Self {
        Arg::Bytes(Bytes::copy_from_slice(b))
    }
}

impl<const N: usize> From<&[u8; N]> for Arg {
    fn from(b: &[u8; N]) -> Self {
        Arg::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Datum> for Arg {
    fn from(d: Datum) -> Self {
        Arg::Opaque(d)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Arg::Nil,
        }
    }
}
