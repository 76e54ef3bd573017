//! Protocol codec
//!
//! Request framing and reply decoding.
//!
//! ## Request Framing
//! ```text
//! *2\r\n$3\r\nGET\r\n$1\r\nk\r\n
//! └┬┘   └┬┘   └┬┘   └┬┘
//!  argc  len  payload ...
//! ```
//!
//! A batch of requests is assembled in one buffer and flushed once, so N
//! pipelined requests cost a single write.

use std::io::{BufRead, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, VermilionError};
use crate::serializer::{Serializer, ThawOptions};
use super::{DecodeError, Reply, ServerError, BINARY_MARKER, MARKER_LEN, SERIALIZED_MARKER};

/// Maximum bulk payload size accepted from the server (512 MB)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Upper bound on array pre-allocation; longer arrays grow as they are read
const ARRAY_PREALLOC_LIMIT: usize = 1024;

const CRLF: &[u8] = b"\r\n";

/// Options that change how bulk payloads are interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Return bulk payloads as bytes, without marker handling
    pub raw_bulk: bool,

    /// Forwarded to the serializer for marked payloads
    pub thaw_opts: Option<ThawOptions>,
}

// =============================================================================
// Request Framing
// =============================================================================

/// Frame a batch of requests into one buffer
///
/// Empty argument lists are dummy requests and produce no bytes.
pub fn encode_requests<'a, I>(requests: I) -> BytesMut
where
    I: IntoIterator<Item = &'a [Bytes]>,
{
    let mut buf = BytesMut::new();

    for args in requests {
        if args.is_empty() {
            continue;
        }

        put_header(&mut buf, b'*', args.len());
        for arg in args {
            put_header(&mut buf, b'$', arg.len());
            buf.put_slice(arg);
            buf.put_slice(CRLF);
        }
    }

    buf
}

/// Write a batch of requests and flush once
pub fn write_requests<'a, W, I>(writer: &mut W, requests: I) -> Result<()>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a [Bytes]>,
{
    let buf = encode_requests(requests);
    if !buf.is_empty() {
        writer.write_all(&buf)?;
    }
    writer.flush()?;
    Ok(())
}

fn put_header(buf: &mut BytesMut, tag: u8, n: usize) {
    let digits = n.to_string();
    buf.reserve(1 + digits.len() + CRLF.len());
    buf.put_u8(tag);
    buf.put_slice(digits.as_bytes());
    buf.put_slice(CRLF);
}

// =============================================================================
// Reply Decoding
// =============================================================================

/// Read exactly one reply from a stream
///
/// Blocks until the complete reply (including nested array elements) has
/// been read. Error replies and thaw failures come back as values; only an
/// unknown tag, a malformed header or an I/O failure is an `Err`, and any of
/// those leaves the stream unusable.
pub fn read_reply<R>(
    reader: &mut R,
    opts: &DecodeOptions,
    serializer: &dyn Serializer,
) -> Result<Reply>
where
    R: BufRead + ?Sized,
{
    let mut tag = [0u8; 1];
    reader.read_exact(&mut tag)?;

    match tag[0] {
        b'+' => Ok(Reply::Status(read_line(reader)?)),
        b'-' => Ok(Reply::Error(ServerError::parse(&read_line(reader)?))),
        b':' => {
            let line = read_line(reader)?;
            line.parse::<i64>()
                .map(Reply::Int)
                .map_err(|_| VermilionError::Protocol(format!("invalid integer reply: {:?}", line)))
        }
        b'$' => {
            let len = match read_length(reader)? {
                Some(len) => len,
                None => return Ok(Reply::Nil),
            };
            if len > MAX_BULK_LEN {
                return Err(VermilionError::Protocol(format!(
                    "Bulk payload too large: {} bytes (max {})",
                    len, MAX_BULK_LEN
                )));
            }

            let mut payload = vec![0u8; len];
            reader.read_exact(&mut payload)?;

            let mut trailer = [0u8; 2];
            reader.read_exact(&mut trailer)?;
            if &trailer[..] != CRLF {
                return Err(VermilionError::Protocol(
                    "bulk payload not terminated by CRLF".to_string(),
                ));
            }

            Ok(interpret_bulk(payload, opts, serializer))
        }
        b'*' => {
            let count = match read_length(reader)? {
                Some(count) => count,
                None => return Ok(Reply::Nil),
            };

            let mut items = Vec::with_capacity(count.min(ARRAY_PREALLOC_LIMIT));
            for _ in 0..count {
                items.push(read_reply(reader, opts, serializer)?);
            }
            Ok(Reply::Array(items))
        }
        other => {
            tracing::warn!("Unknown reply type byte 0x{:02x}", other);
            Err(VermilionError::Protocol(format!(
                "Unknown reply type: 0x{:02x}",
                other
            )))
        }
    }
}

/// Read a CRLF-terminated line, without the terminator
fn read_line<R: BufRead + ?Sized>(reader: &mut R) -> Result<String> {
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line)?;

    if n == 0 {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    if !line.ends_with(CRLF) {
        return Err(VermilionError::Protocol(
            "reply line not terminated by CRLF".to_string(),
        ));
    }

    line.truncate(line.len() - CRLF.len());
    Ok(String::from_utf8_lossy(&line).into_owned())
}

/// Read a bulk length or array count; `-1` means nil
fn read_length<R: BufRead + ?Sized>(reader: &mut R) -> Result<Option<usize>> {
    let line = read_line(reader)?;
    let n = line
        .parse::<i64>()
        .map_err(|_| VermilionError::Protocol(format!("invalid length: {:?}", line)))?;

    match n {
        -1 => Ok(None),
        n if n < 0 => Err(VermilionError::Protocol(format!("invalid length: {}", n))),
        n => usize::try_from(n)
            .map(Some)
            .map_err(|_| VermilionError::Protocol(format!("length out of range: {}", n))),
    }
}

/// Turn a bulk payload into a reply according to its marker
fn interpret_bulk(payload: Vec<u8>, opts: &DecodeOptions, serializer: &dyn Serializer) -> Reply {
    if opts.raw_bulk {
        return Reply::Bytes(Bytes::from(payload));
    }

    let marker = payload.get(..MARKER_LEN);
    if marker == Some(&BINARY_MARKER[..]) {
        let body = Bytes::from(payload).slice(MARKER_LEN..);

        // Some older writers put serializer output behind the binary marker
        if serializer.has_header(&body) {
            match serializer.thaw(&body, opts.thaw_opts.as_ref()) {
                Ok(datum) => return Reply::Thawed(datum),
                Err(e) => tracing::trace!("Binary payload kept as bytes: {}", e),
            }
        }
        return Reply::Bytes(body);
    }

    if marker == Some(&SERIALIZED_MARKER[..]) {
        return match serializer.thaw(&payload[MARKER_LEN..], opts.thaw_opts.as_ref()) {
            Ok(datum) => Reply::Thawed(datum),
            Err(VermilionError::Serialization(message)) => Reply::DecodeError(DecodeError { message }),
            Err(e) => Reply::DecodeError(DecodeError {
                message: e.to_string(),
            }),
        };
    }

    match String::from_utf8(payload) {
        Ok(text) => Reply::Text(text),
        Err(e) => Reply::Bytes(Bytes::from(e.into_bytes())),
    }
}
