//! Reply parsers
//!
//! A parser pairs an optional transformation with options that also steer
//! decoding (raw bulk passthrough, thaw options) and error handling.
//!
//! ## Composition
//! `outer.compose(&inner)` runs `inner`'s function first and feeds its result
//! to `outer`'s. Options merge field by field with `outer` winning whenever
//! both set the same field.

use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, Result, VermilionError};
use crate::protocol::{DecodeOptions, Reply};
use crate::serializer::ThawOptions;

/// Transformation applied to a decoded reply
pub type ParseFn = Arc<dyn Fn(Reply) -> std::result::Result<Reply, BoxError> + Send + Sync>;

/// Options carried alongside a parser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserOptions {
    /// Return bulk payloads as bytes without marker handling
    pub raw_bulk: Option<bool>,

    /// Forwarded to the serializer when thawing payloads
    pub thaw_opts: Option<ThawOptions>,

    /// Precomputed reply for dummy requests
    pub dummy_reply: Option<Reply>,

    /// Also run the function on server error replies
    pub parse_errors: Option<bool>,
}

impl ParserOptions {
    /// Merge two option sets, `self` winning conflicts
    pub fn merge(&self, other: &ParserOptions) -> ParserOptions {
        ParserOptions {
            raw_bulk: self.raw_bulk.or(other.raw_bulk),
            thaw_opts: self.thaw_opts.or(other.thaw_opts),
            dummy_reply: self.dummy_reply.clone().or_else(|| other.dummy_reply.clone()),
            parse_errors: self.parse_errors.or(other.parse_errors),
        }
    }

    /// Options for the reply decoder
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            raw_bulk: self.raw_bulk.unwrap_or(false),
            thaw_opts: self.thaw_opts,
        }
    }
}

/// A composable reply transformation
#[derive(Clone, Default)]
pub struct Parser {
    func: Option<ParseFn>,
    opts: ParserOptions,
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("func", &self.func.as_ref().map(|_| "<fn>"))
            .field("opts", &self.opts)
            .finish()
    }
}

impl Parser {
    /// Create a parser from a transformation
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Reply) -> std::result::Result<Reply, BoxError> + Send + Sync + 'static,
    {
        Self {
            func: Some(Arc::new(f)),
            opts: ParserOptions::default(),
        }
    }

    /// Create a parser that only carries options
    pub fn from_options(opts: ParserOptions) -> Self {
        Self { func: None, opts }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.opts
    }

    pub fn has_function(&self) -> bool {
        self.func.is_some()
    }

    // =========================================================================
    // Option Builders
    // =========================================================================

    pub fn with_raw_bulk(mut self, raw: bool) -> Self {
        self.opts.raw_bulk = Some(raw);
        self
    }

    pub fn with_thaw_opts(mut self, opts: ThawOptions) -> Self {
        self.opts.thaw_opts = Some(opts);
        self
    }

    pub fn with_dummy_reply(mut self, reply: Reply) -> Self {
        self.opts.dummy_reply = Some(reply);
        self
    }

    pub fn with_parse_errors(mut self, parse: bool) -> Self {
        self.opts.parse_errors = Some(parse);
        self
    }

    // =========================================================================
    // Composition & Application
    // =========================================================================

    /// Compose with a parser established closer to the command
    pub fn compose(&self, inner: &Parser) -> Parser {
        let func: Option<ParseFn> = match (&self.func, &inner.func) {
            (Some(outer), Some(inner)) => {
                let (outer, inner) = (Arc::clone(outer), Arc::clone(inner));
                let chained: ParseFn = Arc::new(move |reply: Reply| outer(inner(reply)?));
                Some(chained)
            }
            (Some(f), None) | (None, Some(f)) => Some(Arc::clone(f)),
            (None, None) => None,
        };

        Parser {
            func,
            opts: self.opts.merge(&inner.opts),
        }
    }

    /// Apply the transformation to a decoded reply
    ///
    /// Error replies pass through untouched unless `parse_errors` is set,
    /// so outer layers still see them. A failing function becomes
    /// `VermilionError::Parse`.
    pub fn apply(&self, reply: Reply) -> Result<Reply> {
        let func = match &self.func {
            Some(func) => func,
            None => return Ok(reply),
        };

        if matches!(reply, Reply::Suppressed) {
            return Ok(reply);
        }
        if reply.is_error() && !self.opts.parse_errors.unwrap_or(false) {
            return Ok(reply);
        }

        func(reply).map_err(|source| VermilionError::Parse {
            message: source.to_string(),
            source,
        })
    }

    // =========================================================================
    // Common Parsers
    // =========================================================================

    /// Return bulk payloads as raw bytes
    pub fn raw() -> Self {
        Self::default().with_raw_bulk(true)
    }

    /// Thaw serialized payloads with the given options
    pub fn thaw_with(opts: ThawOptions) -> Self {
        Self::default().with_thaw_opts(opts)
    }

    /// Coerce numeric text to `Reply::Int`
    pub fn as_int() -> Self {
        Self::new(|reply| match reply {
            Reply::Int(n) => Ok(Reply::Int(n)),
            Reply::Status(s) | Reply::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Reply::Int)
                .map_err(|e| format!("not an integer: {:?} ({})", s, e).into()),
            Reply::Nil => Ok(Reply::Nil),
            other => Err(format!("cannot read {:?} as an integer", other).into()),
        })
    }

    /// Coerce numeric replies to `Reply::Float`
    pub fn as_float() -> Self {
        Self::new(|reply| match reply {
            Reply::Int(n) => Ok(Reply::Float(n as f64)),
            Reply::Float(f) => Ok(Reply::Float(f)),
            Reply::Status(s) | Reply::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Reply::Float)
                .map_err(|e| format!("not a float: {:?} ({})", s, e).into()),
            Reply::Nil => Ok(Reply::Nil),
            other => Err(format!("cannot read {:?} as a float", other).into()),
        })
    }

    /// Coerce 0/1 and true/false replies to `Reply::Bool`
    pub fn as_bool() -> Self {
        Self::new(|reply| match reply {
            Reply::Int(n) => Ok(Reply::Bool(n != 0)),
            Reply::Bool(b) => Ok(Reply::Bool(b)),
            Reply::Status(s) | Reply::Text(s) => match s.as_str() {
                "1" | "true" | "OK" => Ok(Reply::Bool(true)),
                "0" | "false" => Ok(Reply::Bool(false)),
                _ => Err(format!("not a boolean: {:?}", s).into()),
            },
            Reply::Nil => Ok(Reply::Nil),
            other => Err(format!("cannot read {:?} as a boolean", other).into()),
        })
    }
}
