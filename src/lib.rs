//! # Vermilion
//!
//! The request/reply protocol layer of a RESP-style key-value client:
//! - Typed argument encoding with binary/serialized payload markers
//! - Recursive, tag-dispatched reply decoding
//! - Per-session request queues sent as one flushed pipeline
//! - Nested immediate-reply capture that preserves an enclosing batch
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Command callers (external)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Arg → bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Context                               │
//! │      (pending queue, active parser, capture state)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ drain
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Executor   │◄─────────│ ReplyStash  │
//!   │ (pipeline)  │          │  (nested)   │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐   wire   ┌─────────────┐
//!   │   Framer    │─────────►│   Decoder   │──► Parser ──► caller
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod serializer;
pub mod protocol;
pub mod network;
pub mod pipeline;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BoxError, Result, VermilionError};
pub use config::Config;
pub use network::Connection;
pub use pipeline::{Context, Parser, ParserOptions, Replies, Request, RoutingHint};
pub use protocol::{Arg, Reply};
pub use serializer::{BincodeSerializer, Datum, Serializer, ThawOptions};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Vermilion
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
