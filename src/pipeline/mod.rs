//! Pipeline Module
//!
//! Per-session request queues and the machinery that sends them.
//!
//! ## Responsibilities
//! - Queue encoded requests until the session sends them
//! - Send a whole queue as one flushed batch and read replies in order
//! - Apply reply parsers, including scoped parser overrides
//! - Capture immediate replies inside a session without disturbing
//!   requests the enclosing scope has queued but not yet sent
//!
//! ## Return Contract
//! One request yields one value (`Replies::Single`); several requests, or a
//! forced pipeline, yield a positionally aligned list (`Replies::Pipeline`).

mod request;
mod parser;
mod context;
mod executor;
mod stash;

pub use request::{Request, RoutingHint};
pub use parser::{ParseFn, Parser, ParserOptions};
pub use context::Context;
pub use executor::{execute, shape, Replies};
