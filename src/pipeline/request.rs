//! Request definitions
//!
//! An encoded command waiting in a session queue.

use bytes::Bytes;

use crate::protocol::Reply;
use super::Parser;

/// Opaque routing metadata for the cluster layer
///
/// Carried with each request and never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutingHint(Bytes);

impl RoutingHint {
    pub fn new(hint: impl Into<Bytes>) -> Self {
        Self(hint.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A queued request
#[derive(Debug, Clone)]
pub struct Request {
    /// Encoded arguments; empty for dummy requests
    args: Vec<Bytes>,

    /// Parser applied to the reply
    parser: Option<Parser>,

    /// Routing metadata for the cluster layer
    routing: Option<RoutingHint>,
}

impl Request {
    /// Create a request from already-encoded arguments
    pub fn new(args: Vec<Bytes>, parser: Option<Parser>, routing: Option<RoutingHint>) -> Self {
        Self {
            args,
            parser,
            routing,
        }
    }

    /// A request that is never sent and "replies" with `reply`
    pub fn dummy(reply: Reply) -> Self {
        Self {
            args: Vec::new(),
            parser: Some(Parser::default().with_dummy_reply(reply)),
            routing: None,
        }
    }

    /// A dummy that runs `parser` over `reply` again when executed
    ///
    /// Used to put back a reply whose parser failed, so the failure surfaces
    /// in the scope that queued the request.
    pub fn replay(reply: Reply, parser: Parser) -> Self {
        Self {
            args: Vec::new(),
            parser: Some(parser.with_dummy_reply(reply)),
            routing: None,
        }
    }

    /// Encoded arguments
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    pub fn parser(&self) -> Option<&Parser> {
        self.parser.as_ref()
    }

    pub fn routing(&self) -> Option<&RoutingHint> {
        self.routing.as_ref()
    }

    /// Dummy requests have no arguments and are skipped on the wire
    pub fn is_dummy(&self) -> bool {
        self.args.is_empty()
    }

    /// The reply a dummy request stands for (nil when none was injected)
    pub fn dummy_reply(&self) -> Reply {
        self.parser
            .as_ref()
            .and_then(|p| p.options().dummy_reply.clone())
            .unwrap_or(Reply::Nil)
    }
}
