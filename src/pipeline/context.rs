//! Session Context
//!
//! Per-session state threaded through every command-issuing call.
//!
//! ## State
//! - The connection (absent for a detached context)
//! - The queue of requests not yet sent
//! - The active parser applied to newly queued requests
//! - The active capture handle while inside `with_replies`
//!
//! The queue is only touched through `&mut self`, so enqueue and drain can
//! never interleave.

use std::sync::Arc;

use crate::error::{Result, VermilionError};
use crate::network::Connection;
use crate::protocol::{encode_args, Arg, Reply};
use crate::serializer::Serializer;

use super::executor::{self, Collected, Replies};
use super::stash::CaptureState;
use super::{Parser, Request, RoutingHint};

/// Ambient state of one session
pub struct Context<'c> {
    /// Connection the queue is sent on
    conn: Option<&'c mut Connection>,

    /// Serializer used to encode opaque arguments
    serializer: Arc<dyn Serializer>,

    /// Requests queued but not yet sent
    queue: Vec<Request>,

    /// Parser attached to newly queued requests
    parser: Option<Parser>,

    /// Capture in progress, if any
    pub(super) capture: Option<CaptureState>,
}

impl<'c> Context<'c> {
    /// Begin a session on a connection
    pub fn new(conn: &'c mut Connection) -> Self {
        let serializer = Arc::clone(conn.serializer());
        Self {
            conn: Some(conn),
            serializer,
            queue: Vec::new(),
            parser: None,
            capture: None,
        }
    }

    /// A context without a connection
    ///
    /// Useful for collecting requests that a routing layer sends elsewhere.
    /// Anything that needs the wire fails with `VermilionError::Context`.
    pub fn detached(serializer: Arc<dyn Serializer>) -> Context<'static> {
        Context {
            conn: None,
            serializer,
            queue: Vec::new(),
            parser: None,
            capture: None,
        }
    }

    pub fn serializer(&self) -> &dyn Serializer {
        self.serializer.as_ref()
    }

    pub fn is_detached(&self) -> bool {
        self.conn.is_none()
    }

    // =========================================================================
    // Queue
    // =========================================================================

    /// Queue a command with the active parser
    pub fn enqueue<I>(&mut self, args: I, routing: Option<RoutingHint>) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let args = encode_args(args, self.serializer.as_ref())?;
        self.queue.push(Request::new(args, self.parser.clone(), routing));
        Ok(())
    }

    /// Queue a command with its own parser, composed under the active one
    pub fn enqueue_with<I>(
        &mut self,
        args: I,
        parser: Parser,
        routing: Option<RoutingHint>,
    ) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let args = encode_args(args, self.serializer.as_ref())?;
        let parser = match &self.parser {
            Some(active) => active.compose(&parser),
            None => parser,
        };
        self.queue.push(Request::new(args, Some(parser), routing));
        Ok(())
    }

    /// Queue a pre-built request as is
    pub fn enqueue_request(&mut self, request: Request) {
        self.queue.push(request);
    }

    /// Make `reply` the next reply of this session without touching the wire
    ///
    /// The active parser still applies to the injected value.
    pub fn return_value(&mut self, reply: Reply) {
        let parser = self.parser.clone().unwrap_or_default().with_dummy_reply(reply);
        self.queue.push(Request::new(Vec::new(), Some(parser), None));
    }

    /// Number of queued requests
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Take every queued request, leaving the queue empty
    pub fn drain(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.queue)
    }

    // =========================================================================
    // Scoped Parsers
    // =========================================================================

    pub fn active_parser(&self) -> Option<&Parser> {
        self.parser.as_ref()
    }

    /// Run `body` with `parser` replacing the active parser
    ///
    /// `None` clears it. The previous parser is restored even if `body` fails.
    pub fn with_parser<T, F>(&mut self, parser: Option<Parser>, body: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let previous = std::mem::replace(&mut self.parser, parser);
        let result = body(self);
        self.parser = previous;
        result
    }

    /// Run `body` with `parser` composed under the active parser
    pub fn with_parser_composed<T, F>(&mut self, parser: Parser, body: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let composed = match &self.parser {
            Some(active) => active.compose(&parser),
            None => parser,
        };
        self.with_parser(Some(composed), body)
    }

    /// Run `body` with no active parser
    pub fn without_parser<T, F>(&mut self, body: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.with_parser(None, body)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    fn connection(&mut self) -> Result<&mut Connection> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| VermilionError::Context("no connection established for this context".to_string()))
    }

    /// Send `requests` on this context's connection
    pub fn execute(
        &mut self,
        requests: Vec<Request>,
        want_replies: bool,
        force_pipeline: bool,
    ) -> Result<Option<Replies>> {
        if requests.is_empty() {
            return Ok(None);
        }
        let conn = self.connection()?;
        executor::execute(conn, requests, want_replies, force_pipeline)
    }

    /// Drain the queue and send it
    pub fn drain_and_execute(
        &mut self,
        want_replies: bool,
        force_pipeline: bool,
    ) -> Result<Option<Replies>> {
        let requests = self.drain();
        self.execute(requests, want_replies, force_pipeline)
    }

    /// Send a batch and read every reply, unshaped, with parse failures
    /// kept aside
    pub(super) fn collect(&mut self, requests: &[Request]) -> Result<Collected> {
        let conn = self.connection()?;
        executor::collect(conn, requests)
    }
}
