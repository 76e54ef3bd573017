//! Pipeline Executor
//!
//! Sends a batch of requests and collects their replies.
//!
//! ## Steps
//! 1. Frame every request into one buffer and flush once
//! 2. Read one parsed reply per request, in order (dummies read nothing)
//! 3. Drop suppressed replies
//! 4. Shape: one request → the bare value, otherwise a list

use crate::error::{Result, VermilionError};
use crate::network::Connection;
use crate::protocol::Reply;
use super::Request;

/// Replies of one executed batch
#[derive(Debug, Clone, PartialEq)]
pub enum Replies {
    /// The reply to a lone, non-pipelined request
    Single(Reply),

    /// Replies aligned with the requests that produced them
    Pipeline(Vec<Reply>),
}

impl Replies {
    /// Flatten into a list
    pub fn into_vec(self) -> Vec<Reply> {
        match self {
            Replies::Single(reply) => vec![reply],
            Replies::Pipeline(replies) => replies,
        }
    }

    /// The single reply, if this is one
    pub fn single(self) -> Option<Reply> {
        match self {
            Replies::Single(reply) => Some(reply),
            Replies::Pipeline(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Replies::Single(_) => 1,
            Replies::Pipeline(replies) => replies.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Send `requests` and optionally read their replies
///
/// Returns `None` when there was nothing to send or no replies were wanted.
///
/// If a reply parser fails, every reply of the batch is still read and the
/// first `VermilionError::Parse` is returned; the other replies of that
/// batch are discarded.
pub fn execute(
    conn: &mut Connection,
    requests: Vec<Request>,
    want_replies: bool,
    force_pipeline: bool,
) -> Result<Option<Replies>> {
    if requests.is_empty() {
        return Ok(None);
    }

    if !want_replies {
        conn.send(&requests)?;
        tracing::debug!("Sent {} requests without reading replies", requests.len());
        return Ok(None);
    }

    let replies = roundtrip(conn, &requests)?;
    shape(replies, requests.len(), force_pipeline).map(Some)
}

/// Send a batch and read one parsed reply per request
///
/// Every reply is read even if a parser fails, so the stream stays aligned;
/// the first parse failure is returned afterwards.
pub(crate) fn roundtrip(conn: &mut Connection, requests: &[Request]) -> Result<Vec<Reply>> {
    let collected = collect(conn, requests)?;
    match collected.failures.into_iter().next() {
        Some(failure) => Err(failure.error),
        None => Ok(collected.replies),
    }
}

/// A reply whose parser failed
pub(crate) struct ParseFailure {
    /// Position of the request in the batch
    pub index: usize,

    /// The reply as decoded, before the parser ran
    pub raw: Reply,

    pub error: VermilionError,
}

/// Replies of a batch, with parse failures kept aside
pub(crate) struct Collected {
    /// One reply per request; `Reply::Nil` where the parser failed
    pub replies: Vec<Reply>,

    /// Failures in batch order
    pub failures: Vec<ParseFailure>,
}

/// Send a batch and read every reply without raising parse failures
pub(crate) fn collect(conn: &mut Connection, requests: &[Request]) -> Result<Collected> {
    conn.send(requests)?;

    let mut replies = Vec::with_capacity(requests.len());
    let mut failures = Vec::new();

    for (index, request) in requests.iter().enumerate() {
        let raw = conn.read_raw_reply(request)?;

        let parser = match request.parser() {
            Some(parser) if parser.has_function() => parser,
            _ => {
                replies.push(raw);
                continue;
            }
        };

        match parser.apply(raw.clone()) {
            Ok(reply) => replies.push(reply),
            Err(error) => {
                tracing::debug!("Reply parser failed at index {}: {}", index, error);
                failures.push(ParseFailure { index, raw, error });
                replies.push(Reply::Nil);
            }
        }
    }

    tracing::debug!("Executed batch of {} requests on {}", requests.len(), conn.peer_addr());
    Ok(Collected { replies, failures })
}

/// Apply the single/list return contract
///
/// A lone reply that is a server error or decode failure is raised instead
/// of returned; inside a list the same value stays at its position.
pub fn shape(replies: Vec<Reply>, request_count: usize, force_pipeline: bool) -> Result<Replies> {
    let mut kept: Vec<Reply> = replies
        .into_iter()
        .filter(|reply| !matches!(reply, Reply::Suppressed))
        .collect();

    if request_count == 1 && !force_pipeline && kept.len() == 1 {
        if let Some(reply) = kept.pop() {
            return reply.into_result().map(Replies::Single);
        }
    }

    Ok(Replies::Pipeline(kept))
}
