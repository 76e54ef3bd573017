//! Reply Stash
//!
//! Immediate replies inside a session whose queue already holds requests.
//!
//! ## Protocol
//! ```text
//! queue: [A, B]          with_replies { queue C, D }
//!   1. stash [A, B]                    queue: []
//!   2. run body                        queue: [C, D]
//!   3. send [A, B, C, D], read 4 replies
//!   4. re-queue rA, rB as dummies      queue: [rA*, rB*]
//!   5. return [rC, rD]
//! ```
//!
//! Nested captures share one handle: an inner capture appends its own stash
//! to the enclosing one, executes everything, restores everything, and marks
//! the handle consumed so the enclosing capture only sends what is left in
//! the queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use super::executor::{self, Collected, Replies};
use super::{Context, Request};

/// Stash buffer and consumed flag shared by nested captures
#[derive(Debug, Clone)]
pub(crate) struct CaptureState {
    stash: Arc<Mutex<Vec<Request>>>,
    consumed: Arc<AtomicBool>,
}

impl CaptureState {
    fn new(stashed: Vec<Request>) -> Self {
        Self {
            stash: Arc::new(Mutex::new(stashed)),
            consumed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::Acquire)
    }

    fn mark_consumed(&self) {
        self.consumed.store(true, Ordering::Release);
    }
}

impl<'c> Context<'c> {
    /// Run `body` and return the replies to the requests it queued
    ///
    /// Requests queued before this call keep their place: they are sent
    /// together with the body's requests, and their replies are put back in
    /// the queue as dummy requests for the enclosing scope to collect. This
    /// happens even when `body` fails, so every sent request has its reply
    /// read before the error is returned.
    ///
    /// A stashed request whose parser fails is put back with its unparsed
    /// reply, so the failure is raised by the enclosing scope's execution
    /// rather than by this capture.
    pub fn with_replies<F>(&mut self, as_pipeline: bool, body: F) -> Result<Replies>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let stashed = self.drain();

        if stashed.is_empty() {
            let outcome = body(self);
            let fresh = self.drain();
            outcome?;
            let replies = self.execute(fresh, true, as_pipeline)?;
            return Ok(replies.unwrap_or(Replies::Pipeline(Vec::new())));
        }

        // Join the enclosing capture unless it has already been restored
        let (state, restore_len) = match &self.capture {
            Some(parent) if !parent.is_consumed() => {
                let mut shared = parent.stash.lock();
                shared.extend(stashed);
                (parent.clone(), shared.len())
            }
            _ => {
                let len = stashed.len();
                (CaptureState::new(stashed), len)
            }
        };
        tracing::trace!("Capturing replies with {} stashed requests", restore_len);

        let previous = self.capture.replace(state.clone());
        let outcome = body(self);
        self.capture = previous;

        let fresh = self.drain();
        let (batch, split_at) = if state.is_consumed() {
            // A nested capture already sent the stash and re-queued its replies
            (fresh, restore_len)
        } else {
            let mut batch = std::mem::take(&mut *state.stash.lock());
            let split_at = batch.len();
            batch.extend(fresh);
            (batch, split_at)
        };

        let executed = self.collect(&batch);
        state.mark_consumed();

        let Collected { mut replies, failures } = match executed {
            Ok(collected) => collected,
            Err(e) => {
                if let Err(body_err) = &outcome {
                    tracing::warn!("Capture body failed before batch error: {}", body_err);
                }
                return Err(e);
            }
        };

        let split_at = split_at.min(replies.len());
        let requested = replies.split_off(split_at);

        // Failures are in batch order, so stashed ones come first
        let mut failures = failures.into_iter().peekable();
        for (index, reply) in replies.into_iter().enumerate() {
            let failed = failures.next_if(|failure| failure.index == index);
            let restored = match (failed, batch.get(index).and_then(Request::parser)) {
                (Some(failure), Some(parser)) => Request::replay(failure.raw, parser.clone()),
                _ => Request::dummy(reply),
            };
            self.enqueue_request(restored);
        }

        outcome?;
        if let Some(failure) = failures.next() {
            return Err(failure.error);
        }
        executor::shape(requested, batch.len() - split_at, as_pipeline)
    }
}
