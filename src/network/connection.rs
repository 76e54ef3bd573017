//! Connection Handle
//!
//! A buffered read/write stream pair plus the serializer used for payloads.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::{Context, Replies, Request};
use crate::protocol::{read_reply, write_requests, Reply};
use crate::serializer::{BincodeSerializer, Serializer};

/// A connection to one server
///
/// At most one batch may be in flight: every reply to a sent batch must be
/// read before the next batch goes out. A `Context` borrows the connection
/// mutably, which enforces this.
pub struct Connection {
    /// Stream reader (buffered for efficiency)
    reader: BufReader<Box<dyn Read + Send>>,

    /// Stream writer (buffered so a batch leaves in one flush)
    writer: BufWriter<Box<dyn Write + Send>>,

    /// Serializer for opaque payloads
    serializer: Arc<dyn Serializer>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Connect to the server named in `config`
    pub fn connect(config: &Config) -> Result<Self> {
        let addr = config.socket_addr()?;
        let stream = TcpStream::connect(addr)?;

        if config.nodelay {
            stream.set_nodelay(true)?;
        }
        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to {}", addr);

        let mut conn = Self::from_streams(read_stream, write_stream);
        conn.peer_addr = addr.to_string();
        Ok(conn)
    }

    /// Wrap an arbitrary stream pair
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self {
            reader: BufReader::new(Box::new(reader)),
            writer: BufWriter::new(Box::new(writer)),
            serializer: Arc::new(BincodeSerializer::new()),
            peer_addr: "stream".to_string(),
        }
    }

    /// Replace the payload serializer
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn serializer(&self) -> &Arc<dyn Serializer> {
        &self.serializer
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    // =========================================================================
    // Wire I/O
    // =========================================================================

    /// Frame and flush a batch; dummy requests write nothing
    pub fn send(&mut self, requests: &[Request]) -> Result<()> {
        tracing::trace!("Sending {} requests to {}", requests.len(), self.peer_addr);
        write_requests(&mut self.writer, requests.iter().map(Request::args))
    }

    /// Read the reply for one sent (or dummy) request, before its parser runs
    pub fn read_raw_reply(&mut self, request: &Request) -> Result<Reply> {
        if request.is_dummy() {
            return Ok(request.dummy_reply());
        }

        let opts = request
            .parser()
            .map(|p| p.options().decode_options())
            .unwrap_or_default();
        read_reply(&mut self.reader, &opts, self.serializer.as_ref())
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Run a session: queue requests in `body`, then send them and read the
    /// replies
    ///
    /// Returns `None` when the body queued nothing.
    pub fn run<F>(&mut self, as_pipeline: bool, body: F) -> Result<Option<Replies>>
    where
        F: for<'c> FnOnce(&mut Context<'c>) -> Result<()>,
    {
        let mut ctx = Context::new(self);
        body(&mut ctx)?;
        ctx.drain_and_execute(true, as_pipeline)
    }

    /// Run a session and send its requests without reading replies
    pub fn run_no_replies<F>(&mut self, body: F) -> Result<()>
    where
        F: for<'c> FnOnce(&mut Context<'c>) -> Result<()>,
    {
        let mut ctx = Context::new(self);
        body(&mut ctx)?;
        ctx.drain_and_execute(false, false)?;
        Ok(())
    }
}
