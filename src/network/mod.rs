//! Network Module
//!
//! The byte-stream pair a session talks through.
//!
//! ## Architecture
//! - Buffered reader and writer over one TCP socket (or any streams)
//! - Connection lifecycle, pooling and retries belong to the caller

mod connection;

pub use connection::Connection;
