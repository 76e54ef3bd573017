//! Configuration for Vermilion
//!
//! Connection settings with sensible defaults.

use std::net::SocketAddr;

use crate::error::{Result, VermilionError};

/// Connection configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server address (host:port)
    pub server_addr: String,

    /// Socket read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm on the socket
    pub nodelay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:6379".to_string(),
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            nodelay: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve the configured server address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        use std::net::ToSocketAddrs;

        self.server_addr
            .to_socket_addrs()
            .map_err(|e| {
                VermilionError::Config(format!("invalid server address {:?}: {}", self.server_addr, e))
            })?
            .next()
            .ok_or_else(|| {
                VermilionError::Config(format!("server address {:?} did not resolve", self.server_addr))
            })
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server address
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
