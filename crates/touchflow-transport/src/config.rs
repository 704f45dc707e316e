//! Receiver configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use touchflow_core::DEFAULT_TUIO_PORT;

use crate::error::{Result, TransportError};

/// TUIO receiver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Local address to bind (without port)
    pub bind_addr: String,
    /// UDP listen port (0 picks an ephemeral port)
    pub port: u16,
    /// Upper bound on a single receive; also bounds shutdown latency
    pub recv_timeout_ms: u64,
    /// Socket errors logged before the receiver goes quiet
    pub max_logged_errors: u32,
    /// Receive buffer size
    pub max_packet_size: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_TUIO_PORT,
            recv_timeout_ms: 100,
            max_logged_errors: 20,
            max_packet_size: 65507, // Max UDP payload
        }
    }
}

impl ReceiverConfig {
    /// Default config listening on `port`
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Parse from TOML; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// `bind_addr:port`
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.recv_timeout_ms == 0 {
            return Err(TransportError::Config(
                "recv_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_packet_size == 0 {
            return Err(TransportError::Config(
                "max_packet_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
