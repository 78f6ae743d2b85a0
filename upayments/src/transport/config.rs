//! HTTP transport configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, UpaymentsError};

/// HTTP transport configuration.
///
/// ```toml
/// [http]
/// timeout_secs = 30
/// connect_timeout_secs = 10
/// pool_max_idle_per_host = 10
/// http_version = "auto"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Maximum idle connections per host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// HTTP version preference.
    #[serde(default)]
    pub http_version: HttpVersion,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: default_pool_max_idle(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            http_version: HttpVersion::default(),
        }
    }
}

impl HttpConfig {
    /// Validates configuration values are within acceptable bounds.
    ///
    /// # Errors
    ///
    /// Returns error if timeout values are outside valid ranges:
    /// - `timeout_secs`: must be 1-300 seconds
    /// - `connect_timeout_secs`: must be 1-60 seconds
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(UpaymentsError::Config("timeout_secs must be between 1 and 300".to_owned()));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(UpaymentsError::Config(
                "connect_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns connect timeout as Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// HTTP version preference.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HttpVersion {
    /// HTTP/1.1 only.
    Http1,
    /// HTTP/2 only (prior knowledge).
    Http2,
    /// Auto-negotiate (prefer HTTP/2, fall back to HTTP/1.1).
    #[default]
    Auto,
}

fn default_pool_max_idle() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}
