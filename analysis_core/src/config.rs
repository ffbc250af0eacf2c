//! # Client Configuration
//!
//! Where the analysis service lives and how long to wait for it. Nothing is
//! read from disk; front-ends start from [`ClientConfig::default`] and apply
//! overrides (the CLI maps its flags onto the `with_*` methods).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{AssistError, AssistResult};

/// Endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "https://backend-1-9xla.onrender.com/analyze";

/// Seconds to wait for the service before giving up.
///
/// The hosted service sleeps when idle and can take a while to wake.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Current application version (from Cargo.toml)
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings shared by every transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full URL of the analyze endpoint
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("CodeAssistX/{}", CURRENT_VERSION),
        }
    }
}

impl ClientConfig {
    /// Replace the endpoint URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Replace the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that the endpoint is an http(s) URL and the timeout is usable.
    pub fn validate(&self) -> AssistResult<()> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| AssistError::invalid_config("endpoint", format!("'{}': {}", self.endpoint, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AssistError::invalid_config(
                "endpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(AssistError::invalid_config("timeout_secs", "must be greater than zero"));
        }

        Ok(())
    }
}
