use nemgate_common::{NemgateError, Result, ServerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::dispatcher::RetryConfig;

/// Settings shared by every resource client.
///
/// All fields have defaults, so a JSON file only needs the keys it changes:
///
/// ```json
/// {
///   "nodes": [{"domain": "bigalice2.nem.ninja"}, {"protocol": "http", "domain": "192.3.61.243", "port": 7890}],
///   "retry": {"max_attempts": 5},
///   "request_timeout_ms": 10000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Nodes to rotate over; empty means the network's default node.
    pub nodes: Vec<ServerConfig>,
    pub retry: RetryConfig,
    /// Timeout of a single node request.
    ///
    /// Default: 30000ms
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            retry: RetryConfig::default(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(mut self, nodes: Vec<ServerConfig>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, a JSON error if it
    /// does not parse and [`NemgateError::Config`] if a value is unusable.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a comma-separated node list such as
    /// `http://127.0.0.1:7890,alice2.nem.ninja`.
    pub fn parse_node_list(list: &str) -> Result<Vec<ServerConfig>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ServerConfig::parse_url)
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(NemgateError::Config(
                "request_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(NemgateError::Config(format!(
                "retry.backoff_multiplier must be at least 1.0, got {}",
                self.retry.backoff_multiplier
            )));
        }
        if self.nodes.iter().any(|n| n.domain.is_empty()) {
            return Err(NemgateError::Config("node domain must not be empty".to_string()));
        }
        Ok(())
    }
}
