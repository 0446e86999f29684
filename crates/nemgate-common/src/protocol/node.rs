use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NemgateError, Result};

/// Port NIS nodes listen on for plain HTTP.
pub const DEFAULT_NIS_PORT: u16 = 7890;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node entry as supplied by configuration; protocol and port may be left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub protocol: Option<Protocol>,
    pub domain: String,
    #[serde(default)]
    pub port: Option<u16>,
}

impl ServerConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            protocol: None,
            domain: domain.into(),
            port: None,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Parses `[http://|https://]host[:port][/]`.
    ///
    /// # Errors
    ///
    /// Returns [`NemgateError::Config`] for an unknown scheme, an empty host,
    /// a non-numeric port or a URL carrying a path.
    pub fn parse_url(url: &str) -> Result<Self> {
        let url = url.trim();
        let (protocol, rest) = match url.split_once("://") {
            Some(("http", rest)) => (Some(Protocol::Http), rest),
            Some(("https", rest)) => (Some(Protocol::Https), rest),
            Some((scheme, _)) => {
                return Err(NemgateError::Config(format!(
                    "unsupported scheme '{}' in node address '{}'",
                    scheme, url
                )))
            }
            None => (None, url),
        };

        let rest = rest.strip_suffix('/').unwrap_or(rest);
        if rest.contains('/') {
            return Err(NemgateError::Config(format!(
                "node address '{}' must not contain a path",
                url
            )));
        }

        let (domain, port) = match rest.rsplit_once(':') {
            Some((domain, port)) => {
                let port = port.parse::<u16>().map_err(|e| {
                    NemgateError::Config(format!("invalid port in node address '{}': {}", url, e))
                })?;
                (domain, Some(port))
            }
            None => (rest, None),
        };

        if domain.is_empty() {
            return Err(NemgateError::Config(format!(
                "node address '{}' has no host",
                url
            )));
        }

        Ok(Self {
            protocol,
            domain: domain.to_string(),
            port,
        })
    }
}

/// A fully specified node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
}

impl NodeDescriptor {
    pub fn new(protocol: Protocol, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol,
            host: host.into(),
            port,
        }
    }

    pub fn http(host: impl Into<String>, port: u16) -> Self {
        Self::new(Protocol::Http, host, port)
    }

    /// `protocol://host:port`, without trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl From<ServerConfig> for NodeDescriptor {
    fn from(config: ServerConfig) -> Self {
        Self {
            protocol: config.protocol.unwrap_or_default(),
            host: config.domain,
            port: config.port.unwrap_or(DEFAULT_NIS_PORT),
        }
    }
}

impl fmt::Display for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url())
    }
}
