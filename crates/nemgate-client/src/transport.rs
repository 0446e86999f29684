//! HTTP transport to a single node.
//!
//! One GET per call, JSON response bodies, a timeout on the whole exchange.
//! Every failure (connect, timeout, non-2xx status, unreadable or malformed
//! body) comes back as an error for the dispatcher to act on; nothing is
//! retried here.

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{header, Method, Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use nemgate_common::{NemgateError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Plain-HTTP JSON client.
///
/// Connections are pooled by hyper and shared between clones. `https` node
/// URLs are refused by the connector and surface as transport errors.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client<HttpConnector, Empty<Bytes>>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GETs `url` and decodes the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GETs `url` and returns the raw body of a 2xx response.
    pub async fn get(&self, url: &str) -> Result<Bytes> {
        let uri: Uri = url
            .parse()
            .map_err(|e| NemgateError::InvalidRequest(format!("invalid URL {}: {}", url, e)))?;

        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| NemgateError::InvalidRequest(format!("failed to build request: {}", e)))?;

        debug!(url, "GET");

        let exchange = async {
            let response = match self.client.request(request).await {
                Ok(response) => response,
                Err(e) => {
                    return Err(NemgateError::Transport(format!(
                        "HTTP request to {} failed: {}",
                        url, e
                    )))
                }
            };

            let status = response.status();
            if !status.is_success() {
                return Err(NemgateError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            response
                .into_body()
                .collect()
                .await
                .map_err(|e| NemgateError::Transport(format!("failed to read response from {}: {}", url, e)))
        };

        // one budget for headers and body together
        let body = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| NemgateError::Timeout(self.timeout.as_millis() as u64))??;

        Ok(body.to_bytes())
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout)
            .finish()
    }
}
