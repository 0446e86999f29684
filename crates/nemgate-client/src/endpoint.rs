use nemgate_common::{NetworkContext, NodeDescriptor, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::endpoint_pool::EndpointPool;
use crate::transport::HttpTransport;

/// Base of every resource client: one resource path (`namespace`,
/// `account`, ...) served by a pool of nodes.
///
/// Requests are built per node as `<node>/<resource>[/<path>][?<query>]` and
/// sent through the failover [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    resource: String,
    dispatcher: Dispatcher,
    transport: HttpTransport,
}

impl HttpEndpoint {
    /// Builds an endpoint over the configured nodes, or over the default
    /// node of the context's network when none are configured.
    ///
    /// # Errors
    ///
    /// Returns [`nemgate_common::NemgateError::NotInitialized`] if `ctx` was
    /// never bootstrapped.
    pub fn new(resource: impl Into<String>, ctx: &NetworkContext, config: &ClientConfig) -> Result<Self> {
        let network = ctx.network_type()?;
        let pool = Arc::new(EndpointPool::new(config.nodes.clone(), network));
        Ok(Self::with_pool(resource, pool, config))
    }

    /// Builds an endpoint over an existing pool, e.g. to load-balance
    /// several resource clients over the same rotation.
    pub fn with_pool(resource: impl Into<String>, pool: Arc<EndpointPool>, config: &ClientConfig) -> Self {
        Self {
            resource: resource.into(),
            dispatcher: Dispatcher::new(pool, config.retry.clone()),
            transport: HttpTransport::new(config.request_timeout()),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// URL of `path` on `node`; empty `path` and `query` are left out.
    pub fn url_for(&self, node: &NodeDescriptor, path: &str, query: &str) -> String {
        let mut url = format!("{}/{}", node.base_url(), self.resource);
        if !path.is_empty() {
            url.push('/');
            url.push_str(path.trim_start_matches('/'));
        }
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// GETs `path?query` from the next node, failing over on error.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<T> {
        let transport = &self.transport;
        self.dispatcher
            .execute(|node| {
                let url = self.url_for(&node, path, query);
                async move { transport.get_json::<T>(&url).await }
            })
            .await
    }
}
