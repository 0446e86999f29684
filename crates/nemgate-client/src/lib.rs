//! HTTP access to NEM nodes.
//!
//! Requests rotate over an [`EndpointPool`] and fail over to the next node
//! through the [`Dispatcher`]. Paged listings are walked with [`Pageable`].

pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod endpoint_pool;
pub mod namespace;
pub mod pageable;
pub mod transport;

pub use config::ClientConfig;
pub use dispatcher::{Dispatcher, RetryConfig, RetryPolicy};
pub use endpoint::HttpEndpoint;
pub use endpoint_pool::EndpointPool;
pub use namespace::{Namespace, NamespaceHttp};
pub use pageable::{CursorOrder, Pageable, PagedResource};
pub use transport::HttpTransport;
