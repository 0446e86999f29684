pub mod node;
pub mod page;
pub mod query;

pub use node::{NodeDescriptor, Protocol, ServerConfig, DEFAULT_NIS_PORT};
pub use page::PageResponse;
pub use query::{clamp_page_size, QueryParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
