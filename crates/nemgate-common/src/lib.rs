//! nemgate common types
//!
//! Shared building blocks for talking to NEM nodes:
//!
//! - [`error`] - the [`NemgateError`] type used across the workspace
//! - [`network`] - explicit network selection ([`NetworkContext`])
//! - [`protocol`] - node descriptors, pagination parameters and the page envelope
//! - [`time_window`] - transaction deadlines in the nemesis-block epoch
//!
//! # Example
//!
//! ```
//! use nemgate_common::{DeadlineUnit, NetworkContext, NetworkType, TimeWindow};
//!
//! let mut ctx = NetworkContext::new();
//! ctx.bootstrap(NetworkType::TestNet).unwrap();
//!
//! let window = TimeWindow::create_with_deadline(2, DeadlineUnit::Hours).unwrap();
//! assert_eq!(window.deadline_to_dto() - window.time_stamp_to_dto(), 7200);
//! ```

pub mod error;
pub mod network;
pub mod protocol;
pub mod time_window;

pub use error::{NemgateError, Result};
pub use network::{NetworkContext, NetworkType};
pub use protocol::{NodeDescriptor, PageResponse, Protocol, QueryParams, ServerConfig};
pub use time_window::{
    from_native_epoch, to_native_epoch, DeadlineUnit, TimeWindow, TimeWindowDto,
    NEMESIS_BLOCK_TIMESTAMP,
};
