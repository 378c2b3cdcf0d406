//! Propagation of store and lookup requests between nodes

mod closest_nodes;
mod config;
mod dispatcher;
mod messages;
pub(crate) mod query;
mod response;

pub use closest_nodes::ClosestNodes;
pub use config::Config;
pub use dispatcher::{Dispatcher, SharedTable};
pub use messages::{Request, Response};
pub use response::{GetQueryMetadata, StoreQueryMetadata};

use crate::common::Id;

/// Default number of closest peers a request is forwarded to.
pub const DEFAULT_FANOUT: usize = 2;
/// Default maximum number of hops a request is forwarded.
pub const DEFAULT_MAX_HOPS: usize = 32;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Store query errors
pub enum PutError {
    /// The key is not the content hash of the value, nothing was stored.
    #[error("Key {0} is not the content hash of the value")]
    HashMismatch(Id),
}
