use crate::common::MAX_BUCKET_SIZE_K;

use super::{DEFAULT_FANOUT, DEFAULT_MAX_HOPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Peer and query configurations
pub struct Config {
    /// Maximum number of entries [crate::RoutingTable::insert] keeps in a bucket.
    ///
    /// Defaults to [MAX_BUCKET_SIZE_K]
    pub bucket_size: usize,
    /// Number of closest peers each visited node forwards a request to.
    ///
    /// Defaults to [DEFAULT_FANOUT]
    pub fanout: usize,
    /// Maximum number of forwarding hops away from the origin node.
    ///
    /// Nodes further than this from the origin are not visited.
    ///
    /// Defaults to [DEFAULT_MAX_HOPS]
    pub max_hops: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_size: MAX_BUCKET_SIZE_K,
            fanout: DEFAULT_FANOUT,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}
