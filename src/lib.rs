#![doc = include_str!("../README.md")]

mod common;

mod error;
mod peer;
pub mod rpc;
mod swarm;

pub use crate::common::{
    content_hash, validate_content, Id, KBucket, Magnitude, Node, RoutingTable, MAX_BUCKET_SIZE_K,
    MAX_DISTANCE,
};
pub use bytes::Bytes;
pub use error::{Error, Result};
pub use peer::Peer;
pub use rpc::Config;
pub use swarm::Swarm;
