//! Main Crate Error

use crate::{common::Id, rpc::PutError};

#[derive(thiserror::Error, Debug)]
/// Kadstore crate error enum.
pub enum Error {
    /// No peer with this Id is part of the swarm.
    #[error("Unknown peer: {0}")]
    UnknownPeer(Id),

    /// A peer with this Id is already part of the swarm.
    #[error("Duplicate peer: {0}")]
    DuplicatePeer(Id),

    #[error(transparent)]
    /// Transparent [PutError]
    Put(#[from] PutError),
}

/// Alias for `Result<T, Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
