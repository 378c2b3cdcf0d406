//! Routing of forwarded requests to simulated nodes.

use std::fmt::Debug;

use crate::{common::Id, Peer};

/// Resolves the Id of a node a request is forwarded to, into the [Peer] answering for it.
pub trait Dispatcher: Debug {
    /// Returns the peer answering for `to`, or `None` if it is unreachable.
    ///
    /// `origin` is the peer the query started from.
    fn resolve(&self, origin: &Peer, to: &Id) -> Option<Peer>;
}

#[derive(Debug, Default, Clone, Copy)]
/// Every Id resolves to a peer bound to the origin's own routing table.
pub struct SharedTable;

impl Dispatcher for SharedTable {
    fn resolve(&self, origin: &Peer, to: &Id) -> Option<Peer> {
        Some(origin.sibling(to.clone()))
    }
}
