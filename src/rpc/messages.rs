//! Requests a node answers during a query, and its responses.

use bytes::Bytes;

use crate::common::Id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Store `value` under `key`, which must be its content hash.
    Store { key: Id, value: Bytes },
    /// Return the value stored under `key`.
    Lookup { key: Id },
}

impl Request {
    /// The key this request is routed towards.
    pub fn target(&self) -> &Id {
        match self {
            Request::Store { key, .. } => key,
            Request::Lookup { key } => key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The node already had the key, the request is not forwarded further.
    AlreadyStored,
    /// The node stored the value, and forwards to its closest peers.
    Stored { closest: Vec<Id> },
    /// The value doesn't match the key, nothing was stored.
    InvalidValue,
    /// The node has a value for the key.
    Value(Bytes),
    /// The node doesn't have the key, and forwards to its closest peers.
    Nodes { closest: Vec<Id> },
}

impl Response {
    /// Peers the request should be forwarded to next.
    pub fn closest(&self) -> &[Id] {
        match self {
            Response::Stored { closest } | Response::Nodes { closest } => closest,
            Response::AlreadyStored | Response::InvalidValue | Response::Value(_) => &[],
        }
    }
}
