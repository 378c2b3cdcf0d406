//! Summaries of finished queries.
use bytes::Bytes;

use crate::common::Id;

#[derive(Clone, Debug)]
pub struct StoreQueryMetadata {
    target: Id,
    stored_at: Vec<Id>,
    visited: usize,
}

impl StoreQueryMetadata {
    pub fn new(target: Id, stored_at: Vec<Id>, visited: usize) -> Self {
        Self {
            target,
            stored_at,
            visited,
        }
    }

    /// Return the key stored by this query.
    pub fn target(&self) -> &Id {
        &self.target
    }

    /// Return the nodes that newly stored the value, in visiting order.
    pub fn stored_at(&self) -> &[Id] {
        &self.stored_at
    }

    /// Return the number of nodes that answered this query, including the origin.
    pub fn visited(&self) -> usize {
        self.visited
    }
}

#[derive(Clone, Debug)]
pub struct GetQueryMetadata {
    target: Id,
    found: Option<(Id, Bytes)>,
    visited: usize,
}

impl GetQueryMetadata {
    pub fn new(target: Id, found: Option<(Id, Bytes)>, visited: usize) -> Self {
        Self {
            target,
            found,
            visited,
        }
    }

    /// Return the key looked up by this query.
    pub fn target(&self) -> &Id {
        &self.target
    }

    /// Return the verified value, if found.
    pub fn value(&self) -> Option<&Bytes> {
        self.found.as_ref().map(|(_, value)| value)
    }

    /// Return the node that responded with the verified value.
    pub fn from(&self) -> Option<&Id> {
        self.found.as_ref().map(|(from, _)| from)
    }

    /// Return the number of nodes that answered this query, including the origin.
    pub fn visited(&self) -> usize {
        self.visited
    }

    pub fn into_value(self) -> Option<Bytes> {
        self.found.map(|(_, value)| value)
    }
}
