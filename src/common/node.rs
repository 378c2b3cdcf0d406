//! Entries of the Kademlia routing table
use std::fmt::{self, Display, Formatter};

use bytes::Bytes;

use crate::common::Id;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Entry in a k-bucket: either a known peer, or a content record stored at this node.
pub enum Node {
    Peer(Id),
    Content { key: Id, value: Bytes },
}

impl Node {
    /// Creates a peer entry.
    pub fn peer<T: Into<Id>>(id: T) -> Node {
        Node::Peer(id.into())
    }

    /// The Id this entry is placed and matched by.
    pub fn id(&self) -> &Id {
        match self {
            Node::Peer(id) => id,
            Node::Content { key, .. } => key,
        }
    }

    pub fn is_peer(&self) -> bool {
        matches!(self, Node::Peer(_))
    }

    /// Returns the stored value if this is a content record for `key`.
    pub fn value_for(&self, key: &Id) -> Option<&Bytes> {
        match self {
            Node::Content { key: k, value } if k == key => Some(value),
            _ => None,
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
