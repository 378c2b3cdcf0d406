//! A simulated network of peers, each with its own routing table.

use std::collections::BTreeMap;

use bytes::Bytes;
use tracing::debug;

use crate::{
    common::Id,
    rpc::{Config, Dispatcher, GetQueryMetadata, StoreQueryMetadata},
    Error, Peer, Result,
};

#[derive(Debug, Default)]
/// Peers addressed by Id, forwarding requests to each other instead of to a shared table.
///
/// Requests forwarded to an Id that isn't part of the swarm are dropped.
pub struct Swarm {
    peers: BTreeMap<Id, Peer>,
    config: Config,
}

impl Swarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Peers added from now on use this config.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    // === Getters ===

    pub fn peer(&self, id: &Id) -> Option<&Peer> {
        self.peers.get(id)
    }

    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    // === Public Methods ===

    /// Add a new peer with an empty routing table.
    pub fn add_peer<T: Into<Id>>(&mut self, id: T) -> Result<&Peer> {
        let id = id.into();

        if self.peers.contains_key(&id) {
            return Err(Error::DuplicatePeer(id));
        }

        debug!(?id, "Adding peer to swarm");

        let peer = Peer::with_config(id.clone(), self.config);

        Ok(self.peers.entry(id).or_insert(peer))
    }

    /// Store `value` under `key` starting at the peer `from`.
    pub fn store(&self, from: &Id, key: &Id, value: Bytes) -> Result<StoreQueryMetadata> {
        let origin = self.origin(from)?;

        Ok(origin.put_with(key, value, self)?)
    }

    /// Look up `key` starting at the peer `from`.
    pub fn lookup(&self, from: &Id, key: &Id) -> Result<Option<Bytes>> {
        Ok(self.lookup_with_metadata(from, key)?.into_value())
    }

    pub fn lookup_with_metadata(&self, from: &Id, key: &Id) -> Result<GetQueryMetadata> {
        let origin = self.origin(from)?;

        Ok(origin.lookup_with(key, self))
    }

    // === Private Methods ===

    fn origin(&self, id: &Id) -> Result<&Peer> {
        self.peers
            .get(id)
            .ok_or_else(|| Error::UnknownPeer(id.clone()))
    }
}

impl Dispatcher for Swarm {
    fn resolve(&self, _origin: &Peer, to: &Id) -> Option<Peer> {
        self.peers.get(to).cloned()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;
    use crate::rpc::PutError;

    fn hello() -> (Id, Bytes) {
        let value = Bytes::from_static(b"hello");
        (Id::from_content(&value), value)
    }

    fn chain() -> Swarm {
        let mut swarm = Swarm::new();
        for id in ["8", "9", "10", "12"] {
            swarm.add_peer(id).expect("unique ids");
        }

        let peer = |id: &str| swarm.peer(&Id::from(id)).expect("added").clone();
        peer("8").insert_node("9");
        peer("9").insert_node("10");
        peer("12").insert_node("10");

        swarm
    }

    #[test]
    fn peers_have_own_tables() {
        let swarm = chain();

        let a = swarm.peer(&Id::from("8")).expect("added");
        let b = swarm.peer(&Id::from("9")).expect("added");

        assert!(!Arc::ptr_eq(a.table(), b.table()));
        assert_eq!(swarm.len(), 4);
    }

    #[test]
    fn store_propagates_across_tables() {
        let swarm = chain();
        let (key, value) = hello();

        let metadata = swarm
            .store(&Id::from("8"), &key, value.clone())
            .expect("valid store");

        assert_eq!(
            metadata.stored_at(),
            &[Id::from("8"), Id::from("9"), Id::from("10")]
        );

        let metadata = swarm
            .lookup_with_metadata(&Id::from("12"), &key)
            .expect("known origin");

        assert_eq!(metadata.value(), Some(&value));
        assert_eq!(metadata.from(), Some(&Id::from("10")));
    }

    #[test]
    fn unreachable_peers_are_skipped() {
        let swarm = chain();
        let (key, value) = hello();

        swarm
            .peer(&Id::from("12"))
            .expect("added")
            .insert_node("9x");

        swarm
            .store(&Id::from("9"), &key, value.clone())
            .expect("valid store");

        // "9x" is closer but not in the swarm, "10" still answers.
        let metadata = swarm
            .lookup_with_metadata(&Id::from("12"), &key)
            .expect("known origin");

        assert_eq!(metadata.value(), Some(&value));
        assert_eq!(metadata.from(), Some(&Id::from("10")));
        // "12" and "10" answered, "9x" never did.
        assert_eq!(metadata.visited(), 2);
    }

    #[test]
    fn errors() {
        let mut swarm = chain();
        let (key, value) = hello();

        assert!(matches!(swarm.add_peer("8"), Err(Error::DuplicatePeer(_))));
        assert!(matches!(
            swarm.store(&Id::from("7"), &key, value),
            Err(Error::UnknownPeer(_))
        ));
        assert!(matches!(
            swarm.store(&Id::from("8"), &key, Bytes::from_static(b"other")),
            Err(Error::Put(PutError::HashMismatch(_)))
        ));
        assert!(matches!(
            swarm.lookup(&Id::from("7"), &key),
            Err(Error::UnknownPeer(_))
        ));
    }
}
