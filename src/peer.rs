//! A node of the in-process DHT.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::{
    common::{validate_content, Id, Node, RoutingTable},
    rpc::{
        self, Config, Dispatcher, GetQueryMetadata, PutError, Request, Response, SharedTable,
        StoreQueryMetadata,
    },
};

#[derive(Debug, Clone)]
/// A node Id bound to a shared [RoutingTable].
///
/// Several peers may share one table, in which case each of them keeps its
/// entries in the bucket of its own Id.
pub struct Peer {
    id: Id,
    table: Arc<RoutingTable>,
    config: Config,
}

impl Peer {
    /// Create a peer with a new empty routing table and default [Config].
    pub fn new<T: Into<Id>>(id: T) -> Self {
        Self::with_config(id, Config::default())
    }

    pub fn with_config<T: Into<Id>>(id: T, config: Config) -> Self {
        Peer {
            id: id.into(),
            table: Arc::new(RoutingTable::new().with_bucket_size(config.bucket_size)),
            config,
        }
    }

    // === Getters ===

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn table(&self) -> &Arc<RoutingTable> {
        &self.table
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A peer with another Id, bound to the same routing table.
    pub fn sibling<T: Into<Id>>(&self, id: T) -> Peer {
        Peer {
            id: id.into(),
            table: Arc::clone(&self.table),
            config: self.config,
        }
    }

    // === Routing table ===

    /// Add a known peer to the routing table.
    pub fn insert_node<T: Into<Id>>(&self, id: T) {
        self.table.insert(Node::Peer(id.into()))
    }

    pub fn delete_node(&self, id: &Id) {
        self.table.remove(id)
    }

    pub fn update_node(&self, id: &Id, node: Node) {
        self.table.update(id, node)
    }

    pub fn find_node(&self, id: &Id) -> bool {
        self.table.contains(id)
    }

    /// Print every bucket of the routing table to stdout.
    pub fn print_bucket_contents(&self) {
        print!("{}", self.table);
    }

    // === Store and lookup ===

    /// Store `value` under `key` here, and propagate it to the closest known peers.
    ///
    /// Returns `false` if `key` is not the content hash of `value`.
    pub fn store(&self, key: &Id, value: Bytes) -> bool {
        self.put(key, value).is_ok()
    }

    /// Same as [Self::store] but returns the query metadata, or why nothing was stored.
    pub fn put(&self, key: &Id, value: Bytes) -> Result<StoreQueryMetadata, PutError> {
        self.put_with(key, value, &SharedTable)
    }

    /// Look up the value stored under `key`, starting here and following the closest known peers.
    ///
    /// Only returns values whose content hash is `key`.
    pub fn lookup(&self, key: &Id) -> Option<Bytes> {
        self.lookup_with_metadata(key).into_value()
    }

    /// Same as [Self::lookup] but returns the query metadata.
    pub fn lookup_with_metadata(&self, key: &Id) -> GetQueryMetadata {
        self.lookup_with(key, &SharedTable)
    }

    /// Answer a single request with the content of this peer's own bucket.
    pub fn handle_request(&self, request: &Request) -> Response {
        let index = self.id.bucket_index();

        match request {
            Request::Store { key, value } => {
                if !validate_content(value, key) {
                    debug!(
                        ?key,
                        node = ?self.id,
                        size = ?value.len(),
                        "Key doesn't match the content hash of value"
                    );
                    return Response::InvalidValue;
                }

                if !self.table.store_content(index, key, value) {
                    return Response::AlreadyStored;
                }

                Response::Stored {
                    closest: self.closest(index, key),
                }
            }
            Request::Lookup { key } => match self.table.get_content(index, key) {
                Some(value) => Response::Value(value),
                None => Response::Nodes {
                    closest: self.closest(index, key),
                },
            },
        }
    }

    // === Crate Methods ===

    pub(crate) fn put_with(
        &self,
        key: &Id,
        value: Bytes,
        dispatcher: &dyn Dispatcher,
    ) -> Result<StoreQueryMetadata, PutError> {
        if !validate_content(&value, key) {
            debug!(
                ?key,
                size = ?value.len(),
                "Key doesn't match the content hash of value"
            );
            return Err(PutError::HashMismatch(key.clone()));
        }

        Ok(rpc::query::store(self, key.clone(), value, dispatcher))
    }

    pub(crate) fn lookup_with(&self, key: &Id, dispatcher: &dyn Dispatcher) -> GetQueryMetadata {
        rpc::query::lookup(self, key.clone(), dispatcher)
    }

    // === Private Methods ===

    fn closest(&self, index: usize, key: &Id) -> Vec<Id> {
        self.table.closest(index, key, &self.id, self.config.fanout)
    }
}
