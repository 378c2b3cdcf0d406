//! Store and lookup queries, forwarding requests from node to node.
//!
//! A query visits the origin first, then the peers each visited node forwards
//! to, depth first, in the order they were returned. Every node is visited at
//! most once, and never further than [super::Config::max_hops] from the origin.

use std::collections::HashSet;

use bytes::Bytes;
use tracing::{debug, trace};

use super::{Dispatcher, GetQueryMetadata, Request, Response, StoreQueryMetadata};
use crate::common::{validate_content, Id};
use crate::Peer;

#[derive(Debug)]
struct Traversal {
    target: Id,
    max_hops: usize,
    pending: Vec<(Id, usize)>,
    seen: HashSet<Id>,
    visited: usize,
}

impl Traversal {
    fn new(origin: &Peer, target: Id) -> Self {
        Self {
            target,
            max_hops: origin.config().max_hops,
            pending: vec![(origin.id().clone(), 0)],
            seen: HashSet::new(),
            visited: 0,
        }
    }

    /// Pops the next node to visit and its distance in hops from the origin.
    fn next(&mut self, origin: &Peer, dispatcher: &dyn Dispatcher) -> Option<(Peer, usize)> {
        while let Some((id, hops)) = self.pending.pop() {
            if self.seen.contains(&id) {
                continue;
            }

            if hops > self.max_hops {
                debug!(target = ?self.target, ?id, hops, "Max hops reached, not visiting");
                continue;
            }

            self.seen.insert(id.clone());

            let peer = if hops == 0 {
                Some(origin.clone())
            } else {
                dispatcher.resolve(origin, &id)
            };

            match peer {
                Some(peer) => {
                    self.visited += 1;
                    return Some((peer, hops));
                }
                None => debug!(target = ?self.target, ?id, "Unreachable node"),
            }
        }

        None
    }

    /// Schedules `closest` to be visited next, closest first.
    fn forward(&mut self, closest: &[Id], hops: usize) {
        for id in closest.iter().rev() {
            if !self.seen.contains(id) {
                self.pending.push((id.clone(), hops + 1));
            }
        }
    }

    /// Nodes that answered a request, unreachable Ids are not counted.
    fn visited(&self) -> usize {
        self.visited
    }
}

/// Store an already validated `value` at `origin` and every node it propagates to.
pub(crate) fn store(
    origin: &Peer,
    key: Id,
    value: Bytes,
    dispatcher: &dyn Dispatcher,
) -> StoreQueryMetadata {
    let request = Request::Store { key, value };
    let mut traversal = Traversal::new(origin, request.target().clone());
    let mut stored_at = Vec::new();

    trace!(target = ?request.target(), origin = ?origin.id(), "New store query");

    while let Some((peer, hops)) = traversal.next(origin, dispatcher) {
        let response = peer.handle_request(&request);

        trace!(
            target = ?request.target(),
            node = ?peer.id(),
            hops,
            ?response,
            "Store query got response"
        );

        if let Response::Stored { .. } = response {
            stored_at.push(peer.id().clone());
        }

        traversal.forward(response.closest(), hops);
    }

    let visited = traversal.visited();
    debug!(
        target = ?request.target(),
        stored_at = ?stored_at.len(),
        ?visited,
        "Done store query"
    );

    StoreQueryMetadata::new(traversal.target, stored_at, visited)
}

/// Look `key` up starting at `origin`, returning the first value matching its content hash.
pub(crate) fn lookup(origin: &Peer, key: Id, dispatcher: &dyn Dispatcher) -> GetQueryMetadata {
    let request = Request::Lookup { key };
    let mut traversal = Traversal::new(origin, request.target().clone());
    let mut found = None;

    trace!(target = ?request.target(), origin = ?origin.id(), "New lookup query");

    while let Some((peer, hops)) = traversal.next(origin, dispatcher) {
        match peer.handle_request(&request) {
            Response::Value(value) => {
                if validate_content(&value, request.target()) {
                    found = Some((peer.id().clone(), value));
                    break;
                }

                debug!(
                    target = ?request.target(),
                    node = ?peer.id(),
                    size = ?value.len(),
                    "Value doesn't match the content hash of target"
                );
            }
            response => traversal.forward(response.closest(), hops),
        }
    }

    let visited = traversal.visited();
    debug!(
        target = ?request.target(),
        found = ?found.is_some(),
        ?visited,
        "Done lookup query"
    );

    GetQueryMetadata::new(traversal.target, found, visited)
}
