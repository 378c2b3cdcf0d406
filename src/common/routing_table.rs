//! Simplified Kademlia routing table

use std::fmt::{self, Display, Formatter};
use std::slice::Iter;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::common::{Id, Magnitude, Node, MAX_DISTANCE};
use crate::rpc::ClosestNodes;

/// K = the default maximum size of a k-bucket.
pub const MAX_BUCKET_SIZE_K: usize = 3;

#[derive(Debug)]
/// Simplified Kademlia routing table.
///
/// A fixed array of [MAX_DISTANCE] buckets behind a single read/write lock.
/// Entries are placed by [Id::bucket_index], which depends on the entry's Id
/// alone, not on the Id of any node holding the table.
pub struct RoutingTable {
    bucket_size: usize,
    buckets: RwLock<Vec<KBucket>>,
}

impl RoutingTable {
    /// Create a new empty [RoutingTable] with buckets of size [MAX_BUCKET_SIZE_K].
    pub fn new() -> Self {
        RoutingTable {
            bucket_size: MAX_BUCKET_SIZE_K,
            buckets: RwLock::new(vec![KBucket::new(); MAX_DISTANCE]),
        }
    }

    /// Set the maximum size of each k-bucket (at least 1).
    pub fn with_bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size.max(1);
        self
    }

    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    // === Public Methods ===

    /// Add a node to the bucket of its Id, evicting an existing entry if that bucket is full.
    pub fn insert(&self, node: Node) {
        let index = node.id().bucket_index();
        let mut buckets = self.write();

        trace!(id = ?node.id(), index, "Inserting node");

        if let Some(evicted) = buckets[index].add(node, self.bucket_size, index) {
            debug!(id = ?evicted.id(), index, "Evicted node from full bucket");
        }
    }

    /// Remove the first entry with this Id.
    pub fn remove(&self, id: &Id) {
        let index = id.bucket_index();

        if self.write()[index].remove(id).is_some() {
            trace!(?id, index, "Removed node");
        }
    }

    /// Replace the first entry with this Id by `node`, within the bucket of `id`.
    pub fn update(&self, id: &Id, node: Node) {
        let index = id.bucket_index();

        self.write()[index].update(id, node);
    }

    /// Returns `true` if the bucket of `id` has an entry with that Id.
    pub fn contains(&self, id: &Id) -> bool {
        let index = id.bucket_index();

        self.read()[index].contains(id)
    }

    /// Snapshot of all buckets, indexed by bucket index.
    pub fn dump(&self) -> Vec<Vec<Node>> {
        self.read()
            .iter()
            .map(|bucket| bucket.iter().cloned().collect())
            .collect()
    }

    /// Snapshot of a single bucket.
    pub fn bucket(&self, index: usize) -> Vec<Node> {
        self.read()
            .get(index)
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if this routing table is empty.
    pub fn is_empty(&self) -> bool {
        self.read().iter().all(|bucket| bucket.is_empty())
    }

    /// Return the number of entries in this routing table.
    pub fn size(&self) -> usize {
        self.read().iter().map(|bucket| bucket.len()).sum()
    }

    // === Crate Methods ===

    /// Append a content record to the bucket at `index`, unless it already holds `key`.
    ///
    /// Bypasses the bucket size limit. Returns `true` if the record was appended.
    pub(crate) fn store_content(&self, index: usize, key: &Id, value: &Bytes) -> bool {
        let mut buckets = self.write();
        let bucket = &mut buckets[index];

        if bucket.iter().any(|node| node.value_for(key).is_some()) {
            return false;
        }

        bucket.nodes.push(Node::Content {
            key: key.clone(),
            value: value.clone(),
        });

        true
    }

    /// The value stored under `key` in the bucket at `index`.
    pub(crate) fn get_content(&self, index: usize, key: &Id) -> Option<Bytes> {
        self.read()[index]
            .iter()
            .find_map(|node| node.value_for(key))
            .cloned()
    }

    /// Up to `count` peers from the bucket at `index` closest to `target`, excluding `exclude`.
    pub(crate) fn closest(
        &self,
        index: usize,
        target: &Id,
        exclude: &Id,
        count: usize,
    ) -> Vec<Id> {
        let mut closest = ClosestNodes::new(target.clone(), count);

        for node in self.read()[index].iter() {
            if node.is_peer() && node.id() != exclude {
                closest.add(node.id().clone());
            }
        }

        closest.into_iter().collect()
    }

    // === Private Methods ===

    fn read(&self) -> RwLockReadGuard<'_, Vec<KBucket>> {
        self.buckets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<KBucket>> {
        self.buckets.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoutingTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, bucket) in self.read().iter().enumerate() {
            write!(f, "Bucket {}: ", i)?;
            for node in bucket.iter() {
                write!(f, "{} ", node)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// A k-bucket, entries in insertion order.
#[derive(Debug, Clone, Default)]
pub struct KBucket {
    nodes: Vec<Node>,
}

impl KBucket {
    pub fn new() -> Self {
        KBucket { nodes: Vec::new() }
    }

    // === Public Methods ===

    /// Add a node to this bucket at `index` in the table, returns the evicted node if any.
    ///
    /// When the bucket is full, the entry with the largest Id among the first `k` is the
    /// eviction candidate. It is overwritten if the incoming node is within `2^index`
    /// of it, otherwise the first entry is dropped and the incoming node appended.
    /// A `k` of zero is treated as one.
    pub fn add(&mut self, incoming: Node, k: usize, index: usize) -> Option<Node> {
        let k = k.max(1);

        if self.nodes.len() < k {
            self.nodes.push(incoming);
            return None;
        }

        let mut candidate = 0;
        for (i, node) in self.nodes.iter().enumerate().take(k).skip(1) {
            if node.id() > self.nodes[candidate].id() {
                candidate = i;
            }
        }

        let distance = incoming.id().distance(self.nodes[candidate].id());
        let replace = match Magnitude::pow2(index) {
            Some(limit) => distance < limit,
            None => true,
        };

        if replace {
            Some(std::mem::replace(&mut self.nodes[candidate], incoming))
        } else {
            let evicted = self.nodes.remove(0);
            self.nodes.push(incoming);

            Some(evicted)
        }
    }

    /// Remove the first entry with this Id, preserving the order of the rest.
    pub fn remove(&mut self, id: &Id) -> Option<Node> {
        let index = self.nodes.iter().position(|node| node.id() == id)?;

        Some(self.nodes.remove(index))
    }

    /// Replace the first entry with this Id.
    pub fn update(&mut self, id: &Id, node: Node) {
        if let Some(existing) = self.nodes.iter_mut().find(|n| n.id() == id) {
            *existing = node;
        }
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.iter().any(|node| node.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> Iter<'_, Node> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod test {
    use crate::common::{Id, KBucket, Node, RoutingTable, MAX_BUCKET_SIZE_K, MAX_DISTANCE};

    fn ids(nodes: &[Node]) -> Vec<String> {
        nodes.iter().map(|n| n.id().to_string()).collect()
    }

    #[test]
    fn table_is_empty() {
        let table = RoutingTable::new();
        assert!(table.is_empty());

        table.insert(Node::peer("5"));
        assert!(!table.is_empty());
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn find_and_delete() {
        let table = RoutingTable::new();

        table.insert(Node::peer("5"));
        table.insert(Node::peer("9"));

        assert!(table.contains(&Id::from("5")));
        assert!(table.contains(&Id::from("9")));
        assert!(!table.contains(&Id::from("7")));

        table.remove(&Id::from("5"));
        assert!(!table.contains(&Id::from("5")));
        assert!(table.contains(&Id::from("9")));

        // Absent
        table.remove(&Id::from("5"));
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn placement_is_stable() {
        let table = RoutingTable::new();

        table.insert(Node::peer("5"));
        table.insert(Node::peer("6"));

        assert_eq!(ids(&table.bucket(2)), vec!["5", "6"]);
        assert_eq!(table.dump().len(), MAX_DISTANCE);
    }

    #[test]
    fn remove_preserves_order() {
        let mut bucket = KBucket::new();
        for id in ["a", "b", "c"] {
            bucket.add(Node::peer(id), MAX_BUCKET_SIZE_K, 0);
        }

        bucket.remove(&Id::from("b"));
        assert_eq!(ids(&bucket.iter().cloned().collect::<Vec<_>>()), vec!["a", "c"]);
    }

    #[test]
    fn update() {
        let table = RoutingTable::new();

        table.insert(Node::peer("5"));
        table.insert(Node::peer("6"));
        table.update(&Id::from("5"), Node::peer("4"));

        assert_eq!(ids(&table.bucket(2)), vec!["4", "6"]);

        // Absent
        table.update(&Id::from("7"), Node::peer("7"));
        assert_eq!(ids(&table.bucket(2)), vec!["4", "6"]);
    }

    #[test]
    fn should_not_add_more_than_k() {
        let table = RoutingTable::new();

        for _ in 0..1000 {
            table.insert(Node::peer(Id::random()));
        }

        for bucket in table.dump() {
            assert!(bucket.len() <= MAX_BUCKET_SIZE_K);
        }
    }

    #[test]
    fn full_bucket_replaces_largest_when_close() {
        let table = RoutingTable::new();

        for id in ["4", "6", "5"] {
            table.insert(Node::peer(id));
        }

        // "6" is the largest, 7 ^ 6 = 1 < 2^2
        table.insert(Node::peer("7"));
        assert_eq!(ids(&table.bucket(2)), vec!["4", "7", "5"]);
    }

    #[test]
    fn full_bucket_rotates_when_far() {
        let table = RoutingTable::new();

        for id in ["a", "c", "b"] {
            table.insert(Node::peer(id));
        }

        // "c" is the largest, 1 ^ 0 = 1 is not < 2^0
        table.insert(Node::peer("1"));
        assert_eq!(ids(&table.bucket(0)), vec!["c", "b", "1"]);

        // "c" is the largest, 0 ^ 0 = 0 < 2^0
        table.insert(Node::peer("d"));
        assert_eq!(ids(&table.bucket(0)), vec!["d", "b", "1"]);
    }

    #[test]
    fn custom_bucket_size() {
        let table = RoutingTable::new().with_bucket_size(1);

        table.insert(Node::peer("4"));
        table.insert(Node::peer("5"));

        assert_eq!(ids(&table.bucket(2)), vec!["5"]);
        assert_eq!(RoutingTable::new().with_bucket_size(0).bucket_size(), 1);
    }

    #[test]
    fn store_content_bypasses_k() {
        let table = RoutingTable::new();

        for id in ["a", "b", "c"] {
            table.insert(Node::peer(id));
        }

        let key = Id::from("key");
        let value = bytes::Bytes::from_static(b"value");

        assert!(table.store_content(0, &key, &value));
        assert!(!table.store_content(0, &key, &value));
        assert_eq!(table.bucket(0).len(), MAX_BUCKET_SIZE_K + 1);
        assert_eq!(table.get_content(0, &key), Some(value));
        assert_eq!(table.get_content(1, &key), None);
    }

    #[test]
    fn closest_excludes_self_and_content() {
        let table = RoutingTable::new();

        for id in ["12", "8", "9"] {
            table.insert(Node::peer(id));
        }
        table.store_content(3, &Id::from("10"), &bytes::Bytes::new());

        let closest = table.closest(3, &Id::from("10"), &Id::from("8"), 2);
        assert_eq!(closest, vec![Id::from("9"), Id::from("12")]);
    }

    #[test]
    fn display() {
        let table = RoutingTable::new();
        table.insert(Node::peer("5"));
        table.insert(Node::peer("9"));

        let dump = table.to_string();
        let lines: Vec<_> = dump.lines().collect();

        assert_eq!(lines.len(), MAX_DISTANCE);
        assert_eq!(lines[0], "Bucket 0: ");
        assert_eq!(lines[2], "Bucket 2: 5 ");
        assert_eq!(lines[3], "Bucket 3: 9 ");
    }

    #[test]
    fn bucket_size_zero_holds_one() {
        let mut bucket = KBucket::new();

        assert_eq!(bucket.add(Node::peer("1"), 0, 0), None);
        assert_eq!(bucket.add(Node::peer("0"), 0, 0), Some(Node::peer("1")));
        assert_eq!(bucket.len(), 1);
        assert!(bucket.contains(&Id::from("0")));
    }
}
