use std::vec::IntoIter;

use crate::common::{Id, Magnitude};

#[derive(Debug, Clone)]
/// The `capacity` closest Ids to a target seen so far, closest first.
///
/// Among equally distant Ids, the one added first ranks first.
pub struct ClosestNodes {
    target: Id,
    capacity: usize,
    nodes: Vec<(Magnitude, Id)>,
}

impl ClosestNodes {
    pub fn new(target: Id, capacity: usize) -> Self {
        Self {
            target,
            capacity,
            nodes: Vec::with_capacity(capacity),
        }
    }

    // === Getters ===

    pub fn target(&self) -> &Id {
        &self.target
    }

    // === Public Methods ===

    pub fn add(&mut self, id: Id) {
        let distance = id.distance(&self.target);
        let position = self.nodes.partition_point(|(d, _)| *d <= distance);

        if position < self.capacity {
            self.nodes.insert(position, (distance, id));
            self.nodes.truncate(self.capacity);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl IntoIterator for ClosestNodes {
    type Item = Id;
    type IntoIter = IntoIter<Id>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes
            .into_iter()
            .map(|(_, id)| id)
            .collect::<Vec<_>>()
            .into_iter()
    }
}
