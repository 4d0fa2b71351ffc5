//! Node registry: assigns dense indices 0..N-1 to external node identifiers in first-seen order.

use std::collections::HashMap;
use std::hash::Hash;

/// Transient index-assignment pass used while a hypergraph is being built.
///
/// Indices are never reused or reassigned; `finish()` hands the frozen map to the hypergraph.
#[derive(Debug, Clone)]
pub struct NodeRegistry<K> {
    map: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone> NodeRegistry<K> {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// Returns the index of `id`, allocating the next one on first sight.
    pub fn map_node(&mut self, id: K) -> usize {
        let next = self.map.len();
        *self.map.entry(id).or_insert(next)
    }

    pub fn get(&self, id: &K) -> Option<usize> {
        self.map.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn finish(self) -> HashMap<K, usize> {
        self.map
    }
}

impl<K: Hash + Eq + Clone> Default for NodeRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}
