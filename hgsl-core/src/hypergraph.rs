//! Hypergraph: canonical node indices, sorted hyperedges, and an optional node signal matrix.

use std::collections::HashMap;
use std::hash::Hash;

use ndarray::Array2;
use tracing::debug;

use crate::error::{check_nodes, HgResult};
use crate::registry::NodeRegistry;

/// Immutable hypergraph over N canonical nodes and M hyperedges.
///
/// `K` is the external node identifier type. Node indices are assigned in first-seen order
/// while the raw hyperedges are read, and never change afterwards.
#[derive(Debug, Clone)]
pub struct Hypergraph<K = usize> {
    node_map: HashMap<K, usize>,
    hyperedges: Vec<Vec<usize>>,
    signals: Array2<f64>,
}

impl<K: Hash + Eq + Clone> Hypergraph<K> {
    /// Builds the hypergraph from raw hyperedges; signals default to zeros (N x 1).
    ///
    /// Each hyperedge is mapped to canonical indices, sorted ascending, and de-duplicated.
    pub fn new<I, E>(hyperedges: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoIterator<Item = K>,
    {
        let mut registry = NodeRegistry::new();
        let mut dropped = 0usize;
        let hyperedges: Vec<Vec<usize>> = hyperedges
            .into_iter()
            .map(|hedge| {
                let mut members: Vec<usize> =
                    hedge.into_iter().map(|v| registry.map_node(v)).collect();
                let raw_len = members.len();
                members.sort_unstable();
                members.dedup();
                dropped += raw_len - members.len();
                members
            })
            .collect();

        let n = registry.len();
        if dropped > 0 {
            debug!(dropped, "removed repeated nodes inside hyperedges");
        }
        debug!(nodes = n, hyperedges = hyperedges.len(), "hypergraph built");

        Self {
            node_map: registry.finish(),
            hyperedges,
            signals: Array2::zeros((n, 1)),
        }
    }

    /// Builds the hypergraph and attaches an N x F signal matrix.
    pub fn with_signals<I, E>(hyperedges: I, signals: Array2<f64>) -> HgResult<Self>
    where
        I: IntoIterator<Item = E>,
        E: IntoIterator<Item = K>,
    {
        let mut hg = Self::new(hyperedges);
        hg.set_signals(signals)?;
        Ok(hg)
    }

    /// Canonical index of an external identifier.
    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.node_map.get(id).copied()
    }

    pub fn node_map(&self) -> &HashMap<K, usize> {
        &self.node_map
    }
}

impl<K> Hypergraph<K> {
    /// Number of nodes (N).
    pub fn n(&self) -> usize {
        self.signals.nrows()
    }

    /// Number of hyperedges (M).
    pub fn m(&self) -> usize {
        self.hyperedges.len()
    }

    pub fn hyperedges(&self) -> &[Vec<usize>] {
        &self.hyperedges
    }

    pub fn hyperedge(&self, idx: usize) -> Option<&[usize]> {
        self.hyperedges.get(idx).map(Vec::as_slice)
    }

    pub fn signals(&self) -> &Array2<f64> {
        &self.signals
    }

    /// Replaces the stored signals; the row count must equal N.
    pub fn set_signals(&mut self, signals: Array2<f64>) -> HgResult<()> {
        check_nodes(self.n(), signals.nrows())?;
        self.signals = signals;
        Ok(())
    }

    /// Number of hyperedges each node belongs to.
    pub fn node_degrees(&self) -> Vec<usize> {
        let mut deg = vec![0usize; self.n()];
        for hedge in &self.hyperedges {
            for &v in hedge {
                deg[v] += 1;
            }
        }
        deg
    }

    /// Indicator signal (N x 1) that is 1 on the members of hyperedge `idx`.
    pub fn indicator(&self, idx: usize) -> HgResult<Array2<f64>> {
        let hedge = self.hyperedge(idx).ok_or_else(|| {
            crate::HypergraphError::InvalidInput(format!(
                "hyperedge {} out of range (M = {})",
                idx,
                self.m()
            ))
        })?;
        let mut x = Array2::zeros((self.n(), 1));
        for &v in hedge {
            x[[v, 0]] = 1.0;
        }
        Ok(x)
    }
}

/// Turns a 1-D signal into an N x 1 matrix.
pub fn column_signal<I: IntoIterator<Item = f64>>(values: I) -> Array2<f64> {
    let values: Vec<f64> = values.into_iter().collect();
    Array2::from_shape_fn((values.len(), 1), |(i, _)| values[i])
}
