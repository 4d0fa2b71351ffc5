//! Simplicial complex built from the dual of a hypergraph.
//!
//! Hyperedges become vertices of an auxiliary graph (adjacent iff they share a node); each
//! maximal clique of that graph is a simplex, and the complex is the downward closure of those
//! simplices. Signals on a face are the mean of the node signal over the nodes common to every
//! hyperedge in the face.

use std::collections::BTreeSet;

use ndarray::{Array2, Axis};
use petgraph::visit::EdgeRef;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{check_nodes, HgResult, HypergraphError};
use crate::hypergraph::Hypergraph;

/// Simplices larger than this are refused: their closure has 2^k faces.
pub const MAX_SIMPLEX_VERTICES: usize = 20;

/// Faces grouped by order; a face of order k is a sorted tuple of k + 1 vertices.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimplicialComplex {
    face_set: Vec<Vec<Vec<usize>>>,
    signals: Vec<Array2<f64>>,
}

impl SimplicialComplex {
    /// Downward closure of `simplices`, deduplicated and sorted within each order.
    pub fn from_simplices<I>(simplices: I) -> HgResult<Self>
    where
        I: IntoIterator<Item = Vec<usize>>,
    {
        let mut by_order: Vec<BTreeSet<Vec<usize>>> = Vec::new();
        for mut simplex in simplices {
            simplex.sort_unstable();
            simplex.dedup();
            if simplex.len() > MAX_SIMPLEX_VERTICES {
                return Err(HypergraphError::InvalidInput(format!(
                    "simplex with {} vertices exceeds the limit of {}",
                    simplex.len(),
                    MAX_SIMPLEX_VERTICES
                )));
            }
            if by_order.len() < simplex.len() {
                by_order.resize_with(simplex.len(), BTreeSet::new);
            }
            for mask in 1u32..(1u32 << simplex.len()) {
                let face: Vec<usize> = simplex
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| mask & (1 << bit) != 0)
                    .map(|(_, &v)| v)
                    .collect();
                by_order[face.len() - 1].insert(face);
            }
        }
        Ok(Self {
            face_set: by_order.into_iter().map(|set| set.into_iter().collect()).collect(),
            signals: Vec::new(),
        })
    }

    /// Faces of the given order (empty slice past the top order).
    pub fn n_faces(&self, order: usize) -> &[Vec<usize>] {
        self.face_set.get(order).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn face_set(&self) -> &[Vec<Vec<usize>>] {
        &self.face_set
    }

    /// Number of orders present (top order + 1); zero for the empty complex.
    pub fn orders(&self) -> usize {
        self.face_set.len()
    }

    pub fn face_count(&self) -> usize {
        self.face_set.iter().map(Vec::len).sum()
    }

    pub fn signals(&self) -> &[Array2<f64>] {
        &self.signals
    }

    /// Attaches one signal matrix per order, each with one row per face.
    pub fn import_signals(&mut self, signals: Vec<Array2<f64>>) -> HgResult<()> {
        if signals.len() != self.orders() {
            return Err(HypergraphError::InvalidInput(format!(
                "expected signals for {} orders, got {}",
                self.orders(),
                signals.len()
            )));
        }
        for (order, sig) in signals.iter().enumerate() {
            check_nodes(self.face_set[order].len(), sig.nrows())?;
        }
        self.signals = signals;
        Ok(())
    }
}

/// Maximal cliques of an undirected simple graph (Bron–Kerbosch with pivoting), sorted.
pub fn maximal_cliques(adjacency: &[BTreeSet<usize>]) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if adjacency.is_empty() {
        return out;
    }
    let candidates: BTreeSet<usize> = (0..adjacency.len()).collect();
    bron_kerbosch(adjacency, &mut Vec::new(), candidates, BTreeSet::new(), &mut out);
    out.sort();
    out
}

fn bron_kerbosch(
    adj: &[BTreeSet<usize>],
    clique: &mut Vec<usize>,
    mut p: BTreeSet<usize>,
    mut x: BTreeSet<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    let pivot = match p.union(&x).max_by_key(|&&u| adj[u].intersection(&p).count()) {
        Some(&u) => u,
        None => {
            let mut found = clique.clone();
            found.sort_unstable();
            out.push(found);
            return;
        }
    };

    let branch: Vec<usize> = p.difference(&adj[pivot]).copied().collect();
    for v in branch {
        clique.push(v);
        let p_next = p.intersection(&adj[v]).copied().collect();
        let x_next = x.intersection(&adj[v]).copied().collect();
        bron_kerbosch(adj, clique, p_next, x_next, out);
        clique.pop();
        p.remove(&v);
        x.insert(v);
    }
}

/// Nodes shared by every hyperedge in `face` (ascending).
fn common_nodes(hyperedges: &[Vec<usize>], face: &[usize]) -> Vec<usize> {
    let mut common = hyperedges[face[0]].clone();
    for &h in &face[1..] {
        let other = &hyperedges[h];
        common.retain(|v| other.binary_search(v).is_ok());
    }
    common
}

impl<K> Hypergraph<K> {
    /// Hyperedge intersection graph as adjacency sets (vertex = hyperedge index), read off the
    /// line expansion.
    pub fn intersection_graph(&self) -> Vec<BTreeSet<usize>> {
        let line = self.line_expansion();
        let mut adj = vec![BTreeSet::new(); line.node_count()];
        for edge in line.edge_references() {
            let (i, j) = (line[edge.source()], line[edge.target()]);
            adj[i].insert(j);
            adj[j].insert(i);
        }
        adj
    }

    /// Simplicial dual of the hypergraph carrying the face-aggregated signal `x` (N x F).
    pub fn sc_dual(&self, x: &Array2<f64>) -> HgResult<SimplicialComplex> {
        check_nodes(self.n(), x.nrows())?;

        let cliques = maximal_cliques(&self.intersection_graph());
        let mut complex = SimplicialComplex::from_simplices(cliques)?;

        let hyperedges = self.hyperedges();
        let mut signals = Vec::with_capacity(complex.orders());
        for faces in complex.face_set() {
            let mut sig = Array2::zeros((faces.len(), x.ncols()));
            for (row, face) in faces.iter().enumerate() {
                let common = common_nodes(hyperedges, face);
                if common.is_empty() {
                    return Err(HypergraphError::EmptyFaceIntersection { face: face.clone() });
                }
                let mean = x
                    .select(Axis(0), &common)
                    .mean_axis(Axis(0))
                    .ok_or_else(|| HypergraphError::EmptyFaceIntersection { face: face.clone() })?;
                sig.row_mut(row).assign(&mean);
            }
            signals.push(sig);
        }
        complex.import_signals(signals)?;

        debug!(
            orders = complex.orders(),
            faces = complex.face_count(),
            "simplicial dual built"
        );
        Ok(complex)
    }

    /// Simplicial dual carrying the hypergraph's stored signals.
    pub fn sc_dual_of_signals(&self) -> HgResult<SimplicialComplex> {
        self.sc_dual(self.signals())
    }
}
