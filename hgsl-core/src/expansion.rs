//! Structural expansions of a hypergraph and their normalized Laplacians.
//!
//! - clique expansion: graph on the N nodes, pair weight = number of shared hyperedges
//! - line expansion: graph on the M hyperedges, edge weight = size of the intersection
//! - incidence matrix: N x M, `B[v, e] = 1` iff v is in e
//!
//! Graph vertex `k` always corresponds to canonical index `k` (the vertex weight stores it).

use ndarray::Array2;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::error::{HgResult, HypergraphError};
use crate::hypergraph::Hypergraph;

/// Size of the intersection of two ascending index lists.
pub(crate) fn intersection_len(a: &[usize], b: &[usize]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

fn indexed_graph(vertices: usize) -> UnGraph<usize, f64> {
    let mut g = UnGraph::with_capacity(vertices, 0);
    for v in 0..vertices {
        g.add_node(v);
    }
    g
}

impl<K> Hypergraph<K> {
    pub fn clique_expansion(&self) -> UnGraph<usize, f64> {
        let mut g = indexed_graph(self.n());
        for hedge in self.hyperedges() {
            for (a, &i) in hedge.iter().enumerate() {
                for &j in &hedge[a + 1..] {
                    let (u, v) = (NodeIndex::new(i), NodeIndex::new(j));
                    match g.find_edge(u, v) {
                        Some(e) => g[e] += 1.0,
                        None => {
                            g.add_edge(u, v, 1.0);
                        }
                    }
                }
            }
        }
        g
    }

    pub fn line_expansion(&self) -> UnGraph<usize, f64> {
        let hyperedges = self.hyperedges();
        let mut g = indexed_graph(self.m());
        for i in 0..hyperedges.len() {
            for j in i + 1..hyperedges.len() {
                let shared = intersection_len(&hyperedges[i], &hyperedges[j]);
                if shared > 0 {
                    g.add_edge(NodeIndex::new(i), NodeIndex::new(j), shared as f64);
                }
            }
        }
        g
    }

    pub fn incidence_matrix(&self) -> Array2<f64> {
        let mut b = Array2::zeros((self.n(), self.m()));
        for (e, hedge) in self.hyperedges().iter().enumerate() {
            for &v in hedge {
                b[[v, e]] = 1.0;
            }
        }
        b
    }

    /// Normalized Laplacian of the clique expansion (N x N).
    pub fn clique_laplacian(&self) -> Array2<f64> {
        laplacian_from_adjacency(&adjacency_matrix(&self.clique_expansion()))
    }

    /// Normalized Laplacian of the line expansion (M x M).
    pub fn line_laplacian(&self) -> Array2<f64> {
        laplacian_from_adjacency(&adjacency_matrix(&self.line_expansion()))
    }

    /// Normalized hypergraph Laplacian `I - Dv^-1/2 B De^-1 B^T Dv^-1/2` (N x N).
    pub fn hypergraph_laplacian(&self) -> Array2<f64> {
        hypergraph_laplacian_from_incidence(&self.incidence_matrix())
    }
}

/// Dense symmetric adjacency of an undirected weighted graph; parallel edges accumulate.
pub fn adjacency_matrix(graph: &UnGraph<usize, f64>) -> Array2<f64> {
    let n = graph.node_count();
    let mut a = Array2::zeros((n, n));
    for e in graph.edge_references() {
        let (s, t) = (e.source().index(), e.target().index());
        a[[s, t]] += *e.weight();
        if s != t {
            a[[t, s]] += *e.weight();
        }
    }
    a
}

/// Symmetric normalized Laplacian `I - D^-1/2 A D^-1/2`.
///
/// Vertices of degree zero get an all-zero row and column.
pub fn normalized_laplacian(adjacency: &Array2<f64>) -> HgResult<Array2<f64>> {
    if !adjacency.is_square() {
        return Err(HypergraphError::InvalidInput(format!(
            "adjacency must be square, got {:?}",
            adjacency.dim()
        )));
    }
    Ok(laplacian_from_adjacency(adjacency))
}

fn inv_sqrt_or_zero(d: f64) -> f64 {
    if d > 0.0 {
        1.0 / d.sqrt()
    } else {
        0.0
    }
}

fn laplacian_from_adjacency(adjacency: &Array2<f64>) -> Array2<f64> {
    let n = adjacency.nrows();
    let inv_sqrt: Vec<f64> = adjacency.rows().into_iter().map(|r| inv_sqrt_or_zero(r.sum())).collect();
    Array2::from_shape_fn((n, n), |(i, j)| {
        let identity = if i == j && inv_sqrt[i] > 0.0 { 1.0 } else { 0.0 };
        identity - inv_sqrt[i] * adjacency[[i, j]] * inv_sqrt[j]
    })
}

/// Normalized hypergraph Laplacian from an N x M incidence matrix (unit hyperedge weights).
///
/// Isolated nodes get zero rows; empty hyperedges are ignored.
pub fn hypergraph_laplacian_from_incidence(b: &Array2<f64>) -> Array2<f64> {
    let n = b.nrows();
    let dv: Vec<f64> = b.rows().into_iter().map(|r| inv_sqrt_or_zero(r.sum())).collect();
    let de: Vec<f64> = b
        .columns()
        .into_iter()
        .map(|c| {
            let d = c.sum();
            if d > 0.0 {
                1.0 / d
            } else {
                0.0
            }
        })
        .collect();

    // Theta = Dv^-1/2 B De^-1 B^T Dv^-1/2
    let mut scaled = b.clone();
    for ((v, e), x) in scaled.indexed_iter_mut() {
        *x *= dv[v] * de[e];
    }
    let mut theta = scaled.dot(&b.t());
    for ((_, j), x) in theta.indexed_iter_mut() {
        *x *= dv[j];
    }

    Array2::from_shape_fn((n, n), |(i, j)| {
        let identity = if i == j && dv[i] > 0.0 { 1.0 } else { 0.0 };
        identity - theta[[i, j]]
    })
}
