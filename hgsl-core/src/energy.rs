//! Pairwise-max hypergraph energy and its Laplacian (half the energy gradient).
//!
//! For a signal `x` (N x F) the energy is
//!
//! ```text
//! E(x) = sum_e  max_{i,j in e, f} (x[i,f] - x[j,f])^2 / |e|
//! ```
//!
//! Hyperedges with fewer than two members contribute nothing. The Laplacian is `0.5 * grad E`,
//! computed analytically: the gradient of each max term flows only to its maximizing entries,
//! split evenly when several (i, j, f) tie. This is the subgradient an automatic
//! differentiator assigns to `max`.

use ndarray::Array2;

use crate::error::{check_nodes, HgResult};
use crate::hypergraph::Hypergraph;

/// Largest squared difference inside one hyperedge, over all member pairs and feature columns.
fn max_sq_diff(hedge: &[usize], x: &Array2<f64>) -> f64 {
    let mut best = 0.0f64;
    for (a, &i) in hedge.iter().enumerate() {
        for &j in &hedge[a + 1..] {
            for f in 0..x.ncols() {
                let d = x[[i, f]] - x[[j, f]];
                best = best.max(d * d);
            }
        }
    }
    best
}

pub(crate) fn energy_of(hyperedges: &[Vec<usize>], x: &Array2<f64>) -> f64 {
    hyperedges
        .iter()
        .filter(|h| h.len() >= 2)
        .map(|h| max_sq_diff(h, x) / h.len() as f64)
        .sum()
}

pub(crate) fn laplacian_of(hyperedges: &[Vec<usize>], x: &Array2<f64>) -> Array2<f64> {
    let mut out = Array2::zeros(x.raw_dim());
    // (i, j, f) with i < j achieving the max of one hyperedge
    let mut argmax: Vec<(usize, usize, usize)> = Vec::new();

    for hedge in hyperedges.iter().filter(|h| h.len() >= 2) {
        let best = max_sq_diff(hedge, x);
        if best == 0.0 {
            // Constant on the hyperedge: every candidate has zero gradient.
            continue;
        }

        argmax.clear();
        for (a, &i) in hedge.iter().enumerate() {
            for &j in &hedge[a + 1..] {
                for f in 0..x.ncols() {
                    let d = x[[i, f]] - x[[j, f]];
                    if d * d == best {
                        argmax.push((i, j, f));
                    }
                }
            }
        }

        // d/dx_i of (x_i - x_j)^2 / |e| is 2 (x_i - x_j) / |e|; halved for the Laplacian.
        let scale = 1.0 / (hedge.len() as f64 * argmax.len() as f64);
        for &(i, j, f) in &argmax {
            let d = x[[i, f]] - x[[j, f]];
            out[[i, f]] += d * scale;
            out[[j, f]] -= d * scale;
        }
    }
    out
}

impl<K> Hypergraph<K> {
    /// Energy of `x`; zero iff `x` is constant on every hyperedge with two or more members.
    pub fn energy(&self, x: &Array2<f64>) -> HgResult<f64> {
        check_nodes(self.n(), x.nrows())?;
        Ok(energy_of(self.hyperedges(), x))
    }

    /// Laplacian operator `L(x) = 0.5 * grad E(x)`.
    pub fn laplacian(&self, x: &Array2<f64>) -> HgResult<Array2<f64>> {
        check_nodes(self.n(), x.nrows())?;
        Ok(laplacian_of(self.hyperedges(), x))
    }
}
