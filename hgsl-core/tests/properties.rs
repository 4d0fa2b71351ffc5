//! Property-based tests for hypergraph operators.
//!
//! Checked for arbitrary small hypergraphs:
//! - Registry indices are dense and stable
//! - Incidence sums match hyperedge sizes and node degrees
//! - Energy is non-negative and vanishes on constant signals
//! - Expansion weights are symmetric co-occurrence / intersection counts
//! - Normalized Laplacian spectra lie in [0, 2]
//! - Multi-step diffusion equals repeated single steps

use std::collections::HashSet;

use hgsl_core::linalg::symmetric_eigenvalues;
use hgsl_core::{adjacency_matrix, diffuse, diffuse_final, EnergyLaplacian, Hypergraph, NodeRegistry};
use ndarray::{Array2, Axis};
use proptest::prelude::*;

/// Raw hyperedges over node ids 0..12, possibly with repeats.
fn arb_hyperedges() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..12, 1..6), 1..8)
}

fn arb_signal(n: usize, features: usize) -> impl Strategy<Value = Array2<f64>> {
    prop::collection::vec(-10.0f64..10.0, n * features).prop_map(move |v| {
        Array2::from_shape_vec((n, features), v).unwrap()
    })
}

fn hypergraph_and_signal() -> impl Strategy<Value = (Hypergraph<u8>, Array2<f64>)> {
    arb_hyperedges().prop_flat_map(|raw| {
        let hg = Hypergraph::new(raw);
        let n = hg.n();
        (Just(hg), arb_signal(n, 2))
    })
}

mod registry_props {
    use super::*;

    proptest! {
        #[test]
        fn indices_are_dense_and_idempotent(ids in prop::collection::vec(0u16..50, 0..40)) {
            let mut reg = NodeRegistry::new();
            let first: Vec<usize> = ids.iter().map(|&id| reg.map_node(id)).collect();
            let again: Vec<usize> = ids.iter().map(|&id| reg.map_node(id)).collect();
            prop_assert_eq!(&first, &again);

            let distinct: HashSet<u16> = ids.iter().copied().collect();
            prop_assert_eq!(reg.len(), distinct.len());
            prop_assert!(first.iter().all(|&i| i < distinct.len()));
        }
    }
}

mod structure_props {
    use super::*;

    proptest! {
        #[test]
        fn incidence_sums_match_sizes_and_degrees(raw in arb_hyperedges()) {
            let hg = Hypergraph::new(raw);
            let b = hg.incidence_matrix();
            prop_assert_eq!(b.dim(), (hg.n(), hg.m()));
            for (e, col) in b.columns().into_iter().enumerate() {
                prop_assert_eq!(col.sum() as usize, hg.hyperedges()[e].len());
            }
            let degrees = hg.node_degrees();
            for (v, row) in b.rows().into_iter().enumerate() {
                prop_assert_eq!(row.sum() as usize, degrees[v]);
            }
        }

        #[test]
        fn clique_weights_count_shared_hyperedges(raw in arb_hyperedges()) {
            let hg = Hypergraph::new(raw);
            let a = adjacency_matrix(&hg.clique_expansion());
            prop_assert_eq!(&a, &a.t().to_owned());
            for i in 0..hg.n() {
                prop_assert_eq!(a[[i, i]], 0.0);
                for j in 0..hg.n() {
                    if i == j {
                        continue;
                    }
                    let shared = hg
                        .hyperedges()
                        .iter()
                        .filter(|h| h.contains(&i) && h.contains(&j))
                        .count();
                    prop_assert_eq!(a[[i, j]], shared as f64);
                }
            }
        }

        #[test]
        fn line_weights_are_intersections(raw in arb_hyperedges()) {
            let hg = Hypergraph::new(raw);
            let a = adjacency_matrix(&hg.line_expansion());
            prop_assert_eq!(&a, &a.t().to_owned());
            let edges = hg.hyperedges();
            for p in 0..hg.m() {
                for q in 0..hg.m() {
                    if p == q {
                        continue;
                    }
                    let shared = edges[p].iter().filter(|v| edges[q].contains(v)).count();
                    prop_assert_eq!(a[[p, q]], shared as f64);
                }
            }
        }

        #[test]
        fn normalized_spectra_in_unit_band(raw in arb_hyperedges()) {
            let hg = Hypergraph::new(raw);
            for l in [hg.clique_laplacian(), hg.line_laplacian(), hg.hypergraph_laplacian()] {
                for ev in symmetric_eigenvalues(&l).unwrap() {
                    prop_assert!(ev > -1e-9 && ev < 2.0 + 1e-9, "eigenvalue {} out of [0, 2]", ev);
                }
            }
        }
    }
}

mod energy_props {
    use super::*;

    proptest! {
        #[test]
        fn energy_is_non_negative((hg, x) in hypergraph_and_signal()) {
            prop_assert!(hg.energy(&x).unwrap() >= 0.0);
        }

        #[test]
        fn constant_signal_has_zero_energy_and_gradient(
            raw in arb_hyperedges(),
            c in -5.0f64..5.0,
        ) {
            let hg = Hypergraph::new(raw);
            let x = Array2::from_elem((hg.n(), 3), c);
            prop_assert_eq!(hg.energy(&x).unwrap(), 0.0);
            prop_assert!(hg.laplacian(&x).unwrap().iter().all(|&v| v == 0.0));
        }

        #[test]
        fn k_steps_equal_repeated_single_steps((hg, x) in hypergraph_and_signal(), k in 0usize..6) {
            let op = EnergyLaplacian::new(&hg);
            let trace = diffuse(&op, &x, k).unwrap();
            prop_assert_eq!(trace.len_of(Axis(0)), k + 1);

            let mut state = x.clone();
            for t in 0..=k {
                let slice = trace.index_axis(Axis(0), t);
                for (a, b) in slice.iter().zip(state.iter()) {
                    prop_assert!((a - b).abs() < 1e-9);
                }
                state = diffuse_final(&op, &state, 1).unwrap();
            }
        }
    }
}
