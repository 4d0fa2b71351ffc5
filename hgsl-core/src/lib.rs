//! hgsl-core: hypergraph operators and diffusion for source-localization data
//!
//! - Node registry and hypergraph construction (canonical, first-seen node indices)
//! - Pairwise-max energy and its analytic Laplacian
//! - Clique / line expansions, incidence matrix, normalized Laplacians
//! - Simplicial dual built from maximal cliques of the hyperedge intersection graph
//! - Diffusion with pluggable step operators, optional process noise, and a tick runtime

pub mod diffusion;
pub mod energy;
pub mod error;
pub mod expansion;
pub mod hypergraph;
pub mod linalg;
pub mod registry;
pub mod runtime;
pub mod simplicial;
pub mod sparse;

// Re-exports
pub use diffusion::{
    diffuse, diffuse_final, diffuse_with_noise, DiffusionOperator, EnergyLaplacian,
    LaplacianMatrix, ProcessNoise, ShiftMatrix,
};
pub use error::{HgResult, HypergraphError};
pub use expansion::{adjacency_matrix, hypergraph_laplacian_from_incidence, normalized_laplacian};
pub use hypergraph::{column_signal, Hypergraph};
pub use registry::NodeRegistry;
pub use runtime::DiffusionRuntime;
pub use simplicial::{maximal_cliques, SimplicialComplex};
pub use sparse::{CsrMatrix, CsrParts};
