use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HypergraphError {
    /// A signal or matrix whose node dimension disagrees with the hypergraph.
    #[error("shape mismatch: expected {expected} nodes, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    /// A face of the simplicial dual whose member hyperedges share no node.
    #[error("empty intersection for face {face:?}")]
    EmptyFaceIntersection { face: Vec<usize> },
    /// An operator that cannot be normalized (e.g. spectral radius 0).
    #[error("degenerate operator: {0}")]
    DegenerateOperator(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type HgResult<T, E = HypergraphError> = core::result::Result<T, E>;

/// Fail fast when `found` rows do not match the `expected` node count.
pub(crate) fn check_nodes(expected: usize, found: usize) -> HgResult<()> {
    if expected != found {
        return Err(HypergraphError::ShapeMismatch { expected, found });
    }
    Ok(())
}
