//! Matrix artifacts consumed by the learning side.
//!
//! Positional order is part of the format:
//! - `GsoCollection`: `[0]` clique-expansion Laplacian (N x N), `[1]` line-expansion Laplacian (M x M)
//! - `IncidenceCollection`: `[0]` incidence matrix (N x M)

use std::path::{Path, PathBuf};

use hgsl_core::{hypergraph_laplacian_from_incidence, CsrMatrix, Hypergraph};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DataError, DataResult};
use crate::io::{load_json, save_json};

pub const CLIQUE_GSO: usize = 0;
pub const LINE_GSO: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GsoCollection {
    pub gsos: Vec<CsrMatrix>,
}

impl GsoCollection {
    pub fn from_hypergraph<K>(hypergraph: &Hypergraph<K>) -> Self {
        let gsos = vec![
            CsrMatrix::from_dense(&hypergraph.clique_laplacian()),
            CsrMatrix::from_dense(&hypergraph.line_laplacian()),
        ];
        debug!(nnz_clique = gsos[CLIQUE_GSO].nnz(), nnz_line = gsos[LINE_GSO].nnz(), "gsos built");
        Self { gsos }
    }

    pub fn get(&self, idx: usize) -> DataResult<&CsrMatrix> {
        self.gsos.get(idx).ok_or_else(|| {
            DataError::InvalidParams(format!("gso {} missing (collection has {})", idx, self.gsos.len()))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidenceCollection {
    pub incidence: Vec<CsrMatrix>,
}

impl IncidenceCollection {
    pub fn from_hypergraph<K>(hypergraph: &Hypergraph<K>) -> Self {
        Self { incidence: vec![CsrMatrix::from_dense(&hypergraph.incidence_matrix())] }
    }

    pub fn incidence(&self) -> DataResult<Array2<f64>> {
        self.incidence
            .first()
            .map(CsrMatrix::to_dense)
            .ok_or_else(|| DataError::InvalidParams("incidence collection is empty".into()))
    }

    /// Normalized hypergraph Laplacian rebuilt from the stored incidence matrix.
    pub fn hypergraph_laplacian(&self) -> DataResult<CsrMatrix> {
        Ok(CsrMatrix::from_dense(&hypergraph_laplacian_from_incidence(&self.incidence()?)))
    }
}

/// `<matrix_path>_gsos.json`
pub fn gso_path(matrix_path: &Path) -> PathBuf {
    suffixed(matrix_path, "_gsos.json")
}

/// `<matrix_path>_incidence.json`
pub fn incidence_path(matrix_path: &Path) -> PathBuf {
    suffixed(matrix_path, "_incidence.json")
}

fn suffixed(base: &Path, suffix: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

pub fn save_artifacts(
    matrix_path: &Path,
    gsos: &GsoCollection,
    incidence: &IncidenceCollection,
) -> DataResult<()> {
    save_json(&gso_path(matrix_path), gsos)?;
    save_json(&incidence_path(matrix_path), incidence)
}

pub fn load_artifacts(matrix_path: &Path) -> DataResult<(GsoCollection, IncidenceCollection)> {
    Ok((load_json(&gso_path(matrix_path))?, load_json(&incidence_path(matrix_path))?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hypergraph() -> Hypergraph<usize> {
        Hypergraph::new(vec![vec![0, 1, 2], vec![2, 3], vec![3, 4]])
    }

    #[test]
    fn gso_order_is_clique_then_line() {
        let hg = hypergraph();
        let gsos = GsoCollection::from_hypergraph(&hg);
        assert_eq!(gsos.gsos.len(), 2);
        assert_eq!(gsos.get(CLIQUE_GSO).unwrap().shape(), (5, 5));
        assert_eq!(gsos.get(LINE_GSO).unwrap().shape(), (3, 3));
        assert_eq!(gsos.get(CLIQUE_GSO).unwrap().to_dense(), hg.clique_laplacian());
        assert!(gsos.get(2).is_err());
    }

    #[test]
    fn incidence_round_trips_through_csr() {
        let hg = hypergraph();
        let inc = IncidenceCollection::from_hypergraph(&hg);
        assert_eq!(inc.incidence().unwrap(), hg.incidence_matrix());
        assert_eq!(inc.hypergraph_laplacian().unwrap().to_dense(), hg.hypergraph_laplacian());
        assert!(IncidenceCollection { incidence: vec![] }.incidence().is_err());
    }

    #[test]
    fn malformed_csr_json_is_rejected() {
        let short_row_ptr = r#"{"incidence":[{"rows":2,"cols":2,"row_ptr":[0],"col_idx":[],"values":[]}]}"#;
        assert!(serde_json::from_str::<IncidenceCollection>(short_row_ptr).is_err());

        let bad_column = r#"{"gsos":[{"rows":2,"cols":2,"row_ptr":[0,1,2],"col_idx":[0,7],"values":[1.0,1.0]}]}"#;
        assert!(serde_json::from_str::<GsoCollection>(bad_column).is_err());

        let good = r#"{"gsos":[{"rows":2,"cols":2,"row_ptr":[0,1,2],"col_idx":[0,1],"values":[1.0,1.0]}]}"#;
        let gsos: GsoCollection = serde_json::from_str(good).unwrap();
        assert_eq!(gsos.get(CLIQUE_GSO).unwrap().nnz(), 2);
    }

    #[test]
    fn files_use_matrix_path_prefix() {
        let base = std::env::temp_dir().join(format!("hgsl-art-{}", std::process::id())).join("sourceLoc");
        assert_eq!(gso_path(&base).file_name().unwrap(), "sourceLoc_gsos.json");
        assert_eq!(incidence_path(&base).file_name().unwrap(), "sourceLoc_incidence.json");

        let hg = hypergraph();
        let gsos = GsoCollection::from_hypergraph(&hg);
        let inc = IncidenceCollection::from_hypergraph(&hg);
        save_artifacts(&base, &gsos, &inc).unwrap();
        let (g2, i2) = load_artifacts(&base).unwrap();
        assert_eq!(i2, inc);
        assert_eq!(g2.gsos.len(), 2);
        assert_eq!(g2.gsos[LINE_GSO].col_idx, gsos.gsos[LINE_GSO].col_idx);
        if let Some(dir) = base.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }
}
