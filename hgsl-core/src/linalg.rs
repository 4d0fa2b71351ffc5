//! Small dense linear-algebra helpers bridging `ndarray` matrices to `nalgebra` eigen solvers.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;

use crate::error::{HgResult, HypergraphError};

pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

pub fn is_symmetric(a: &Array2<f64>, tol: f64) -> bool {
    if !a.is_square() {
        return false;
    }
    let n = a.nrows();
    (0..n).all(|i| (i + 1..n).all(|j| (a[[i, j]] - a[[j, i]]).abs() <= tol))
}

/// Eigenvalues of a symmetric matrix, ascending.
pub fn symmetric_eigenvalues(a: &Array2<f64>) -> HgResult<Vec<f64>> {
    if !a.is_square() {
        return Err(HypergraphError::InvalidInput(format!(
            "eigenvalues need a square matrix, got {:?}",
            a.dim()
        )));
    }
    if a.nrows() == 0 {
        return Ok(Vec::new());
    }
    let eigen = SymmetricEigen::new(to_dmatrix(a));
    let mut values: Vec<f64> = eigen.eigenvalues.iter().copied().collect();
    values.sort_by(|x, y| x.total_cmp(y));
    Ok(values)
}

/// Largest eigenvalue magnitude of a symmetric matrix.
pub fn spectral_radius(a: &Array2<f64>) -> HgResult<f64> {
    Ok(symmetric_eigenvalues(a)?
        .into_iter()
        .fold(0.0f64, |acc, v| acc.max(v.abs())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn eigenvalues_of_path_adjacency() {
        let a = array![[0.0, 1.0, 0.0], [1.0, 0.0, 1.0], [0.0, 1.0, 0.0]];
        let ev = symmetric_eigenvalues(&a).unwrap();
        let s = 2f64.sqrt();
        assert_abs_diff_eq!(ev[0], -s, epsilon = 1e-10);
        assert_abs_diff_eq!(ev[1], 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(ev[2], s, epsilon = 1e-10);
        assert_abs_diff_eq!(spectral_radius(&a).unwrap(), s, epsilon = 1e-10);
    }

    #[test]
    fn symmetry_and_shape_checks() {
        assert!(is_symmetric(&array![[1.0, 2.0], [2.0, 1.0]], 0.0));
        assert!(!is_symmetric(&array![[1.0, 2.0], [0.0, 1.0]], 1e-9));
        assert!(symmetric_eigenvalues(&Array2::zeros((2, 3))).is_err());
        assert!(symmetric_eigenvalues(&Array2::zeros((0, 0))).unwrap().is_empty());
    }
}
