//! Minimal CSR (Compressed Sparse Row) matrix for graph-shift operators and their exports.

use ndarray::Array2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{HgResult, HypergraphError};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "CsrParts"))]
pub struct CsrMatrix {
    pub rows: usize,
    pub cols: usize,
    pub row_ptr: Vec<usize>,
    pub col_idx: Vec<usize>,
    pub values: Vec<f64>,
}

/// Unchecked wire form; deserialized matrices go through [`CsrMatrix::new`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct CsrParts {
    pub rows: usize,
    pub cols: usize,
    pub row_ptr: Vec<usize>,
    pub col_idx: Vec<usize>,
    pub values: Vec<f64>,
}

impl TryFrom<CsrParts> for CsrMatrix {
    type Error = HypergraphError;

    fn try_from(p: CsrParts) -> HgResult<Self> {
        Self::new(p.rows, p.cols, p.row_ptr, p.col_idx, p.values)
    }
}

impl CsrMatrix {
    pub fn new(
        rows: usize,
        cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<f64>,
    ) -> HgResult<Self> {
        if row_ptr.len() != rows + 1 {
            return Err(HypergraphError::InvalidInput(format!(
                "row_ptr has {} entries for {} rows",
                row_ptr.len(),
                rows
            )));
        }
        if col_idx.len() != values.len() || row_ptr.last() != Some(&values.len()) {
            return Err(HypergraphError::InvalidInput(
                "col_idx/values length disagrees with row_ptr".into(),
            ));
        }
        if row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(HypergraphError::InvalidInput("row_ptr is not monotone".into()));
        }
        if col_idx.iter().any(|&c| c >= cols) {
            return Err(HypergraphError::InvalidInput("column index out of range".into()));
        }
        Ok(Self { rows, cols, row_ptr, col_idx, values })
    }

    /// Keeps every non-zero entry of `a`, row by row.
    pub fn from_dense(a: &Array2<f64>) -> Self {
        let (rows, cols) = a.dim();
        let mut row_ptr = Vec::with_capacity(rows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for row in a.rows() {
            for (c, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    col_idx.push(c);
                    values.push(v);
                }
            }
            row_ptr.push(values.len());
        }
        Self { rows, cols, row_ptr, col_idx, values }
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let mut a = Array2::zeros((self.rows, self.cols));
        for r in 0..self.rows {
            for k in self.row_ptr[r]..self.row_ptr[r + 1] {
                a[[r, self.col_idx[k]]] += self.values[k];
            }
        }
        a
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// y = A * x
    pub fn mul_vector(&self, x: &[f64]) -> HgResult<Vec<f64>> {
        if x.len() != self.cols {
            return Err(HypergraphError::ShapeMismatch { expected: self.cols, found: x.len() });
        }
        let mut result = vec![0.0; self.rows];
        for (r, out) in result.iter_mut().enumerate() {
            let mut acc = 0.0;
            for k in self.row_ptr[r]..self.row_ptr[r + 1] {
                acc += self.values[k] * x[self.col_idx[k]];
            }
            *out = acc;
        }
        Ok(result)
    }

    /// Y = A * X for a dense right-hand side with one column per feature.
    pub fn mul_dense(&self, x: &Array2<f64>) -> HgResult<Array2<f64>> {
        if x.nrows() != self.cols {
            return Err(HypergraphError::ShapeMismatch { expected: self.cols, found: x.nrows() });
        }
        let mut y = Array2::zeros((self.rows, x.ncols()));
        for r in 0..self.rows {
            for k in self.row_ptr[r]..self.row_ptr[r + 1] {
                let v = self.values[k];
                let src = x.row(self.col_idx[k]);
                y.row_mut(r).zip_mut_with(&src, |out, &s| *out += v * s);
            }
        }
        Ok(y)
    }
}
