//! Discrete-time diffusion of node signals.
//!
//! A [`DiffusionOperator`] maps x(t) to x(t+1). Three operators are provided:
//! - [`EnergyLaplacian`]: `x - L(x)` with the nonlinear energy Laplacian
//! - [`LaplacianMatrix`]: `x - L x` for a fixed (normalized) Laplacian matrix
//! - [`ShiftMatrix`]: `S x` for a linear graph-shift operator
//!
//! Trajectories keep the initial condition: a k-step run returns k + 1 slices indexed
//! (time, node, feature), slice t being x(t).
//!
//! Stability is the caller's job: a shift operator with spectral radius above 1 diverges and
//! is never clamped. [`ShiftMatrix::co_membership`] builds an operator normalized to radius 1.

use ndarray::{Array2, Array3, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, warn};

use crate::energy::laplacian_of;
use crate::error::{check_nodes, HgResult, HypergraphError};
use crate::expansion::adjacency_matrix;
use crate::hypergraph::Hypergraph;
use crate::linalg::{is_symmetric, spectral_radius};
use crate::sparse::CsrMatrix;

pub trait DiffusionOperator {
    /// Number of nodes the operator acts on.
    fn nodes(&self) -> usize;

    /// One diffusion step x(t) -> x(t+1).
    fn step(&self, x: &Array2<f64>) -> HgResult<Array2<f64>>;
}

impl<O: DiffusionOperator + ?Sized> DiffusionOperator for Box<O> {
    fn nodes(&self) -> usize {
        (**self).nodes()
    }

    fn step(&self, x: &Array2<f64>) -> HgResult<Array2<f64>> {
        (**self).step(x)
    }
}

/// `x - L(x)` with the energy Laplacian of a hypergraph.
#[derive(Debug, Clone)]
pub struct EnergyLaplacian {
    nodes: usize,
    hyperedges: Vec<Vec<usize>>,
}

impl EnergyLaplacian {
    pub fn new<K>(hypergraph: &Hypergraph<K>) -> Self {
        Self {
            nodes: hypergraph.n(),
            hyperedges: hypergraph.hyperedges().to_vec(),
        }
    }
}

impl DiffusionOperator for EnergyLaplacian {
    fn nodes(&self) -> usize {
        self.nodes
    }

    fn step(&self, x: &Array2<f64>) -> HgResult<Array2<f64>> {
        check_nodes(self.nodes, x.nrows())?;
        Ok(x - &laplacian_of(&self.hyperedges, x))
    }
}

fn check_square(m: &Array2<f64>) -> HgResult<()> {
    if !m.is_square() {
        return Err(HypergraphError::InvalidInput(format!(
            "operator must be square, got {:?}",
            m.dim()
        )));
    }
    Ok(())
}

/// `x - L x` for a fixed Laplacian matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct LaplacianMatrix {
    matrix: Array2<f64>,
}

impl LaplacianMatrix {
    pub fn new(matrix: Array2<f64>) -> HgResult<Self> {
        check_square(&matrix)?;
        Ok(Self { matrix })
    }

    /// Normalized clique-expansion Laplacian of `hypergraph`.
    pub fn clique<K>(hypergraph: &Hypergraph<K>) -> Self {
        Self { matrix: hypergraph.clique_laplacian() }
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }
}

impl DiffusionOperator for LaplacianMatrix {
    fn nodes(&self) -> usize {
        self.matrix.nrows()
    }

    fn step(&self, x: &Array2<f64>) -> HgResult<Array2<f64>> {
        check_nodes(self.nodes(), x.nrows())?;
        Ok(x - &self.matrix.dot(x))
    }
}

/// `S x` for a linear graph-shift operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftMatrix {
    matrix: Array2<f64>,
}

impl ShiftMatrix {
    /// Wraps `matrix` as is. Symmetric operators with spectral radius above 1 are logged.
    pub fn new(matrix: Array2<f64>) -> HgResult<Self> {
        check_square(&matrix)?;
        if is_symmetric(&matrix, 1e-12) {
            let radius = spectral_radius(&matrix)?;
            if radius > 1.0 + 1e-9 {
                warn!(radius, "shift operator is not normalized; diffusion may diverge");
            }
        }
        Ok(Self { matrix })
    }

    pub fn from_csr(csr: &CsrMatrix) -> HgResult<Self> {
        Self::new(csr.to_dense())
    }

    /// Co-membership counts (clique-expansion adjacency) divided by their spectral radius.
    pub fn co_membership<K>(hypergraph: &Hypergraph<K>) -> HgResult<Self> {
        let counts = adjacency_matrix(&hypergraph.clique_expansion());
        Self::normalized(counts)
    }

    /// Divides a symmetric matrix by its largest-magnitude eigenvalue.
    pub fn normalized(matrix: Array2<f64>) -> HgResult<Self> {
        check_square(&matrix)?;
        if !is_symmetric(&matrix, 1e-12) {
            return Err(HypergraphError::InvalidInput(
                "only symmetric shift operators can be normalized".to_string(),
            ));
        }
        let radius = spectral_radius(&matrix)?;
        if radius <= f64::EPSILON {
            return Err(HypergraphError::DegenerateOperator("spectral radius is zero"));
        }
        debug!(radius, "normalizing shift operator");
        Ok(Self { matrix: matrix / radius })
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn to_csr(&self) -> CsrMatrix {
        CsrMatrix::from_dense(&self.matrix)
    }
}

impl DiffusionOperator for ShiftMatrix {
    fn nodes(&self) -> usize {
        self.matrix.nrows()
    }

    fn step(&self, x: &Array2<f64>) -> HgResult<Array2<f64>> {
        check_nodes(self.nodes(), x.nrows())?;
        Ok(self.matrix.dot(x))
    }
}

/// Additive i.i.d. Gaussian noise injected after every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessNoise {
    pub std_dev: f64,
}

impl ProcessNoise {
    /// Noise with the given variance; negative or non-finite variances are rejected.
    pub fn from_variance(variance: f64) -> HgResult<Self> {
        if !variance.is_finite() || variance < 0.0 {
            return Err(HypergraphError::InvalidInput(format!(
                "process noise variance must be finite and non-negative, got {}",
                variance
            )));
        }
        Ok(Self { std_dev: variance.sqrt() })
    }

    pub(crate) fn distribution(&self) -> HgResult<Normal<f64>> {
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(HypergraphError::InvalidInput(format!(
                "process noise std_dev must be finite and non-negative, got {}",
                self.std_dev
            )));
        }
        Normal::new(0.0, self.std_dev)
            .map_err(|e| HypergraphError::InvalidInput(format!("process noise: {}", e)))
    }
}

fn run<O, F>(op: &O, x0: &Array2<f64>, k: usize, mut after_step: F) -> HgResult<Array3<f64>>
where
    O: DiffusionOperator + ?Sized,
    F: FnMut(&mut Array2<f64>),
{
    check_nodes(op.nodes(), x0.nrows())?;
    let mut trace = Array3::zeros((k + 1, x0.nrows(), x0.ncols()));
    trace.index_axis_mut(Axis(0), 0).assign(x0);

    let mut x = x0.clone();
    for t in 1..=k {
        x = op.step(&x)?;
        after_step(&mut x);
        trace.index_axis_mut(Axis(0), t).assign(&x);
    }
    Ok(trace)
}

/// Full trajectory x(0), ..., x(k) as a (k + 1) x N x F array.
pub fn diffuse<O>(op: &O, x0: &Array2<f64>, k: usize) -> HgResult<Array3<f64>>
where
    O: DiffusionOperator + ?Sized,
{
    run(op, x0, k, |_| {})
}

/// Trajectory with process noise added after each step.
pub fn diffuse_with_noise<O, R>(
    op: &O,
    x0: &Array2<f64>,
    k: usize,
    noise: ProcessNoise,
    rng: &mut R,
) -> HgResult<Array3<f64>>
where
    O: DiffusionOperator + ?Sized,
    R: Rng + ?Sized,
{
    let normal = noise.distribution()?;
    run(op, x0, k, |x| x.mapv_inplace(|v| v + normal.sample(&mut *rng)))
}

/// Only x(k); `k = 0` returns `x0`.
pub fn diffuse_final<O>(op: &O, x0: &Array2<f64>, k: usize) -> HgResult<Array2<f64>>
where
    O: DiffusionOperator + ?Sized,
{
    check_nodes(op.nodes(), x0.nrows())?;
    let mut x = x0.clone();
    for _ in 0..k {
        x = op.step(&x)?;
    }
    Ok(x)
}

impl<K> Hypergraph<K> {
    /// Energy-Laplacian diffusion of `x0` for `k` steps (k + 1 slices, x(0) included).
    pub fn diffuse(&self, x0: &Array2<f64>, k: usize) -> HgResult<Array3<f64>> {
        diffuse(&EnergyLaplacian::new(self), x0, k)
    }
}
