// Backend abstraction for the TUI so different diffusion operators can drive the raster.

use anyhow::{Context, Result};
use clap::ValueEnum;
use hgsl_core::{DiffusionOperator, DiffusionRuntime, EnergyLaplacian, Hypergraph, LaplacianMatrix, ShiftMatrix};

/// Common interface for anything that produces one node signal per tick.
pub trait DiffusionBackend {
    /// Advance by one tick and return the node values (first feature) after the step.
    fn step(&mut self) -> Result<Vec<f64>>;
    /// Node values at the current tick.
    fn values(&self) -> Vec<f64>;
    /// Number of nodes (rows in the raster).
    fn nodes(&self) -> usize;
    fn tick(&self) -> u64;
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OperatorKind {
    /// x - L(x) with the energy Laplacian
    Energy,
    /// x - L x with the normalized clique-expansion Laplacian
    Clique,
    /// S x with the co-membership operator normalized to spectral radius 1
    Gso,
}

impl OperatorKind {
    pub fn label(self) -> &'static str {
        match self {
            OperatorKind::Energy => "energy Laplacian",
            OperatorKind::Clique => "clique Laplacian",
            OperatorKind::Gso => "co-membership GSO",
        }
    }

    fn build<K>(self, hg: &Hypergraph<K>) -> Result<Box<dyn DiffusionOperator>> {
        Ok(match self {
            OperatorKind::Energy => Box::new(EnergyLaplacian::new(hg)),
            OperatorKind::Clique => Box::new(LaplacianMatrix::clique(hg)),
            OperatorKind::Gso => Box::new(ShiftMatrix::co_membership(hg).context("building GSO")?),
        })
    }
}

/// Backend over hgsl-core's runtime, started from the indicator of one hyperedge.
pub struct RuntimeBackend {
    runtime: DiffusionRuntime<Box<dyn DiffusionOperator>>,
}

impl RuntimeBackend {
    pub fn new<K>(hg: &Hypergraph<K>, source: usize, kind: OperatorKind) -> Result<Self> {
        let x0 = hg
            .indicator(source)
            .with_context(|| format!("source hyperedge {}", source))?;
        let runtime = DiffusionRuntime::new(kind.build(hg)?, x0)?;
        Ok(Self { runtime })
    }
}

impl DiffusionBackend for RuntimeBackend {
    fn step(&mut self) -> Result<Vec<f64>> {
        let x = self.runtime.step_once()?;
        Ok(x.column(0).to_vec())
    }

    fn values(&self) -> Vec<f64> {
        self.runtime.state().column(0).to_vec()
    }

    fn nodes(&self) -> usize {
        self.runtime.state().nrows()
    }

    fn tick(&self) -> u64 {
        self.runtime.tick
    }

    fn reset(&mut self) {
        self.runtime.reset();
    }
}
