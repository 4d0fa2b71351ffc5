//! Diffusion runtime: owns an operator and the current signal, and advances one tick at a time.

use ndarray::Array2;

use crate::diffusion::DiffusionOperator;
use crate::error::{check_nodes, HgResult};

pub struct DiffusionRuntime<O> {
    operator: O,
    initial: Array2<f64>,
    state: Array2<f64>,
    pub tick: u64,
}

impl<O: DiffusionOperator> DiffusionRuntime<O> {
    pub fn new(operator: O, x0: Array2<f64>) -> HgResult<Self> {
        check_nodes(operator.nodes(), x0.nrows())?;
        Ok(Self {
            operator,
            state: x0.clone(),
            initial: x0,
            tick: 0,
        })
    }

    /// Advance one tick and return the new state x(tick).
    pub fn step_once(&mut self) -> HgResult<&Array2<f64>> {
        self.state = self.operator.step(&self.state)?;
        self.tick = self.tick.saturating_add(1);
        Ok(&self.state)
    }

    /// Run until the given tick (inclusive).
    pub fn run_until(&mut self, until: u64) -> HgResult<()> {
        while self.tick < until {
            self.step_once()?;
        }
        Ok(())
    }

    /// Convenience: run a fixed number of ticks.
    pub fn run_ticks(&mut self, ticks: u64) -> HgResult<()> {
        let until = self.tick.saturating_add(ticks);
        self.run_until(until)
    }

    /// Back to x(0), tick 0.
    pub fn reset(&mut self) {
        self.state = self.initial.clone();
        self.tick = 0;
    }

    pub fn state(&self) -> &Array2<f64> {
        &self.state
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffusion::{diffuse_final, EnergyLaplacian};
    use crate::hypergraph::{column_signal, Hypergraph};

    #[test]
    fn ticks_match_batch_diffusion() {
        let hg = Hypergraph::new(vec![vec![0, 1, 2], vec![2, 3]]);
        let x0 = column_signal([3.0, 0.0, 1.0, -2.0]);
        let mut rt = DiffusionRuntime::new(EnergyLaplacian::new(&hg), x0.clone()).unwrap();

        rt.run_ticks(3).unwrap();
        assert_eq!(rt.tick, 3);
        let expected = diffuse_final(rt.operator(), &x0, 3).unwrap();
        assert_eq!(rt.state(), &expected);

        rt.run_until(2).unwrap();
        assert_eq!(rt.tick, 3);

        rt.reset();
        assert_eq!(rt.tick, 0);
        assert_eq!(rt.state(), &x0);
    }

    #[test]
    fn rejects_mismatched_initial_state() {
        let hg = Hypergraph::new(vec![vec![0, 1]]);
        assert!(DiffusionRuntime::new(EnergyLaplacian::new(&hg), column_signal([1.0])).is_err());
    }
}
