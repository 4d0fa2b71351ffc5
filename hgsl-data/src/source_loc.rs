//! Source-localization dataset: which hyperedge started the diffusion?
//!
//! Every candidate source hyperedge is diffused once from its indicator signal. A sample picks a
//! source and a time in `1..t_max`, reads that slice of the trajectory and adds measurement
//! noise. Labels are positions in `source_edges`, so classes are `0..k`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hgsl_core::{diffuse, DiffusionOperator, EnergyLaplacian, Hypergraph, ShiftMatrix};
use ndarray::{s, Array2, Array3, Axis};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, DataError, DataResult};
use crate::io::{load_json, save_json};
use crate::metrics::{argmax_rows, f1_score, Average};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Valid,
    Test,
}

/// Operator used to diffuse the source indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOperator {
    /// `x - L(x)` with the energy Laplacian.
    #[default]
    Energy,
    /// Co-membership shift operator normalized to spectral radius 1.
    Gso,
}

impl SourceOperator {
    pub fn build<K>(self, hypergraph: &Hypergraph<K>) -> DataResult<Box<dyn DiffusionOperator>> {
        Ok(match self {
            SourceOperator::Energy => Box::new(EnergyLaplacian::new(hypergraph)),
            SourceOperator::Gso => Box::new(ShiftMatrix::co_membership(hypergraph)?),
        })
    }
}

impl FromStr for SourceOperator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "energy" => Ok(SourceOperator::Energy),
            "gso" => Ok(SourceOperator::Gso),
            other => Err(ConfigError::NotAvailable { what: "diffusion operator", tag: other.into() }),
        }
    }
}

impl fmt::Display for SourceOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceOperator::Energy => "energy",
            SourceOperator::Gso => "gso",
        })
    }
}

/// Gaussian noise N(mean, variance) added per node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub mean: f64,
    pub variance: f64,
}

impl NoiseParams {
    fn distribution(&self) -> DataResult<Normal<f64>> {
        if !(self.variance >= 0.0 && self.variance.is_finite() && self.mean.is_finite()) {
            return Err(DataError::InvalidParams(format!(
                "noise needs a finite mean and variance >= 0, got N({}, {})",
                self.mean, self.variance
            )));
        }
        Normal::new(self.mean, self.variance.sqrt())
            .map_err(|e| DataError::InvalidParams(format!("noise: {}", e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLocParams {
    pub n_train: usize,
    pub n_valid: usize,
    pub n_test: usize,
    /// Candidate source hyperedges (indices into the hypergraph's hyperedge list).
    pub source_edges: Vec<usize>,
    /// Longest diffusion time; defaults to the node count.
    #[serde(default)]
    pub t_max: Option<usize>,
    #[serde(default)]
    pub noise: Option<NoiseParams>,
    #[serde(default)]
    pub operator: SourceOperator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredSourceLocalization")]
pub struct SourceLocalization {
    n_train: usize,
    n_valid: usize,
    n_test: usize,
    source_edges: Vec<usize>,
    t_max: usize,
    /// One row per sample (train, then valid, then test), one column per node.
    signals: Array2<f64>,
    labels: Vec<usize>,
}

/// Unchecked on-disk form; converted through [`SourceLocalization::check_layout`].
#[derive(Deserialize)]
struct StoredSourceLocalization {
    n_train: usize,
    n_valid: usize,
    n_test: usize,
    source_edges: Vec<usize>,
    t_max: usize,
    signals: Array2<f64>,
    labels: Vec<usize>,
}

impl TryFrom<StoredSourceLocalization> for SourceLocalization {
    type Error = DataError;

    fn try_from(s: StoredSourceLocalization) -> DataResult<Self> {
        let data = Self {
            n_train: s.n_train,
            n_valid: s.n_valid,
            n_test: s.n_test,
            source_edges: s.source_edges,
            t_max: s.t_max,
            signals: s.signals,
            labels: s.labels,
        };
        data.check_layout()?;
        Ok(data)
    }
}

/// `<data_path stem>_fold<k>.json`, next to `data_path`.
pub fn fold_path(data_path: &Path, fold: usize) -> PathBuf {
    let stem = data_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    data_path.with_file_name(format!("{}_fold{}.json", stem, fold))
}

impl SourceLocalization {
    pub fn generate<K, R>(
        hypergraph: &Hypergraph<K>,
        params: &SourceLocParams,
        rng: &mut R,
    ) -> DataResult<Self>
    where
        R: Rng + ?Sized,
    {
        let n = hypergraph.n();
        let t_max = params.t_max.unwrap_or(n);
        if t_max < 2 {
            return Err(DataError::InvalidParams(format!("t_max must be at least 2, got {}", t_max)));
        }
        if params.source_edges.is_empty() {
            return Err(DataError::InvalidParams("no source hyperedges given".into()));
        }
        if let Some(&bad) = params.source_edges.iter().find(|&&e| e >= hypergraph.m()) {
            return Err(DataError::InvalidParams(format!(
                "source hyperedge {} out of range (M = {})",
                bad,
                hypergraph.m()
            )));
        }
        let noise = params.noise.map(|p| p.distribution()).transpose()?;

        let operator = params.operator.build(hypergraph)?;
        let mut trajectories: Vec<Array3<f64>> = Vec::with_capacity(params.source_edges.len());
        for &edge in &params.source_edges {
            let mut x0 = hypergraph.indicator(edge)?;
            if let Some(normal) = &noise {
                x0.mapv_inplace(|v| v + normal.sample(&mut *rng));
            }
            trajectories.push(diffuse(&operator, &x0, t_max)?);
        }
        debug!(sources = trajectories.len(), t_max, operator = %params.operator, "sources diffused");

        let n_total = params.n_train + params.n_valid + params.n_test;
        let mut signals = Array2::zeros((n_total, n));
        let mut labels = Vec::with_capacity(n_total);
        for mut row in signals.axis_iter_mut(Axis(0)) {
            let label = rng.gen_range(0..params.source_edges.len());
            let time = rng.gen_range(1..t_max);
            row.assign(&trajectories[label].slice(s![time, .., 0]));
            if let Some(normal) = &noise {
                row.mapv_inplace(|v| v + normal.sample(&mut *rng));
            }
            labels.push(label);
        }

        info!(
            train = params.n_train,
            valid = params.n_valid,
            test = params.n_test,
            classes = params.source_edges.len(),
            "source localization data generated"
        );
        Ok(Self {
            n_train: params.n_train,
            n_valid: params.n_valid,
            n_test: params.n_test,
            source_edges: params.source_edges.clone(),
            t_max,
            signals,
            labels,
        })
    }

    /// Split sizes must cover every sample exactly and labels must name a source.
    fn check_layout(&self) -> DataResult<()> {
        let n_total = self.n_train + self.n_valid + self.n_test;
        if n_total != self.labels.len() || n_total != self.signals.nrows() {
            return Err(DataError::InvalidParams(format!(
                "split sizes {}+{}+{} disagree with {} labels and {} signal rows",
                self.n_train,
                self.n_valid,
                self.n_test,
                self.labels.len(),
                self.signals.nrows()
            )));
        }
        if let Some(&bad) = self.labels.iter().find(|&&l| l >= self.source_edges.len()) {
            return Err(DataError::InvalidParams(format!(
                "label {} out of range for {} sources",
                bad,
                self.source_edges.len()
            )));
        }
        Ok(())
    }

    fn range(&self, split: Split) -> std::ops::Range<usize> {
        let valid_start = self.n_train;
        let test_start = valid_start + self.n_valid;
        match split {
            Split::Train => 0..valid_start,
            Split::Valid => valid_start..test_start,
            Split::Test => test_start..test_start + self.n_test,
        }
    }

    /// Signals shaped `[n, 1, N]` (one feature) and their labels.
    pub fn samples(&self, split: Split) -> (Array3<f64>, Vec<usize>) {
        let range = self.range(split);
        let rows = self.signals.slice(s![range.clone(), ..]).to_owned();
        let signals = rows.insert_axis(Axis(1));
        (signals, self.labels[range].to_vec())
    }

    /// Re-permutes all samples across the splits; split sizes stay the same.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.labels.len()).collect();
        order.shuffle(rng);
        self.signals = self.signals.select(Axis(0), &order);
        self.labels = order.iter().map(|&i| self.labels[i]).collect();
    }

    /// Weighted F1 of logits (`[n, classes]`) against true labels.
    pub fn evaluate(&self, logits: &Array2<f64>, labels: &[usize]) -> DataResult<f64> {
        if logits.nrows() != labels.len() {
            return Err(DataError::InvalidParams(format!(
                "{} logit rows for {} labels",
                logits.nrows(),
                labels.len()
            )));
        }
        Ok(f1_score(labels, &argmax_rows(logits), self.n_classes(), Average::Weighted))
    }

    /// Scales every sample by its largest magnitude so it peaks at 1; all-zero samples stay zero.
    pub fn normalize_signals(&mut self) {
        for mut row in self.signals.axis_iter_mut(Axis(0)) {
            let peak = row.iter().fold(0.0f64, |m, v| m.max(v.abs()));
            if peak > 0.0 {
                row.mapv_inplace(|v| v / peak);
            }
        }
    }

    /// Cross-validation view: train and valid samples are pooled, permuted with `seed`, and cut
    /// into `num_folds` folds of near-equal size. Fold `fold` becomes the validation split and
    /// the others the training split. The test split is untouched.
    pub fn cv_fold(&self, num_folds: usize, fold: usize, seed: u64) -> DataResult<Self> {
        let pool = self.n_train + self.n_valid;
        if num_folds < 2 || num_folds > pool {
            return Err(DataError::InvalidParams(format!(
                "num_folds must be in 2..={}, got {}",
                pool, num_folds
            )));
        }
        if fold >= num_folds {
            return Err(DataError::InvalidParams(format!(
                "fold {} out of range for {} folds",
                fold, num_folds
            )));
        }

        let mut order: Vec<usize> = (0..pool).collect();
        order.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
        // the first `pool % num_folds` folds take one extra sample
        let bounds = |k: usize| k * (pool / num_folds) + k.min(pool % num_folds);
        let (start, end) = (bounds(fold), bounds(fold + 1));

        let mut rows: Vec<usize> = order[..start].iter().chain(&order[end..]).copied().collect();
        rows.extend_from_slice(&order[start..end]);
        rows.extend(pool..self.labels.len());

        debug!(fold, num_folds, valid = end - start, "cross-validation fold selected");
        Ok(Self {
            n_train: pool - (end - start),
            n_valid: end - start,
            n_test: self.n_test,
            source_edges: self.source_edges.clone(),
            t_max: self.t_max,
            signals: self.signals.select(Axis(0), &rows),
            labels: rows.iter().map(|&i| self.labels[i]).collect(),
        })
    }

    pub fn n_classes(&self) -> usize {
        self.source_edges.len()
    }

    pub fn source_edges(&self) -> &[usize] {
        &self.source_edges
    }

    pub fn t_max(&self) -> usize {
        self.t_max
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn save(&self, path: &Path) -> DataResult<()> {
        save_json(path, self)
    }

    pub fn load(path: &Path) -> DataResult<Self> {
        load_json(path)
    }
}
