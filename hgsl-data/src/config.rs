//! TOML configuration for dataset generation and training experiments.
//!
//! ```toml
//! [dataset]
//! hyperedge_path = "data/edges.json"
//! source_edges = [0, 3, 7]
//!
//! [experiments.clique_line]
//! gnn_model = "LocalGNNCliqueLine"
//! loss_function = "CE"
//! ```
//!
//! String tags keep the spelling of the training harness (`"MSE"`, `"ReLU"`, `"ADAM"`, ...).

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hgsl_core::CsrMatrix;
use serde::{Deserialize, Serialize};

use crate::artifacts::{GsoCollection, IncidenceCollection, CLIQUE_GSO, LINE_GSO};
use crate::error::{ConfigError, DataError, DataResult};
use crate::source_loc::{NoiseParams, SourceLocParams, SourceOperator};

/// String-tagged enum with `FromStr`, `Display` and serde through its tag.
macro_rules! tagged_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal { $($variant:ident => $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn tag(self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    other => Err(ConfigError::NotAvailable { what: $what, tag: other.to_owned() }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> String {
                v.tag().to_owned()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.tag())
            }
        }
    };
}

tagged_enum!(LossFunction, "loss function" { Mse => "MSE", CrossEntropy => "CE" });
tagged_enum!(Nonlinearity, "nonlinearity" { Tanh => "Tanh", Sigmoid => "Sigmoid", Relu => "ReLU" });
tagged_enum!(PoolingFunction, "pooling function" { NoPool => "NoPool", MaxPool => "MaxPool" });
tagged_enum!(OptimAlg, "optimization algorithm" { Adam => "ADAM", Sgd => "SGD" });
tagged_enum!(DataType, "data type" { SourceLoc => "sourceLoc", Dhg => "dhg" });
tagged_enum!(
    /// Model variant; decides which shift operators are fed to the network.
    GnnModel, "GNN model" {
        LocalGnnCliqueLine => "LocalGNNCliqueLine",
        LocalGnnHgLap => "LocalGNNHGLap",
        LocalGnnClique => "LocalGNNClique",
        LocalGnnLine => "LocalGNNLine",
    }
);

impl GnnModel {
    /// Shift operators for this model, picked by position from the stored collections.
    pub fn select_gsos(
        self,
        gsos: &GsoCollection,
        incidence: &IncidenceCollection,
    ) -> DataResult<Vec<CsrMatrix>> {
        Ok(match self {
            GnnModel::LocalGnnCliqueLine => {
                vec![gsos.get(CLIQUE_GSO)?.clone(), gsos.get(LINE_GSO)?.clone()]
            }
            GnnModel::LocalGnnClique => vec![gsos.get(CLIQUE_GSO)?.clone()],
            GnnModel::LocalGnnLine => vec![gsos.get(LINE_GSO)?.clone()],
            GnnModel::LocalGnnHgLap => vec![incidence.hypergraph_laplacian()?],
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub dataset: DatasetSection,
    #[serde(default)]
    pub experiments: BTreeMap<String, ExperimentSection>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetSection {
    #[serde(default = "default_data_type")]
    pub data_type: DataType,
    /// JSON hyperedge file.
    pub hyperedge_path: PathBuf,
    /// Prefix of the `_gsos.json` / `_incidence.json` artifacts.
    #[serde(default = "default_matrix_path")]
    pub matrix_path: PathBuf,
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default = "default_n_train")]
    pub n_train: usize,
    #[serde(default = "default_n_valid")]
    pub n_valid: usize,
    #[serde(default = "default_n_test")]
    pub n_test: usize,
    pub source_edges: Vec<usize>,
    #[serde(default)]
    pub t_max: Option<usize>,
    #[serde(default)]
    pub noise: Option<NoiseParams>,
    #[serde(default)]
    pub operator: SourceOperator,
    #[serde(default)]
    pub seed: u64,
    /// Cross-validation folds over train + valid; see [`SourceLocalization::cv_fold`].
    #[serde(default)]
    pub num_folds: Option<usize>,
    /// Scale each sample to unit peak magnitude before saving.
    #[serde(default)]
    pub normalize_graph_signal: bool,
}

const fn default_data_type() -> DataType {
    DataType::SourceLoc
}

fn default_matrix_path() -> PathBuf {
    PathBuf::from("data/sourceLoc/sourceLoc")
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/sourceLoc/sourceLoc_data.json")
}

const fn default_n_train() -> usize {
    600
}

const fn default_n_valid() -> usize {
    200
}

const fn default_n_test() -> usize {
    200
}

impl DatasetSection {
    pub fn source_loc_params(&self) -> SourceLocParams {
        SourceLocParams {
            n_train: self.n_train,
            n_valid: self.n_valid,
            n_test: self.n_test,
            source_edges: self.source_edges.clone(),
            t_max: self.t_max,
            noise: self.noise,
            operator: self.operator,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSection {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(flatten)]
    pub train: TrainParams,
    #[serde(flatten)]
    pub learner: LearnerParams,
}

fn default_name() -> String {
    "localGNNCliqueLine".into()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    pub n_epochs: usize,
    pub batch_size: usize,
    pub integral_lipschitz_constant: Option<f64>,
    pub learning_rate: f64,
    pub loss_function: LossFunction,
    pub nonlinearity: Nonlinearity,
    pub optim_alg: OptimAlg,
    pub beta1: f64,
    pub beta2: f64,
    pub lr_decay: bool,
    pub lr_decay_rate: f64,
    pub lr_decay_period: usize,
    pub validation_interval: usize,
    pub print_interval: usize,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            n_epochs: 50,
            batch_size: 20,
            integral_lipschitz_constant: None,
            learning_rate: 0.05,
            loss_function: LossFunction::Mse,
            nonlinearity: Nonlinearity::Sigmoid,
            optim_alg: OptimAlg::Adam,
            beta1: 0.9,
            beta2: 0.999,
            lr_decay: false,
            lr_decay_rate: 0.9,
            lr_decay_period: 1,
            validation_interval: 5,
            print_interval: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerParams {
    pub gnn_model: GnnModel,
    pub dim_features: Vec<usize>,
    pub num_filter_taps: Vec<usize>,
    pub bias: bool,
    pub pooling_function: PoolingFunction,
    pub pooling_size: Vec<usize>,
    pub dim_readout: Vec<usize>,
    pub do_sparse: bool,
}

impl Default for LearnerParams {
    fn default() -> Self {
        Self {
            gnn_model: GnnModel::LocalGnnCliqueLine,
            dim_features: vec![1],
            num_filter_taps: Vec::new(),
            bias: false,
            pooling_function: PoolingFunction::NoPool,
            pooling_size: Vec::new(),
            dim_readout: vec![8, 1],
            do_sparse: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.dataset;
        if d.source_edges.is_empty() {
            return Err(ConfigError::Validation("at least one source hyperedge must be given".into()));
        }
        if d.n_train == 0 {
            return Err(ConfigError::Validation("n_train must be greater than zero".into()));
        }
        if matches!(d.t_max, Some(t) if t < 2) {
            return Err(ConfigError::Validation("t_max must be at least 2".into()));
        }
        if matches!(d.num_folds, Some(k) if k < 2) {
            return Err(ConfigError::Validation("num_folds must be at least 2".into()));
        }
        for (name, exp) in &self.experiments {
            exp.validate().map_err(|e| match e {
                ConfigError::Validation(msg) => ConfigError::Validation(format!("[experiments.{}] {}", name, msg)),
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn sample() -> Self {
        let mut experiments = BTreeMap::new();
        experiments.insert(
            "clique_line".to_owned(),
            ExperimentSection {
                name: default_name(),
                train: TrainParams::default(),
                learner: LearnerParams::default(),
            },
        );
        Self {
            dataset: DatasetSection {
                data_type: DataType::SourceLoc,
                hyperedge_path: PathBuf::from("data/sourceLoc/hyperedges.json"),
                matrix_path: default_matrix_path(),
                data_path: default_data_path(),
                n_train: default_n_train(),
                n_valid: default_n_valid(),
                n_test: default_n_test(),
                source_edges: vec![0, 1, 2],
                t_max: None,
                noise: Some(NoiseParams { mean: 0.0, variance: 1e-3 }),
                operator: SourceOperator::Energy,
                seed: 0,
                num_folds: None,
                normalize_graph_signal: false,
            },
            experiments,
        }
    }
}

impl ExperimentSection {
    fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.train;
        if t.n_epochs == 0 || t.batch_size == 0 {
            return Err(ConfigError::Validation("n_epochs and batch_size must be positive".into()));
        }
        if t.learning_rate.is_nan() || t.learning_rate <= 0.0 {
            return Err(ConfigError::Validation("learning_rate must be positive".into()));
        }
        if !(0.0..1.0).contains(&t.beta1) || !(0.0..1.0).contains(&t.beta2) {
            return Err(ConfigError::Validation("beta1 and beta2 must lie in [0, 1)".into()));
        }
        if self.learner.dim_readout.is_empty() {
            return Err(ConfigError::Validation("dim_readout must not be empty".into()));
        }
        if self.learner.pooling_function == PoolingFunction::MaxPool
            && self.learner.pooling_size.is_empty()
        {
            return Err(ConfigError::Validation("MaxPool needs pooling_size".into()));
        }
        Ok(())
    }
}

pub fn parse_config(contents: &str) -> DataResult<Config> {
    let config: Config = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> DataResult<Config> {
    let contents = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    parse_config(&contents)
}
