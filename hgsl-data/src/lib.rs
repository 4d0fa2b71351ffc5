//! hgsl-data: datasets and artifacts built on hgsl-core
//!
//! Additions:
//! - Hyperedge files (JSON, integer or string node labels)
//! - Batched diffusion over the normalized co-membership operator
//! - Source-localization dataset with train/valid/test splits
//! - Shift-operator and incidence artifacts for the learning side
//! - TOML experiment configuration with typed tags
//! - F1 / accuracy metrics
//!
//! This crate composes hgsl-core's hypergraph and diffusion types and never mutates them.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod generate;
pub mod io;
pub mod metrics;
pub mod source_loc;

// Re-exports
pub use artifacts::{GsoCollection, IncidenceCollection};
pub use config::{load_config, Config, GnnModel};
pub use error::{ConfigError, DataError, DataResult};
pub use generate::{generate_gso_diffusion, GsoDiffusionParams};
pub use io::{load_hypergraph, NodeLabel};
pub use metrics::{accuracy, argmax_rows, confusion_matrix, f1_score, Average};
pub use source_loc::{
    fold_path, NoiseParams, SourceLocParams, SourceLocalization, SourceOperator, Split,
};
