//! Dataset generator: shift-operator artifacts plus source-localization samples, or batched
//! GSO diffusion traces.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hgsl_data::artifacts::{gso_path, incidence_path, save_artifacts};
use hgsl_data::config::DataType;
use hgsl_data::io::save_json;
use hgsl_data::{
    fold_path, generate_gso_diffusion, load_config, load_hypergraph, GsoCollection,
    GsoDiffusionParams, IncidenceCollection, SourceLocalization,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "hgsl-gen", version, about = "Generate hypergraph source-localization data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write GSO / incidence artifacts and the source-localization dataset described by a config.
    Dataset {
        #[arg(long, default_value = "configs/sourceLoc.toml")]
        config: PathBuf,
        /// Override the seed from the config.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Diffuse random sparse sources with the normalized co-membership operator.
    Gso {
        /// JSON hyperedge file.
        #[arg(long)]
        hyperedges: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 100)]
        samples: usize,
        #[arg(long, default_value_t = 1)]
        sources: usize,
        #[arg(long, default_value_t = 10)]
        steps: usize,
        #[arg(long, default_value_t = hgsl_data::generate::DEFAULT_NOISE_VARIANCE)]
        noise_variance: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Dataset { config, seed } => run_dataset(config, seed),
        Command::Gso { hyperedges, output, samples, sources, steps, noise_variance, seed } => {
            let hg = load_hypergraph(&hyperedges)
                .with_context(|| format!("loading hyperedges from {}", hyperedges.display()))?;
            let params = GsoDiffusionParams { n_samples: samples, n_sources: sources, steps, noise_variance };
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let traces = generate_gso_diffusion(&hg, &params, &mut rng)?;
            save_json(&output, &traces).with_context(|| format!("writing {}", output.display()))?;
            info!(output = %output.display(), shape = ?traces.dim(), "gso traces written");
            Ok(())
        }
    }
}

fn run_dataset(config_path: PathBuf, seed: Option<u64>) -> Result<()> {
    let config = load_config(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let dataset = &config.dataset;
    if dataset.data_type != DataType::SourceLoc {
        bail!("data type '{}' cannot be generated, only 'sourceLoc'", dataset.data_type);
    }

    let hg = load_hypergraph(&dataset.hyperedge_path)
        .with_context(|| format!("loading hyperedges from {}", dataset.hyperedge_path.display()))?;
    info!(nodes = hg.n(), hyperedges = hg.m(), "hypergraph loaded");

    let gsos = GsoCollection::from_hypergraph(&hg);
    let incidence = IncidenceCollection::from_hypergraph(&hg);
    save_artifacts(&dataset.matrix_path, &gsos, &incidence).context("writing matrix artifacts")?;
    info!(
        gsos = %gso_path(&dataset.matrix_path).display(),
        incidence = %incidence_path(&dataset.matrix_path).display(),
        "artifacts written"
    );

    let seed = seed.unwrap_or(dataset.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = SourceLocalization::generate(&hg, &dataset.source_loc_params(), &mut rng)?;
    if dataset.normalize_graph_signal {
        data.normalize_signals();
    }
    data.save(&dataset.data_path)
        .with_context(|| format!("writing dataset {}", dataset.data_path.display()))?;
    info!(path = %dataset.data_path.display(), samples = data.len(), "dataset written");

    // Every fold is cut with the same seed so the folds partition one permutation
    if let Some(num_folds) = dataset.num_folds {
        for fold in 0..num_folds {
            let path = fold_path(&dataset.data_path, fold);
            data.cv_fold(num_folds, fold, seed)?
                .save(&path)
                .with_context(|| format!("writing fold {}", path.display()))?;
        }
        info!(num_folds, "cross-validation folds written");
    }
    Ok(())
}
