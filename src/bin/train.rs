//! One-shot training: fit a model from the reference dataset and persist it
//! where the server will load it on its next start.

use anyhow::{Context, Result, bail};
use cardiorisk::application::ml::dataset::load_dataset;
use cardiorisk::application::ml::training::{train_on_all, train_with_split};
use cardiorisk::config::{ClassifierAlgorithm, ModelEnvConfig};
use cardiorisk::infrastructure::model_persistence::ModelArtifactStore;
use clap::Parser;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the reference dataset CSV
    #[arg(long, default_value = "heart.csv")]
    input: PathBuf,

    /// Path to the output model artifact
    #[arg(long, default_value = "data/model/heart_disease_model.json")]
    output: PathBuf,

    /// Classifier family: linear or tree_ensemble
    #[arg(long, default_value = "linear")]
    algorithm: ClassifierAlgorithm,

    /// Fit and persist a feature scaler in front of the classifier
    #[arg(long)]
    scale: bool,

    /// Seed for the stratified split and bootstrap sampling
    #[arg(long, default_value_t = 2)]
    seed: u64,

    /// Fraction of rows held out for the test accuracy
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,

    /// Number of trees (tree_ensemble only)
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum depth of trees (tree_ensemble only)
    #[arg(long, default_value_t = 10)]
    max_depth: u16,

    /// Maximum solver iterations (linear only)
    #[arg(long, default_value_t = 1000)]
    max_iter: usize,

    /// Disable train/test split (train on 100% of data). Use after validation.
    #[arg(long)]
    no_split: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();

    if !args.input.exists() {
        bail!("Reference dataset not found at {:?}", args.input);
    }

    let config = ModelEnvConfig {
        model_path: args.output.clone(),
        dataset_path: args.input.clone(),
        algorithm: args.algorithm,
        use_scaling: args.scale,
        random_seed: args.seed,
        test_fraction: args.test_fraction,
        n_trees: args.n_trees,
        max_depth: args.max_depth,
        max_iter: args.max_iter,
        ..ModelEnvConfig::default()
    };
    config.validate()?;

    let dataset = load_dataset(&config.dataset_path)?;
    let (artifact, report) = if args.no_split {
        train_on_all(&dataset, config.algorithm, &config)?
    } else {
        train_with_split(&dataset, &config)?
    };
    report.log();

    ModelArtifactStore::new(&config.model_path)
        .save(&artifact)
        .context("Failed to persist model artifact")?;
    info!("Done. Model saved to {:?}", config.model_path);
    Ok(())
}
