//! Model provisioning configuration parsed from environment variables.
//!
//! Classifier choice and scaler presence are baked in at fit time; once an
//! artifact exists these values only matter for the next refit.

use super::{Lookup, parse_var};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Classifier family used when fitting a new model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierAlgorithm {
    /// L2-regularised logistic regression
    Linear,
    /// Bagged decision trees
    TreeEnsemble,
}

impl FromStr for ClassifierAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" | "logistic" => Ok(ClassifierAlgorithm::Linear),
            "tree_ensemble" | "random_forest" | "forest" => Ok(ClassifierAlgorithm::TreeEnsemble),
            _ => bail!(
                "Invalid CLASSIFIER_ALGORITHM: {}. Must be 'linear' or 'tree_ensemble'",
                s
            ),
        }
    }
}

impl std::fmt::Display for ClassifierAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierAlgorithm::Linear => f.write_str("linear"),
            ClassifierAlgorithm::TreeEnsemble => f.write_str("tree_ensemble"),
        }
    }
}

/// Model environment configuration
#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    // Locations
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    pub fallback_enabled: bool,

    // Fit policy
    pub algorithm: ClassifierAlgorithm,
    pub use_scaling: bool,
    pub random_seed: u64,
    pub test_fraction: f64,

    // Tree ensemble
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,

    // Linear model
    pub max_iter: usize,
    pub regularization: f64,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("data/model/heart_disease_model.json"),
            dataset_path: PathBuf::from("heart.csv"),
            fallback_enabled: true,
            algorithm: ClassifierAlgorithm::TreeEnsemble,
            use_scaling: true,
            random_seed: 42,
            test_fraction: 0.2,
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            max_iter: 1000,
            regularization: 1.0,
        }
    }
}

impl ModelEnvConfig {
    pub fn from_lookup(lookup: &Lookup) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            dataset_path: lookup("DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_path),
            fallback_enabled: parse_var(lookup, "MODEL_FALLBACK_ENABLED", defaults.fallback_enabled)?,
            algorithm: parse_var(lookup, "CLASSIFIER_ALGORITHM", defaults.algorithm)?,
            use_scaling: parse_var(lookup, "USE_SCALING", defaults.use_scaling)?,
            random_seed: parse_var(lookup, "RANDOM_SEED", defaults.random_seed)?,
            test_fraction: parse_var(lookup, "TEST_FRACTION", defaults.test_fraction)?,
            n_trees: parse_var(lookup, "ENSEMBLE_TREES", defaults.n_trees)?,
            max_depth: parse_var(lookup, "ENSEMBLE_MAX_DEPTH", defaults.max_depth)?,
            min_samples_split: parse_var(lookup, "ENSEMBLE_MIN_SPLIT", defaults.min_samples_split)?,
            max_iter: parse_var(lookup, "LINEAR_MAX_ITER", defaults.max_iter)?,
            regularization: parse_var(lookup, "LINEAR_C", defaults.regularization)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            bail!(
                "TEST_FRACTION must be strictly between 0 and 1, got {}",
                self.test_fraction
            );
        }
        if self.n_trees == 0 {
            bail!("ENSEMBLE_TREES must be at least 1");
        }
        if self.regularization <= 0.0 {
            bail!("LINEAR_C must be positive, got {}", self.regularization);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_model_config_defaults() {
        let config = ModelEnvConfig::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(config.algorithm, ClassifierAlgorithm::TreeEnsemble);
        assert!(config.use_scaling);
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.n_trees, 100);
    }

    #[test]
    fn test_model_config_overrides() {
        let lookup = lookup_from(&[
            ("CLASSIFIER_ALGORITHM", "linear"),
            ("USE_SCALING", "false"),
            ("RANDOM_SEED", "2"),
            ("MODEL_PATH", "/tmp/m.json"),
        ]);
        let config = ModelEnvConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.algorithm, ClassifierAlgorithm::Linear);
        assert!(!config.use_scaling);
        assert_eq!(config.random_seed, 2);
        assert_eq!(config.model_path, PathBuf::from("/tmp/m.json"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ModelEnvConfig::from_lookup(&lookup_from(&[("TEST_FRACTION", "1.5")])).is_err());
        assert!(ModelEnvConfig::from_lookup(&lookup_from(&[("CLASSIFIER_ALGORITHM", "svm")])).is_err());
        assert!(ModelEnvConfig::from_lookup(&lookup_from(&[("RANDOM_SEED", "abc")])).is_err());
    }
}
