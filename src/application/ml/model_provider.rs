//! Startup-time model acquisition: load the persisted artifact, otherwise fit
//! one from the reference dataset (or the built-in fallback records) and
//! persist it for the next start.

use super::dataset::load_dataset;
use super::fallback::fallback_dataset;
use super::pipeline::InferenceContext;
use super::training::{TrainingReport, train_on_all, train_with_split};
use crate::config::{ClassifierAlgorithm, ModelEnvConfig};
use crate::domain::errors::StartupError;
use crate::infrastructure::model_persistence::ModelArtifactStore;
use tracing::{info, warn};

/// Where the served model came from
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    Artifact,
    Dataset(TrainingReport),
    Fallback(TrainingReport),
}

pub struct ModelProvider {
    config: ModelEnvConfig,
    store: ModelArtifactStore,
}

impl ModelProvider {
    pub fn new(config: ModelEnvConfig) -> Self {
        let store = ModelArtifactStore::new(config.model_path.clone());
        Self { config, store }
    }

    /// Runs exactly once, before any request is served. Every failure is fatal.
    pub fn obtain(&self) -> Result<(InferenceContext, ModelSource), StartupError> {
        if let Some(artifact) = self.store.load()? {
            info!(
                model = artifact.model_name(),
                "Using persisted model (feature order is not verified)"
            );
            return Ok((InferenceContext::new(artifact), ModelSource::Artifact));
        }

        let (artifact, source) = if self.config.dataset_path.exists() {
            let dataset = load_dataset(&self.config.dataset_path)?;
            let (artifact, report) = train_with_split(&dataset, &self.config)?;
            report.log();
            (artifact, ModelSource::Dataset(report))
        } else if self.config.fallback_enabled {
            warn!(
                "Reference dataset not found at {:?}; fitting on built-in fallback records",
                self.config.dataset_path
            );
            let (artifact, report) =
                train_on_all(&fallback_dataset(), ClassifierAlgorithm::Linear, &self.config)?;
            report.log();
            (artifact, ModelSource::Fallback(report))
        } else {
            return Err(StartupError::DatasetUnavailable {
                model_path: self.config.model_path.display().to_string(),
                dataset_path: self.config.dataset_path.display().to_string(),
            });
        };

        self.store.save(&artifact)?;
        Ok((InferenceContext::new(artifact), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cardiorisk-provider-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_fallback_then_artifact_on_restart() {
        let dir = temp_dir();
        let config = ModelEnvConfig {
            model_path: dir.join("model.json"),
            dataset_path: dir.join("missing.csv"),
            ..ModelEnvConfig::default()
        };

        let (_, source) = ModelProvider::new(config.clone()).obtain().unwrap();
        assert!(matches!(source, ModelSource::Fallback(_)));
        assert!(config.model_path.exists());

        let (ctx, source) = ModelProvider::new(config).obtain().unwrap();
        assert_eq!(source, ModelSource::Artifact);
        assert_eq!(ctx.model_name(), "Logistic Regression");
    }

    #[test]
    fn test_no_sources_is_fatal() {
        let dir = temp_dir();
        let config = ModelEnvConfig {
            model_path: dir.join("model.json"),
            dataset_path: dir.join("missing.csv"),
            fallback_enabled: false,
            ..ModelEnvConfig::default()
        };
        assert!(matches!(
            ModelProvider::new(config).obtain(),
            Err(StartupError::DatasetUnavailable { .. })
        ));
    }

    #[test]
    fn test_bad_dataset_is_fatal() {
        let dir = temp_dir();
        let dataset_path = dir.join("heart.csv");
        std::fs::write(&dataset_path, "age,sex\n63,1\n").unwrap();
        let config = ModelEnvConfig {
            model_path: dir.join("model.json"),
            dataset_path,
            ..ModelEnvConfig::default()
        };
        assert!(matches!(
            ModelProvider::new(config.clone()).obtain(),
            Err(StartupError::SchemaMismatch { .. })
        ));
        assert!(!config.model_path.exists());
    }
}
