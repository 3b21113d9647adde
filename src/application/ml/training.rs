//! Fitting a [`ModelArtifact`] from labeled data and reporting its accuracy.

use super::dataset::{LabeledDataset, stratified_split};
use super::logistic::{LogisticModel, LogisticParameters};
use super::predictor::{ModelArtifact, TrainedModel};
use super::scaler::FeatureScaler;
use super::tree_ensemble::{TreeEnsembleModel, TreeEnsembleParameters};
use crate::config::{ClassifierAlgorithm, ModelEnvConfig};
use crate::domain::errors::StartupError;
use tracing::info;

/// Summary of one fit, logged for information only
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub algorithm: ClassifierAlgorithm,
    pub use_scaling: bool,
    pub train_samples: usize,
    pub test_samples: usize,
    pub train_accuracy: f64,
    pub test_accuracy: Option<f64>,
}

impl TrainingReport {
    pub fn log(&self) {
        info!(
            algorithm = %self.algorithm,
            use_scaling = self.use_scaling,
            train_samples = self.train_samples,
            test_samples = self.test_samples,
            "Model trained successfully with {} samples",
            self.train_samples + self.test_samples
        );
        info!("Training accuracy: {:.3}", self.train_accuracy);
        if let Some(test_accuracy) = self.test_accuracy {
            info!("Testing accuracy: {:.3}", test_accuracy);
        }
    }
}

/// Stratified train/test split, fit on the train partition, score both.
pub fn train_with_split(
    dataset: &LabeledDataset,
    config: &ModelEnvConfig,
) -> Result<(ModelArtifact, TrainingReport), StartupError> {
    let split = stratified_split(dataset, config.test_fraction, config.random_seed);
    info!(
        train = split.train.len(),
        test = split.test.len(),
        seed = config.random_seed,
        "Dataset split"
    );

    let artifact = fit_artifact(&split.train, config.algorithm, config)?;
    let train_accuracy = accuracy(&artifact, &split.train)?;
    let test_accuracy = if split.test.is_empty() {
        None
    } else {
        Some(accuracy(&artifact, &split.test)?)
    };

    let report = TrainingReport {
        algorithm: config.algorithm,
        use_scaling: config.use_scaling,
        train_samples: split.train.len(),
        test_samples: split.test.len(),
        train_accuracy,
        test_accuracy,
    };
    Ok((artifact, report))
}

/// Fit on every row with no held-out partition.
pub fn train_on_all(
    dataset: &LabeledDataset,
    algorithm: ClassifierAlgorithm,
    config: &ModelEnvConfig,
) -> Result<(ModelArtifact, TrainingReport), StartupError> {
    let artifact = fit_artifact(dataset, algorithm, config)?;
    let train_accuracy = accuracy(&artifact, dataset)?;
    let report = TrainingReport {
        algorithm,
        use_scaling: config.use_scaling,
        train_samples: dataset.len(),
        test_samples: 0,
        train_accuracy,
        test_accuracy: None,
    };
    Ok((artifact, report))
}

fn fit_artifact(
    train: &LabeledDataset,
    algorithm: ClassifierAlgorithm,
    config: &ModelEnvConfig,
) -> Result<ModelArtifact, StartupError> {
    let fit_err = |reason: String| StartupError::Fit { reason };

    let raw = train.to_matrix().map_err(fit_err)?;
    let (scaler, x) = if config.use_scaling {
        let scaler = FeatureScaler::fit(&raw).map_err(fit_err)?;
        let scaled = scaler.transform_matrix(&raw).map_err(fit_err)?;
        (Some(scaler), scaled)
    } else {
        (None, raw)
    };

    let model = match algorithm {
        ClassifierAlgorithm::Linear => {
            let params = LogisticParameters::default()
                .with_max_iter(config.max_iter)
                .with_c(config.regularization);
            info!(
                "Training Logistic Regression (MaxIter: {}, C: {})...",
                params.max_iter, params.c
            );
            TrainedModel::Linear(LogisticModel::fit(&x, &train.labels, &params).map_err(fit_err)?)
        }
        ClassifierAlgorithm::TreeEnsemble => {
            let params = TreeEnsembleParameters {
                n_trees: config.n_trees,
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                seed: config.random_seed,
            };
            info!(
                "Training Tree Ensemble (Trees: {}, Depth: {}, MinSplit: {})...",
                params.n_trees, params.max_depth, params.min_samples_split
            );
            let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|r| r.to_vec()).collect();
            TrainedModel::TreeEnsemble(
                TreeEnsembleModel::fit(&rows, &train.labels, &params).map_err(fit_err)?,
            )
        }
    };

    Ok(ModelArtifact { model, scaler })
}

/// Share of rows whose predicted class equals the label
pub fn accuracy(artifact: &ModelArtifact, dataset: &LabeledDataset) -> Result<f64, StartupError> {
    if dataset.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for (features, &label) in dataset.features.iter().zip(&dataset.labels) {
        let (class, _) = artifact
            .score(features)
            .map_err(|reason| StartupError::Fit { reason })?;
        if class == label {
            correct += 1;
        }
    }
    Ok(correct as f64 / dataset.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::fallback::fallback_dataset;

    fn linear_config(use_scaling: bool) -> ModelEnvConfig {
        ModelEnvConfig {
            algorithm: ClassifierAlgorithm::Linear,
            use_scaling,
            ..ModelEnvConfig::default()
        }
    }

    #[test]
    fn test_fallback_linear_fits_its_training_set() {
        for use_scaling in [false, true] {
            let config = linear_config(use_scaling);
            let (artifact, report) =
                train_on_all(&fallback_dataset(), ClassifierAlgorithm::Linear, &config).unwrap();
            assert_eq!(report.train_accuracy, 1.0);
            assert_eq!(artifact.scaler.is_some(), use_scaling);
        }
    }

    #[test]
    fn test_tree_ensemble_on_fallback() {
        let config = ModelEnvConfig {
            n_trees: 10,
            ..ModelEnvConfig::default()
        };
        let (artifact, report) =
            train_on_all(&fallback_dataset(), ClassifierAlgorithm::TreeEnsemble, &config).unwrap();
        assert_eq!(artifact.model_name(), "SmartCore Tree Ensemble");
        assert_eq!(report.train_samples, 5);
        assert!((0.0..=1.0).contains(&report.train_accuracy));
    }
}
