use super::logistic::LogisticModel;
use super::scaler::FeatureScaler;
use super::tree_ensemble::TreeEnsembleModel;
use serde::{Deserialize, Serialize};

/// Probability threshold separating the two predicted classes
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Class 1 iff the positive-class probability exceeds [`DECISION_THRESHOLD`]
pub fn class_for(probability: f64) -> u8 {
    u8::from(probability > DECISION_THRESHOLD)
}

/// Interface for fitted binary classifiers
pub trait ProbabilisticClassifier: Send + Sync {
    /// Positive-class probability (0.0 to 1.0)
    fn predict_proba(&self, features: &[f64]) -> Result<f64, String>;

    /// Predicted class, see [`class_for`]
    fn predict(&self, features: &[f64]) -> Result<u8, String> {
        Ok(class_for(self.predict_proba(features)?))
    }

    /// Get model name/type
    fn name(&self) -> &str;
}

/// Any classifier this service can fit, persist and serve
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainedModel {
    Linear(LogisticModel),
    TreeEnsemble(TreeEnsembleModel),
}

impl ProbabilisticClassifier for TrainedModel {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, String> {
        match self {
            TrainedModel::Linear(model) => model.predict_proba(features),
            TrainedModel::TreeEnsemble(model) => model.predict_proba(features),
        }
    }

    fn name(&self) -> &str {
        match self {
            TrainedModel::Linear(model) => model.name(),
            TrainedModel::TreeEnsemble(model) => model.name(),
        }
    }
}

/// Persisted form of a fitted pipeline: the classifier plus the scaler it was
/// fitted behind, if any. Carries no feature schema or version.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: TrainedModel,
    pub scaler: Option<FeatureScaler>,
}

impl ModelArtifact {
    /// Scales (if the artifact carries a scaler) and scores one fixed-order vector.
    /// Returns the predicted class and the positive-class probability.
    pub fn score(&self, features: &[f64]) -> Result<(u8, f64), String> {
        let scaled;
        let input = match &self.scaler {
            Some(scaler) => {
                scaled = scaler.transform(features)?;
                scaled.as_slice()
            }
            None => features,
        };

        let probability = self.model.predict_proba(input)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(format!("Probability {} outside [0, 1]", probability));
        }
        Ok((class_for(probability), probability))
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}
