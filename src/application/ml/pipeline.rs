//! Record -> risk tier inference.

use super::predictor::ModelArtifact;
use crate::domain::errors::InferenceError;
use crate::domain::ml::feature_registry::features_to_f64_vector;
use crate::domain::ml::prediction::PredictionResult;
use crate::domain::ml::record::FeatureRecord;
use serde_json::Value;

/// Immutable model state shared by every request.
///
/// Built once at startup by the model provider and handed out behind an
/// `Arc`; nothing mutates it afterwards.
#[derive(Debug)]
pub struct InferenceContext {
    artifact: ModelArtifact,
}

impl InferenceContext {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    pub fn model_name(&self) -> &str {
        self.artifact.model_name()
    }

    pub fn uses_scaling(&self) -> bool {
        self.artifact.scaler.is_some()
    }

    /// Fixed-order vector, fitted scaler (if any), probability, tier.
    pub fn classify(&self, record: &FeatureRecord) -> Result<PredictionResult, InferenceError> {
        let features = features_to_f64_vector(record);
        let (predicted_class, probability) = self
            .artifact
            .score(&features)
            .map_err(InferenceError::Model)?;
        Ok(PredictionResult::new(predicted_class, probability))
    }

    /// Validates a raw JSON body and classifies it
    pub fn classify_json(&self, body: &Value) -> Result<PredictionResult, InferenceError> {
        let record = FeatureRecord::from_json(body)?;
        self.classify(&record)
    }
}
