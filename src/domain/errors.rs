use thiserror::Error;

/// Errors raised while turning a raw request into a prediction
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Model inference failed: {0}")]
    Model(String),
}

impl InferenceError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        InferenceError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors that abort process startup; the service never runs without a model
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("No model artifact at {model_path} and no reference dataset at {dataset_path}")]
    DatasetUnavailable {
        model_path: String,
        dataset_path: String,
    },

    #[error("Failed to read reference dataset: {reason}")]
    DatasetRead { reason: String },

    #[error("Reference dataset is missing columns: {missing:?}")]
    SchemaMismatch { missing: Vec<String> },

    #[error("Reference dataset has no complete rows")]
    EmptyDataset,

    #[error("Target column must be binary (0/1), found {value}")]
    NonBinaryTarget { value: f64 },

    #[error("Model fit failed: {reason}")]
    Fit { reason: String },

    #[error("Model artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Errors from the model artifact store
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
