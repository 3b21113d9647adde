use crate::domain::ml::record::FeatureRecord;

/// Ordered list of feature names.
/// This order MUST match the column order the model was fitted on.
/// Any change here is a breaking change for persisted models.
pub const FEATURE_NAMES: &[&str] = &[
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Name of the label column in the reference dataset
pub const TARGET_COLUMN: &str = "target";

pub const FEATURE_COUNT: usize = 13;

/// Expected value shape of a single feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureKind {
    /// Any finite real number
    Continuous,
    /// Integral category code within an inclusive range
    Categorical { min: i64, max: i64 },
}

/// Schema entry: name plus expected kind, indexed like `FEATURE_NAMES`
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn cat(name: &'static str, min: i64, max: i64) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Categorical { min, max },
    }
}

const fn cont(name: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Continuous,
    }
}

pub const FEATURE_SCHEMA: [FeatureSpec; FEATURE_COUNT] = [
    cont("age"),
    cat("sex", 0, 1),
    cat("cp", 0, 3),
    cont("trestbps"),
    cont("chol"),
    cat("fbs", 0, 1),
    cat("restecg", 0, 2),
    cont("thalach"),
    cat("exang", 0, 1),
    cont("oldpeak"),
    cat("slope", 0, 2),
    cat("ca", 0, 3),
    cat("thal", 1, 3),
];

/// Converts a record into the fixed-order f64 vector used for fitting and inference.
pub fn features_to_f64_vector(record: &FeatureRecord) -> Vec<f64> {
    vec![
        record.age,
        record.sex as f64,
        record.cp as f64,
        record.trestbps,
        record.chol,
        record.fbs as f64,
        record.restecg as f64,
        record.thalach,
        record.exang as f64,
        record.oldpeak,
        record.slope as f64,
        record.ca as f64,
        record.thal as f64,
    ]
}
