//! Named-field clinical record and its validation at the input boundary.

use crate::domain::errors::InferenceError;
use crate::domain::ml::feature_registry::{FEATURE_SCHEMA, FeatureKind, FeatureSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One patient's 13 clinical features.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub age: f64,
    pub sex: u8,
    pub cp: u8,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: u8,
    pub restecg: u8,
    pub thalach: f64,
    pub exang: u8,
    pub oldpeak: f64,
    pub slope: u8,
    pub ca: u8,
    pub thal: u8,
}

impl FeatureRecord {
    /// Validates and coerces a raw JSON object (as received over HTTP).
    ///
    /// Numbers and numeric strings are accepted. Categorical fields must be
    /// integral and inside their schema range. Nothing is defaulted: the first
    /// missing or malformed field rejects the whole record.
    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self, InferenceError> {
        let mut values = [0.0_f64; FEATURE_SCHEMA.len()];
        for (slot, spec) in values.iter_mut().zip(FEATURE_SCHEMA.iter()) {
            *slot = coerce_field(spec, map.get(spec.name))?;
        }

        let [
            age,
            sex,
            cp,
            trestbps,
            chol,
            fbs,
            restecg,
            thalach,
            exang,
            oldpeak,
            slope,
            ca,
            thal,
        ] = values;

        Ok(Self {
            age,
            sex: sex as u8,
            cp: cp as u8,
            trestbps,
            chol,
            fbs: fbs as u8,
            restecg: restecg as u8,
            thalach,
            exang: exang as u8,
            oldpeak,
            slope: slope as u8,
            ca: ca as u8,
            thal: thal as u8,
        })
    }

    /// Convenience wrapper for callers holding an arbitrary JSON value.
    pub fn from_json(value: &Value) -> Result<Self, InferenceError> {
        match value {
            Value::Object(map) => Self::from_json_map(map),
            _ => Err(InferenceError::invalid("body", "expected a JSON object")),
        }
    }
}

fn coerce_field(spec: &FeatureSpec, raw: Option<&Value>) -> Result<f64, InferenceError> {
    let value = match raw {
        None | Some(Value::Null) => {
            return Err(InferenceError::invalid(spec.name, "field is missing"));
        }
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| InferenceError::invalid(spec.name, "number out of range"))?,
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            InferenceError::invalid(spec.name, format!("'{}' is not a number", s))
        })?,
        Some(other) => {
            return Err(InferenceError::invalid(
                spec.name,
                format!("expected a number, got {}", other),
            ));
        }
    };

    if !value.is_finite() {
        return Err(InferenceError::invalid(spec.name, "value must be finite"));
    }

    if let FeatureKind::Categorical { min, max } = spec.kind {
        if value.fract() != 0.0 {
            return Err(InferenceError::invalid(
                spec.name,
                format!("{} is not an integer", value),
            ));
        }
        if value < min as f64 || value > max as f64 {
            return Err(InferenceError::invalid(
                spec.name,
                format!("{} is outside {}..={}", value, min, max),
            ));
        }
    }

    Ok(value)
}
