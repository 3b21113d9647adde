use serde::{Deserialize, Serialize};

/// Probability at or above which a record is High risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
/// Probability at or above which a record is at least Moderate risk
pub const MODERATE_RISK_THRESHOLD: f64 = 0.4;

pub const POSITIVE_MESSAGE: &str = "Heart disease detected";
pub const NEGATIVE_MESSAGE: &str = "No heart disease detected";

/// Risk tier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Determine the tier from the positive-class probability
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if probability >= MODERATE_RISK_THRESHOLD {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }

    /// Display color (hex) used by the result pages
    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Low => "#28a745",
            RiskTier::Moderate => "#ffc107",
            RiskTier::High => "#dc3545",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying one record
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub predicted_class: u8,
    pub probability: f64,
    pub risk_tier: RiskTier,
    pub message: &'static str,
}

impl PredictionResult {
    /// The message follows the predicted class, not the tier, so a class-0
    /// record can still land in the Moderate tier.
    pub fn new(predicted_class: u8, probability: f64) -> Self {
        Self {
            predicted_class,
            probability,
            risk_tier: RiskTier::from_probability(probability),
            message: if predicted_class == 1 {
                POSITIVE_MESSAGE
            } else {
                NEGATIVE_MESSAGE
            },
        }
    }

    pub fn to_response(&self) -> PredictionResponse {
        PredictionResponse {
            prediction: self.predicted_class,
            probability: self.probability,
            risk_level: self.risk_tier.label().to_string(),
            risk_color: self.risk_tier.color().to_string(),
            message: self.message.to_string(),
        }
    }
}

/// Wire form of a prediction, as returned to HTTP clients and kept in sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: u8,
    pub probability: f64,
    pub risk_level: String,
    pub risk_color: String,
    pub message: String,
}
