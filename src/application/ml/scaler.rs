use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Fitted per-feature standardisation: `(x - mean) / scale`.
///
/// `scale` is the population standard deviation of the training column,
/// replaced by 1.0 for constant columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl FeatureScaler {
    pub fn fit(x: &Array2<f64>) -> Result<Self, String> {
        let (mean, scale) = column_moments(x)?;
        Ok(Self {
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        })
    }

    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, String> {
        if features.len() != self.mean.len() {
            return Err(format!(
                "Scaler expects {} features, got {}",
                self.mean.len(),
                features.len()
            ));
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    pub fn transform_matrix(&self, x: &Array2<f64>) -> Result<Array2<f64>, String> {
        if x.ncols() != self.mean.len() {
            return Err(format!(
                "Scaler expects {} features, got {}",
                self.mean.len(),
                x.ncols()
            ));
        }
        let mean = Array1::from(self.mean.clone());
        let scale = Array1::from(self.scale.clone());
        Ok((x - &mean) / &scale)
    }
}

/// Column means and non-zero population standard deviations.
pub(crate) fn column_moments(x: &Array2<f64>) -> Result<(Array1<f64>, Array1<f64>), String> {
    let mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| "Cannot fit on an empty matrix".to_string())?;
    let scale = x
        .std_axis(Axis(0), 0.0)
        .mapv(|s| if s > 0.0 && s.is_finite() { s } else { 1.0 });
    Ok((mean, scale))
}
