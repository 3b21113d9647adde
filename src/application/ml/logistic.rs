use super::predictor::ProbabilisticClassifier;
use super::scaler::column_moments;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Solver settings for [`LogisticModel::fit`]
#[derive(Debug, Clone)]
pub struct LogisticParameters {
    pub max_iter: usize,
    /// Inverse L2 strength, as in the usual `C` parameterisation
    pub c: f64,
    pub learning_rate: f64,
    pub tolerance: f64,
}

impl Default for LogisticParameters {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            c: 1.0,
            learning_rate: 0.1,
            tolerance: 1e-6,
        }
    }
}

impl LogisticParameters {
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }
}

/// Binary logistic regression in raw feature space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticModel {
    /// Full-batch gradient descent on the mean log-loss plus an L2 penalty.
    ///
    /// Columns are standardised internally so a fixed step size converges on
    /// raw clinical units; the fitted weights are folded back so prediction
    /// works on unscaled vectors.
    pub fn fit(x: &Array2<f64>, y: &[u8], params: &LogisticParameters) -> Result<Self, String> {
        let n = x.nrows();
        if n == 0 {
            return Err("Cannot fit logistic regression on zero samples".to_string());
        }
        if y.len() != n {
            return Err(format!("Got {} labels for {} samples", y.len(), n));
        }
        if params.c <= 0.0 {
            return Err(format!("C must be positive, got {}", params.c));
        }

        let (mean, scale) = column_moments(x)?;
        let z = (x - &mean) / &scale;
        let target: Array1<f64> = y.iter().map(|&label| f64::from(label)).collect();

        let n_f = n as f64;
        let l2 = 1.0 / (params.c * n_f);
        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;

        for _ in 0..params.max_iter {
            let probabilities = (z.dot(&weights) + bias).mapv(sigmoid);
            let residual = &probabilities - &target;

            let grad_w = z.t().dot(&residual) / n_f + &weights * l2;
            let grad_b = residual.sum() / n_f;

            weights.scaled_add(-params.learning_rate, &grad_w);
            bias -= params.learning_rate * grad_b;

            let max_grad = grad_w
                .iter()
                .fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if max_grad < params.tolerance {
                break;
            }
        }

        let coefficients = &weights / &scale;
        let intercept = bias - (&coefficients * &mean).sum();

        Ok(Self {
            coefficients: coefficients.to_vec(),
            intercept,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn decision_function(&self, features: &[f64]) -> Result<f64, String> {
        if features.len() != self.coefficients.len() {
            return Err(format!(
                "Model expects {} features, got {}",
                self.coefficients.len(),
                features.len()
            ));
        }
        Ok(self
            .coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (c, x)| acc + c * x))
    }
}

impl ProbabilisticClassifier for LogisticModel {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, String> {
        Ok(sigmoid(self.decision_function(features)?))
    }

    fn name(&self) -> &str {
        "Logistic Regression"
    }
}

fn sigmoid(t: f64) -> f64 {
    if t >= 0.0 {
        1.0 / (1.0 + (-t).exp())
    } else {
        let e = t.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separable_data_is_learned() {
        let x = array![[1.0, 200.0], [2.0, 210.0], [8.0, 300.0], [9.0, 320.0]];
        let y = [0, 0, 1, 1];
        let model = LogisticModel::fit(&x, &y, &LogisticParameters::default()).unwrap();

        assert_eq!(model.predict(&[1.5, 205.0]).unwrap(), 0);
        assert_eq!(model.predict(&[8.5, 310.0]).unwrap(), 1);
        let p = model.predict_proba(&[9.0, 320.0]).unwrap();
        assert!(p > 0.5 && p <= 1.0);
    }

    #[test]
    fn test_unscaled_inputs_match_internal_scaling() {
        // A constant column must not break the fold-back
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [4.0, 5.0]];
        let y = [0, 0, 1, 1];
        let model = LogisticModel::fit(&x, &y, &LogisticParameters::default()).unwrap();
        assert!(model.coefficients()[0] > 0.0);
        assert_eq!(model.coefficients()[1], 0.0);
    }

    #[test]
    fn test_feature_count_checked() {
        let x = array![[0.0], [1.0]];
        let model = LogisticModel::fit(&x, &[0, 1], &LogisticParameters::default()).unwrap();
        assert!(model.predict_proba(&[0.0, 1.0]).is_err());
    }

    #[test]
    fn test_label_count_checked() {
        let x = array![[0.0], [1.0]];
        assert!(LogisticModel::fit(&x, &[0], &LogisticParameters::default()).is_err());
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
    }
}
