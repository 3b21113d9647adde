use super::predictor::ProbabilisticClassifier;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};
use tracing::debug;

type Tree = DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Settings for [`TreeEnsembleModel::fit`]
#[derive(Debug, Clone)]
pub struct TreeEnsembleParameters {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for TreeEnsembleParameters {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Bagged decision trees; the positive-class probability is the share of
/// trees voting for class 1.
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeEnsembleModel {
    trees: Vec<Tree>,
    n_features: usize,
}

impl TreeEnsembleModel {
    /// Fits `n_trees` trees in parallel. Each tree sees a class-stratified
    /// bootstrap drawn from its own RNG (`seed + tree index`), so the sample
    /// sets do not depend on thread scheduling.
    pub fn fit(x: &[Vec<f64>], y: &[u8], params: &TreeEnsembleParameters) -> Result<Self, String> {
        if x.is_empty() {
            return Err("Cannot fit tree ensemble on zero samples".to_string());
        }
        if x.len() != y.len() {
            return Err(format!("Got {} labels for {} samples", y.len(), x.len()));
        }
        if params.n_trees == 0 {
            return Err("Tree ensemble needs at least one tree".to_string());
        }

        let n_features = x[0].len();
        let (negatives, positives): (Vec<usize>, Vec<usize>) =
            (0..y.len()).partition(|&i| y[i] == 0);
        if negatives.is_empty() || positives.is_empty() {
            return Err("Training labels must contain both classes".to_string());
        }

        let tree_params = DecisionTreeClassifierParameters::default()
            .with_max_depth(params.max_depth)
            .with_min_samples_split(params.min_samples_split);

        let trees = (0..params.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_idx as u64));
                let mut sample: Vec<usize> = Vec::with_capacity(y.len());
                sample.extend(bootstrap(&negatives, &mut rng));
                sample.extend(bootstrap(&positives, &mut rng));

                let rows: Vec<Vec<f64>> = sample.iter().map(|&i| x[i].clone()).collect();
                let labels: Vec<i32> = sample.iter().map(|&i| i32::from(y[i])).collect();

                let matrix = DenseMatrix::from_2d_vec(&rows)
                    .map_err(|e| format!("Matrix error: {}", e))?;
                Tree::fit(&matrix, &labels, tree_params.clone())
                    .map_err(|e| format!("Tree {} training error: {}", tree_idx, e))
            })
            .collect::<Result<Vec<_>, String>>()?;

        debug!(trees = trees.len(), n_features, "Tree ensemble fitted");
        Ok(Self { trees, n_features })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Draws `pool.len()` indices from `pool` with replacement.
fn bootstrap<'a>(pool: &'a [usize], rng: &'a mut StdRng) -> impl Iterator<Item = usize> + 'a {
    (0..pool.len()).map(move |_| pool[rng.random_range(0..pool.len())])
}

impl ProbabilisticClassifier for TreeEnsembleModel {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, String> {
        if features.len() != self.n_features {
            return Err(format!(
                "Model expects {} features, got {}",
                self.n_features,
                features.len()
            ));
        }
        let input = DenseMatrix::from_2d_vec(&vec![features.to_vec()])
            .map_err(|e| format!("Matrix creation failed: {}", e))?;

        let mut positive_votes = 0usize;
        for tree in &self.trees {
            let predictions = tree
                .predict(&input)
                .map_err(|e| format!("Prediction failed: {}", e))?;
            match predictions.first().copied() {
                Some(1) => positive_votes += 1,
                Some(_) => {}
                None => return Err("No prediction returned".to_string()),
            }
        }

        Ok(positive_votes as f64 / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        "SmartCore Tree Ensemble"
    }
}
