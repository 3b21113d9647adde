pub mod dataset;
pub mod fallback;
pub mod logistic;
pub mod model_provider;
pub mod pipeline;
pub mod predictor;
pub mod scaler;
pub mod training;
pub mod tree_ensemble;
