// Model fitting, persistence hand-off and inference
pub mod ml;
