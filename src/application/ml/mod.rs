// Forest regressor behind a multi-output seam
pub mod regressor;

// Feature standardization fitted on the training split
pub mod scaler;

pub mod predictor;
pub mod trainer;

pub use predictor::Predictor;
pub use regressor::ForestParams;
pub use trainer::{ModelTrainer, TrainedModel};
