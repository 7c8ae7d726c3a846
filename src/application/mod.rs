// Random selection benchmark
pub mod baseline;

// Model-versus-random orchestration
pub mod evaluator;

pub mod features;
pub mod ml;
pub mod statistics;
