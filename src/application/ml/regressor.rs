use crate::domain::errors::{FortunaError, FortunaResult};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::debug;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Regressor mapping one scaled feature row to one value per draw position.
pub trait MultiOutputRegressor {
    fn predict(&self, row: &[f64]) -> FortunaResult<Vec<f64>>;

    fn outputs(&self) -> usize;

    fn name(&self) -> &str;
}

/// Random forest hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
        }
    }
}

/// One smartcore random forest per draw position.
pub struct ForestEnsemble {
    forests: Vec<Forest>,
}

impl ForestEnsemble {
    /// `targets[i]` holds every output of row `i`.
    pub fn fit(
        x: &[Vec<f64>],
        targets: &[Vec<f64>],
        params: ForestParams,
        seed: u64,
    ) -> FortunaResult<Self> {
        let training = |reason: String| FortunaError::TrainingError { reason };

        let outputs = targets.first().map(|t| t.len()).unwrap_or(0);
        if x.is_empty() || outputs == 0 || x.len() != targets.len() {
            return Err(training(format!(
                "{} feature rows for {} target rows",
                x.len(),
                targets.len()
            )));
        }

        let x_matrix = DenseMatrix::from_2d_vec(&x.to_vec())
            .map_err(|e| training(format!("Matrix error: {}", e)))?;

        let mut forests = Vec::with_capacity(outputs);
        for pos in 0..outputs {
            let y: Vec<f64> = targets.iter().map(|t| t[pos]).collect();
            let forest_params = RandomForestRegressorParameters::default()
                .with_n_trees(params.n_trees)
                .with_max_depth(params.max_depth)
                .with_min_samples_split(params.min_samples_split)
                .with_seed(seed.wrapping_add(pos as u64));

            let forest = RandomForestRegressor::fit(&x_matrix, &y, forest_params)
                .map_err(|e| training(format!("position {}: {}", pos, e)))?;
            forests.push(forest);
        }

        debug!(
            "Fitted {} forests ({} trees each) on {} rows",
            outputs,
            params.n_trees,
            x.len()
        );
        Ok(Self { forests })
    }
}

impl MultiOutputRegressor for ForestEnsemble {
    fn predict(&self, row: &[f64]) -> FortunaResult<Vec<f64>> {
        let input = DenseMatrix::from_2d_vec(&vec![row.to_vec()]).map_err(|e| {
            FortunaError::PredictionError {
                reason: format!("Matrix creation failed: {}", e),
            }
        })?;

        self.forests
            .iter()
            .map(|forest| {
                let predictions =
                    forest
                        .predict(&input)
                        .map_err(|e| FortunaError::PredictionError {
                            reason: format!("Prediction failed: {}", e),
                        })?;
                predictions
                    .first()
                    .copied()
                    .ok_or_else(|| FortunaError::PredictionError {
                        reason: "No prediction returned".to_string(),
                    })
            })
            .collect()
    }

    fn outputs(&self) -> usize {
        self.forests.len()
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }
}
