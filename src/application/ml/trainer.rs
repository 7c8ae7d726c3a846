use super::regressor::{ForestEnsemble, ForestParams, MultiOutputRegressor};
use super::scaler::StandardScaler;
use crate::application::features::{FeatureExtractor, FeatureVector};
use crate::domain::draw::Draw;
use crate::domain::errors::{FortunaError, FortunaResult};
use crate::domain::ports::NumberGenerator;
use tracing::{debug, info, warn};

const TEST_FRACTION: f64 = 0.2;
const MIN_TRAIN_ROWS: usize = 2;

/// Regressor and the scaler fitted alongside it. Neither is valid alone.
pub struct TrainedModel {
    scaler: StandardScaler,
    regressor: Box<dyn MultiOutputRegressor>,
    holdout_rmse: Option<f64>,
}

impl TrainedModel {
    pub fn new(scaler: StandardScaler, regressor: Box<dyn MultiOutputRegressor>) -> Self {
        Self {
            scaler,
            regressor,
            holdout_rmse: None,
        }
    }

    /// Scales `features` and returns one continuous value per draw position.
    pub fn predict(&self, features: &FeatureVector) -> FortunaResult<Vec<f64>> {
        let scaled = self.scaler.transform(features.as_slice())?;
        self.regressor.predict(&scaled)
    }

    pub fn input_width(&self) -> usize {
        self.scaler.width()
    }

    pub fn outputs(&self) -> usize {
        self.regressor.outputs()
    }

    /// RMSE on the held-out 20% of rows.
    pub fn holdout_rmse(&self) -> Option<f64> {
        self.holdout_rmse
    }
}

impl std::fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedModel")
            .field("regressor", &self.regressor.name())
            .field("inputs", &self.input_width())
            .field("outputs", &self.outputs())
            .field("holdout_rmse", &self.holdout_rmse)
            .finish()
    }
}

pub struct ModelTrainer {
    extractor: FeatureExtractor,
    params: ForestParams,
}

impl ModelTrainer {
    pub fn new(extractor: FeatureExtractor, params: ForestParams) -> Self {
        Self { extractor, params }
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Fits a model on `draws`. The 80/20 row split and the forest seed both
    /// come from `rng`.
    pub fn train(
        &self,
        draws: &[Draw],
        rng: &mut impl NumberGenerator,
    ) -> FortunaResult<TrainedModel> {
        // At least one row: extract fails below window_size + 1 draws
        let set = self.extractor.extract(draws)?;

        let rows = set.len();
        let n_test = (rows as f64 * TEST_FRACTION).ceil() as usize;
        let n_train = rows - n_test;
        if n_train < MIN_TRAIN_ROWS {
            return Err(FortunaError::TrainingError {
                reason: format!(
                    "{} feature rows leave {} for training, need {}",
                    rows, n_train, MIN_TRAIN_ROWS
                ),
            });
        }

        let mut order: Vec<usize> = (0..rows).collect();
        rng.shuffle(&mut order);
        let (test_idx, train_idx) = order.split_at(n_test);

        let features: Vec<Vec<f64>> = set
            .features
            .into_iter()
            .map(FeatureVector::into_inner)
            .collect();

        let x_train = pick(train_idx, &features);
        let y_train = pick(train_idx, &set.targets);

        let scaler = StandardScaler::fit(&x_train)?;
        let x_train_scaled = scaler.transform_rows(&x_train)?;

        info!(
            "Training random forest regressor on {} rows ({} held out, {} features)",
            n_train,
            n_test,
            self.extractor.width()
        );
        let regressor =
            ForestEnsemble::fit(&x_train_scaled, &y_train, self.params, rng.next_seed())?;

        let holdout_rmse = holdout_rmse(
            &regressor,
            &scaler,
            &pick(test_idx, &features),
            &pick(test_idx, &set.targets),
        );
        if let Some(rmse) = holdout_rmse {
            debug!("Held-out RMSE over {} rows: {:.4}", n_test, rmse);
        }

        Ok(TrainedModel {
            scaler,
            regressor: Box::new(regressor),
            holdout_rmse,
        })
    }
}

fn pick(idx: &[usize], all: &[Vec<f64>]) -> Vec<Vec<f64>> {
    idx.iter().map(|i| all[*i].clone()).collect()
}

fn holdout_rmse(
    regressor: &impl MultiOutputRegressor,
    scaler: &StandardScaler,
    x_test: &[Vec<f64>],
    y_test: &[Vec<f64>],
) -> Option<f64> {
    let mut sq_err = 0.0;
    let mut n = 0usize;
    for (x, y) in x_test.iter().zip(y_test) {
        let pred = match scaler.transform(x).and_then(|scaled| regressor.predict(&scaled)) {
            Ok(pred) => pred,
            Err(e) => {
                warn!("Held-out RMSE unavailable: {}", e);
                return None;
            }
        };
        for (p, t) in pred.iter().zip(y) {
            sq_err += (p - t).powi(2);
            n += 1;
        }
    }
    if n == 0 {
        return None;
    }
    Some((sq_err / n as f64).sqrt())
}
