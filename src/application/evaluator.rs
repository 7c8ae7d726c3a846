//! Model-versus-random evaluation.
//!
//! Stage order: LOADING -> SPLITTING -> TRAINING -> SAMPLING -> SCORING ->
//! COMPARING -> DONE. Insufficient data or a failed fit at any stage moves
//! the run to FALLBACK, where the random baseline stands in for the model.

use super::baseline::BaselineEvaluator;
use super::features::{DEFAULT_WINDOW_SIZE, FeatureExtractor};
use super::ml::{ForestParams, ModelTrainer, Predictor, TrainedModel};
use super::statistics::p_value_better_than;
use crate::domain::draw::Draw;
use crate::domain::errors::{FortunaError, FortunaResult};
use crate::domain::evaluation::{
    EvaluationOutcome, EvaluationResult, EvaluationStage, MatchDistribution, TrialSummary,
};
use crate::domain::lottery::LotteryConfig;
use crate::domain::ports::NumberGenerator;
use crate::infrastructure::rng::SeededGenerator;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info, warn};

const TRAIN_FRACTION: f64 = 0.8;

/// Which draws form the prediction context of a sampled test draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContextMode {
    /// Training segment followed by the sampled draw itself. The sampled
    /// draw is part of the feature window.
    #[default]
    IncludeTarget,
    /// Every draw chronologically before the sampled one.
    PrecedingOnly,
}

impl FromStr for ContextMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "include-target" | "include_target" => Ok(ContextMode::IncludeTarget),
            "preceding-only" | "preceding_only" => Ok(ContextMode::PrecedingOnly),
            _ => anyhow::bail!(
                "Invalid context mode: {}. Must be 'include-target' or 'preceding-only'",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSettings {
    pub window_size: usize,
    pub forest: ForestParams,
    pub context_mode: ContextMode,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            forest: ForestParams::default(),
            context_mode: ContextMode::default(),
        }
    }
}

pub struct Evaluator {
    lottery: LotteryConfig,
    settings: EvaluationSettings,
}

struct StageTracker {
    current: EvaluationStage,
}

impl StageTracker {
    fn enter(&mut self, next: EvaluationStage) {
        debug!("Evaluation stage {} -> {}", self.current, next);
        self.current = next;
    }
}

impl Evaluator {
    pub fn new(lottery: LotteryConfig, settings: EvaluationSettings) -> Self {
        Self { lottery, settings }
    }

    pub fn lottery(&self) -> &LotteryConfig {
        &self.lottery
    }

    /// Compares the trained model with random picks over `trials` sampled
    /// test draws. Identical `(draws, trials, seed)` give identical results.
    pub fn evaluate(
        &self,
        draws: &[Draw],
        trials: usize,
        seed: u64,
    ) -> FortunaResult<EvaluationResult> {
        if trials == 0 {
            return Err(FortunaError::InvalidTrials);
        }
        if self.settings.window_size == 0 {
            return Err(FortunaError::InvalidWindow);
        }

        info!(
            "Evaluating prediction model for {} on {} draws ({} trials, seed {})",
            self.lottery.id,
            draws.len(),
            trials,
            seed
        );

        let mut stages = StageTracker {
            current: EvaluationStage::Loading,
        };
        let mut rng = SeededGenerator::new(seed);

        match self.compare(draws, trials, seed, &mut rng, &mut stages) {
            Ok(result) => {
                stages.enter(EvaluationStage::Done);
                info!(
                    "Model {:.4} vs baseline {:.4} average matches (p = {:.4})",
                    result.avg_matches, result.baseline_avg, result.p_value
                );
                Ok(result)
            }
            Err(e) if e.is_recoverable_by_fallback() => {
                let failed_at = stages.current;
                warn!(
                    "{} failed during {}; falling back to random baseline",
                    e, failed_at
                );
                stages.enter(EvaluationStage::Fallback);
                self.fallback(draws, trials, seed, failed_at, e)
            }
            Err(e) => Err(e),
        }
    }

    /// Random-baseline summary over the full history, seeded with `seed`.
    pub fn baseline(
        &self,
        draws: &[Draw],
        trials: usize,
        seed: u64,
    ) -> FortunaResult<TrialSummary> {
        BaselineEvaluator::new(&self.lottery).evaluate(draws, trials, &mut SeededGenerator::new(seed))
    }

    fn compare(
        &self,
        draws: &[Draw],
        trials: usize,
        seed: u64,
        rng: &mut SeededGenerator,
        stages: &mut StageTracker,
    ) -> FortunaResult<EvaluationResult> {
        stages.enter(EvaluationStage::Splitting);
        let train_size = (draws.len() as f64 * TRAIN_FRACTION).floor() as usize;
        let (train, test) = draws.split_at(train_size);
        debug!(
            "Split {} draws into {} train / {} test",
            draws.len(),
            train.len(),
            test.len()
        );

        stages.enter(EvaluationStage::Training);
        let extractor = FeatureExtractor::for_lottery(&self.lottery, self.settings.window_size);
        let trainer = ModelTrainer::new(extractor.clone(), self.settings.forest);
        let model = trainer.train(train, rng)?;

        stages.enter(EvaluationStage::Sampling);
        let sampled = sample_test_indices(test.len(), trials, rng)?;

        stages.enter(EvaluationStage::Scoring);
        let window = extractor.window_size();
        let predictor = Predictor::new(extractor, self.lottery.count);
        let mut distribution = MatchDistribution::new(self.lottery.count);

        for (trial, idx) in sampled.into_iter().enumerate() {
            let target = &test[idx];
            let selection = match self.settings.context_mode {
                ContextMode::IncludeTarget => {
                    let context = include_target_context(train, target, window);
                    self.predict_or_random(&predictor, &model, &context, trial, rng)?
                }
                ContextMode::PrecedingOnly => {
                    let context = &draws[..train_size + idx];
                    self.predict_or_random(&predictor, &model, context, trial, rng)?
                }
            };
            distribution.record(target.count_matches(&selection));
        }

        stages.enter(EvaluationStage::Comparing);
        let baseline = self.baseline(draws, trials, seed)?;
        let p_value = p_value_better_than(&distribution.samples(), baseline.avg_matches);
        let model_summary = TrialSummary::from_distribution(distribution);

        Ok(EvaluationResult {
            avg_matches: model_summary.avg_matches,
            match_distribution: model_summary.match_distribution,
            match_probabilities: model_summary.match_probabilities,
            baseline_avg: baseline.avg_matches,
            p_value,
            trials,
            outcome: EvaluationOutcome::Compared,
        })
    }

    /// Prediction for the draw following `context`; a failed prediction is
    /// replaced with a uniform random selection.
    fn predict_or_random(
        &self,
        predictor: &Predictor,
        model: &TrainedModel,
        context: &[Draw],
        trial: usize,
        rng: &mut SeededGenerator,
    ) -> FortunaResult<Vec<u32>> {
        match predictor.predict(model, context, rng) {
            Ok(selection) => Ok(selection),
            Err(
                e @ (FortunaError::PredictionError { .. } | FortunaError::InsufficientData { .. }),
            ) => {
                warn!("Trial {}: {}; substituting a random selection", trial, e);
                rng.sample_unique(self.lottery.min, self.lottery.max, self.lottery.count)
            }
            Err(e) => Err(e),
        }
    }

    fn fallback(
        &self,
        draws: &[Draw],
        trials: usize,
        seed: u64,
        failed_at: EvaluationStage,
        cause: FortunaError,
    ) -> FortunaResult<EvaluationResult> {
        let baseline = self.baseline(draws, trials, seed)?;
        info!(
            "Fallback result: baseline {:.4} average matches for both sides",
            baseline.avg_matches
        );

        Ok(EvaluationResult {
            avg_matches: baseline.avg_matches,
            baseline_avg: baseline.avg_matches,
            match_distribution: baseline.match_distribution,
            match_probabilities: baseline.match_probabilities,
            p_value: 1.0,
            trials,
            outcome: EvaluationOutcome::Fallback {
                stage: failed_at,
                reason: cause.to_string(),
            },
        })
    }
}

/// The training segment extended with `target`, cut to the trailing
/// `window` training draws since nothing earlier reaches the features.
fn include_target_context(train: &[Draw], target: &Draw, window: usize) -> Vec<Draw> {
    let mut context = train[train.len().saturating_sub(window)..].to_vec();
    context.push(target.clone());
    context
}

/// `trials` indices into the test segment: without replacement when the
/// segment is large enough, otherwise with replacement.
fn sample_test_indices(
    test_len: usize,
    trials: usize,
    rng: &mut impl NumberGenerator,
) -> FortunaResult<Vec<usize>> {
    if test_len == 0 {
        return Err(FortunaError::InsufficientData {
            required: 1,
            available: 0,
        });
    }
    if test_len >= trials {
        rng.sample_indices(test_len, trials)
    } else {
        Ok((0..trials).map(|_| rng.index(test_len)).collect())
    }
}
