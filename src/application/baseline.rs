use crate::domain::draw::Draw;
use crate::domain::errors::{FortunaError, FortunaResult};
use crate::domain::evaluation::{MatchDistribution, TrialSummary};
use crate::domain::lottery::LotteryConfig;
use crate::domain::ports::NumberGenerator;
use tracing::debug;

/// Scores purely random selections against historical draws.
pub struct BaselineEvaluator<'a> {
    lottery: &'a LotteryConfig,
}

impl<'a> BaselineEvaluator<'a> {
    pub fn new(lottery: &'a LotteryConfig) -> Self {
        Self { lottery }
    }

    /// Each trial picks a historical draw (with replacement) and an
    /// independent random selection, then records their overlap.
    pub fn evaluate(
        &self,
        draws: &[Draw],
        trials: usize,
        rng: &mut impl NumberGenerator,
    ) -> FortunaResult<TrialSummary> {
        if draws.is_empty() {
            return Err(FortunaError::InsufficientData {
                required: 1,
                available: 0,
            });
        }

        let mut distribution = MatchDistribution::new(self.lottery.count);
        for _ in 0..trials {
            let draw = &draws[rng.index(draws.len())];
            let selection =
                rng.sample_unique(self.lottery.min, self.lottery.max, self.lottery.count)?;
            distribution.record(draw.count_matches(&selection));
        }

        let summary = TrialSummary::from_distribution(distribution);
        debug!(
            "Random baseline over {} trials: {:.4} average matches",
            trials, summary.avg_matches
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rng::SeededGenerator;
    use crate::infrastructure::synthetic::generate_draws;

    fn lotto() -> LotteryConfig {
        LotteryConfig::simple("lotto", 1, 49, 6)
    }

    #[test]
    fn test_baseline_average_near_hypergeometric_mean() {
        let lottery = lotto();
        let draws = generate_draws(&lottery, 100, &mut SeededGenerator::new(42)).unwrap();

        let summary = BaselineEvaluator::new(&lottery)
            .evaluate(&draws, 1000, &mut SeededGenerator::new(42))
            .unwrap();

        // 6 * 6 / 49 ~= 0.735
        assert!(
            (0.5..=1.0).contains(&summary.avg_matches),
            "baseline average {} outside [0.5, 1.0]",
            summary.avg_matches
        );
    }

    #[test]
    fn test_distribution_sums_to_trials() {
        let lottery = lotto();
        let draws = generate_draws(&lottery, 50, &mut SeededGenerator::new(1)).unwrap();

        let summary = BaselineEvaluator::new(&lottery)
            .evaluate(&draws, 337, &mut SeededGenerator::new(2))
            .unwrap();

        assert_eq!(summary.trials(), 337);
        let weighted: usize = summary.match_distribution.iter().map(|(k, c)| k * c).sum();
        assert!((summary.avg_matches - weighted as f64 / 337.0).abs() < 1e-12);
        let prob_sum: f64 = summary.match_probabilities.values().sum();
        assert!((prob_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_distribution() {
        let lottery = lotto();
        let draws = generate_draws(&lottery, 50, &mut SeededGenerator::new(1)).unwrap();
        let evaluator = BaselineEvaluator::new(&lottery);

        for seed in [0, 1, 42, 9_999] {
            let a = evaluator
                .evaluate(&draws, 200, &mut SeededGenerator::new(seed))
                .unwrap();
            let b = evaluator
                .evaluate(&draws, 200, &mut SeededGenerator::new(seed))
                .unwrap();
            assert_eq!(a.match_distribution, b.match_distribution);
        }
    }

    #[test]
    fn test_empty_history_is_insufficient() {
        let lottery = lotto();
        let err = BaselineEvaluator::new(&lottery)
            .evaluate(&[], 10, &mut SeededGenerator::new(1))
            .unwrap_err();
        assert!(matches!(err, FortunaError::InsufficientData { .. }));
    }

    #[test]
    fn test_impossible_lottery_propagates_range_error() {
        let broken = LotteryConfig::simple("broken", 1, 5, 10);
        let valid = lotto();
        let draws = generate_draws(&valid, 5, &mut SeededGenerator::new(1)).unwrap();

        let err = BaselineEvaluator::new(&broken)
            .evaluate(&draws, 10, &mut SeededGenerator::new(1))
            .unwrap_err();
        assert!(matches!(err, FortunaError::RangeError { .. }));
    }
}
