use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Occurrence count per match count, for match counts `0..=draw_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDistribution {
    counts: Vec<usize>,
}

impl MatchDistribution {
    pub fn new(draw_size: usize) -> Self {
        Self {
            counts: vec![0; draw_size + 1],
        }
    }

    pub fn record(&mut self, matches: usize) {
        // A match count can never exceed the draw size
        let idx = matches.min(self.counts.len() - 1);
        self.counts[idx] += 1;
    }

    pub fn count(&self, matches: usize) -> usize {
        self.counts.get(matches).copied().unwrap_or(0)
    }

    pub fn draw_size(&self) -> usize {
        self.counts.len() - 1
    }

    /// Number of recorded trials.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn total_matches(&self) -> usize {
        self.counts.iter().enumerate().map(|(k, c)| k * c).sum()
    }

    pub fn average(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.total_matches() as f64 / total as f64
    }

    pub fn probabilities(&self) -> BTreeMap<usize, f64> {
        let total = self.total();
        self.counts
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let p = if total == 0 {
                    0.0
                } else {
                    *c as f64 / total as f64
                };
                (k, p)
            })
            .collect()
    }

    /// Flattens the distribution back into one value per trial.
    pub fn samples(&self) -> Vec<f64> {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(k, c)| std::iter::repeat_n(k as f64, *c))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().copied().enumerate()
    }
}

/// Outcome of one batch of random or predicted picks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub avg_matches: f64,
    pub match_distribution: MatchDistribution,
    pub match_probabilities: BTreeMap<usize, f64>,
}

impl TrialSummary {
    pub fn from_distribution(match_distribution: MatchDistribution) -> Self {
        Self {
            avg_matches: match_distribution.average(),
            match_probabilities: match_distribution.probabilities(),
            match_distribution,
        }
    }

    pub fn trials(&self) -> usize {
        self.match_distribution.total()
    }
}

/// Stages of one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationStage {
    Loading,
    Splitting,
    Training,
    Sampling,
    Scoring,
    Comparing,
    Done,
    Fallback,
}

impl fmt::Display for EvaluationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvaluationStage::Loading => "LOADING",
            EvaluationStage::Splitting => "SPLITTING",
            EvaluationStage::Training => "TRAINING",
            EvaluationStage::Sampling => "SAMPLING",
            EvaluationStage::Scoring => "SCORING",
            EvaluationStage::Comparing => "COMPARING",
            EvaluationStage::Done => "DONE",
            EvaluationStage::Fallback => "FALLBACK",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    /// Model predictions were scored and tested against the baseline.
    Compared,
    /// Training could not proceed; both figures come from the random baseline.
    Fallback { stage: EvaluationStage, reason: String },
}

/// Model-versus-baseline comparison returned by the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub avg_matches: f64,
    pub match_distribution: MatchDistribution,
    pub match_probabilities: BTreeMap<usize, f64>,
    pub baseline_avg: f64,
    pub p_value: f64,
    pub trials: usize,
    pub outcome: EvaluationOutcome,
}

impl EvaluationResult {
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, EvaluationOutcome::Fallback { .. })
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value <= alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_totals() {
        let mut dist = MatchDistribution::new(6);
        for m in [0, 1, 1, 2, 0, 1] {
            dist.record(m);
        }

        assert_eq!(dist.total(), 6);
        assert_eq!(dist.total_matches(), 5);
        assert!((dist.average() - 5.0 / 6.0).abs() < 1e-12);
        assert_eq!(dist.count(1), 3);
        assert_eq!(dist.count(6), 0);
        assert_eq!(dist.iter().count(), 7);
    }

    #[test]
    fn test_probabilities_cover_every_match_count() {
        let mut dist = MatchDistribution::new(5);
        dist.record(0);
        dist.record(2);

        let probs = dist.probabilities();
        assert_eq!(probs.len(), 6);
        assert_eq!(probs[&0], 0.5);
        assert_eq!(probs[&2], 0.5);
        assert_eq!(probs[&5], 0.0);
    }

    #[test]
    fn test_samples_flatten_distribution() {
        let mut dist = MatchDistribution::new(3);
        dist.record(0);
        dist.record(2);
        dist.record(2);

        let mut samples = dist.samples();
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(samples, vec![0.0, 2.0, 2.0]);
    }

    #[test]
    fn test_empty_distribution_average_is_zero() {
        let dist = MatchDistribution::new(6);
        assert_eq!(dist.average(), 0.0);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(EvaluationStage::Fallback.to_string(), "FALLBACK");
        assert_eq!(EvaluationStage::Comparing.to_string(), "COMPARING");
    }
}
