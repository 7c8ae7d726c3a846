use super::trainer::TrainedModel;
use crate::application::features::FeatureExtractor;
use crate::domain::draw::Draw;
use crate::domain::errors::{FortunaError, FortunaResult};
use crate::domain::lottery::NumberRange;
use crate::domain::ports::NumberGenerator;
use std::collections::BTreeSet;

/// Turns continuous model output into a valid lottery selection.
pub struct Predictor {
    extractor: FeatureExtractor,
    count: usize,
}

impl Predictor {
    pub fn new(extractor: FeatureExtractor, count: usize) -> Self {
        Self { extractor, count }
    }

    /// Predicts the draw following `history` from its last `window_size` draws.
    pub fn predict(
        &self,
        model: &TrainedModel,
        history: &[Draw],
        rng: &mut impl NumberGenerator,
    ) -> FortunaResult<Vec<u32>> {
        let features = self.extractor.latest(history)?;
        let raw = model.predict(&features)?;

        let window = &history[history.len() - self.extractor.window_size()..];
        let observed = observed_range(window).ok_or_else(|| FortunaError::PredictionError {
            reason: "window holds no numbers".to_string(),
        })?;

        to_selection(&raw, observed, self.count, rng)
    }
}

fn observed_range(window: &[Draw]) -> Option<NumberRange> {
    let mut numbers = window.iter().flat_map(|d| d.numbers().iter().copied());
    let first = numbers.next()?;
    let (min, max) = numbers.fold((first, first), |(lo, hi), n| (lo.min(n), hi.max(n)));
    Some(NumberRange::new(min, max))
}

/// Rounds, clamps into `range` and deduplicates `raw`, then tops up with
/// uniform picks or drops the largest values until exactly `count` remain.
pub fn to_selection(
    raw: &[f64],
    range: NumberRange,
    count: usize,
    rng: &mut impl NumberGenerator,
) -> FortunaResult<Vec<u32>> {
    if range.span() < count {
        return Err(FortunaError::PredictionError {
            reason: format!(
                "range [{}, {}] cannot hold {} distinct numbers",
                range.min, range.max, count
            ),
        });
    }

    let mut picks = BTreeSet::new();
    for value in raw {
        if !value.is_finite() {
            return Err(FortunaError::PredictionError {
                reason: format!("non-finite prediction {}", value),
            });
        }
        let rounded = value.round().clamp(range.min as f64, range.max as f64) as u32;
        picks.insert(rounded);
    }

    while picks.len() < count {
        picks.insert(rng.sample(range.min, range.max));
    }

    Ok(picks.into_iter().take(count).collect())
}
