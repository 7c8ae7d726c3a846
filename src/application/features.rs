//! Sliding-window feature extraction over a draw history.
//!
//! Layout of one feature vector (constant for a given lottery and window):
//!
//! | block                 | width                  |
//! |-----------------------|------------------------|
//! | per-position mean     | `count`                |
//! | number frequency      | `max - min + 1`        |
//! | per-draw mean/std/skew| `3 * window_size`      |
//! | date flag/month/day   | `3`                    |

use super::statistics::population_moments;
use crate::domain::draw::Draw;
use crate::domain::errors::{FortunaError, FortunaResult};
use crate::domain::lottery::{LotteryConfig, NumberRange};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_SIZE: usize = 5;
const DATE_BLOCK_WIDTH: usize = 3;

/// Fixed-width numeric description of `window_size` consecutive draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// Row-aligned features and next-draw targets.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<Vec<f64>>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureExtractor {
    window_size: usize,
    range: NumberRange,
    count: usize,
}

impl FeatureExtractor {
    pub fn new(window_size: usize, range: NumberRange, count: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            range,
            count,
        }
    }

    pub fn for_lottery(lottery: &LotteryConfig, window_size: usize) -> Self {
        Self::new(window_size, lottery.range(), lottery.count)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn width(&self) -> usize {
        self.count + self.range.span() + 3 * self.window_size + DATE_BLOCK_WIDTH
    }

    fn ensure_enough(&self, available: usize) -> FortunaResult<()> {
        let required = self.window_size + 1;
        if available < required {
            return Err(FortunaError::InsufficientData {
                required,
                available,
            });
        }
        Ok(())
    }

    /// One row per draw `i >= window_size`, built from draws `i - window_size..i`
    /// and targeting draw `i`.
    pub fn extract(&self, draws: &[Draw]) -> FortunaResult<FeatureSet> {
        self.ensure_enough(draws.len())?;

        let rows = draws.len() - self.window_size;
        let mut set = FeatureSet {
            features: Vec::with_capacity(rows),
            targets: Vec::with_capacity(rows),
        };

        for i in self.window_size..draws.len() {
            set.features
                .push(self.window_vector(&draws[i - self.window_size..i]));
            set.targets
                .push(draws[i].numbers().iter().map(|n| *n as f64).collect());
        }

        Ok(set)
    }

    /// Features for predicting the draw that follows `history`, built from
    /// its last `window_size` draws.
    pub fn latest(&self, history: &[Draw]) -> FortunaResult<FeatureVector> {
        self.ensure_enough(history.len())?;
        Ok(self.window_vector(&history[history.len() - self.window_size..]))
    }

    fn window_vector(&self, window: &[Draw]) -> FeatureVector {
        let mut v = Vec::with_capacity(self.width());
        let w = window.len() as f64;

        for pos in 0..self.count {
            let sum: f64 = window
                .iter()
                .filter_map(|d| d.numbers().get(pos))
                .map(|n| *n as f64)
                .sum();
            v.push(sum / w);
        }

        let mut freq = vec![0usize; self.range.span()];
        let mut total = 0usize;
        for n in window.iter().flat_map(|d| d.numbers()) {
            total += 1;
            if self.range.contains(*n) {
                freq[(*n - self.range.min) as usize] += 1;
            }
        }
        let total = total.max(1) as f64;
        v.extend(freq.iter().map(|c| *c as f64 / total));

        for draw in window {
            let values: Vec<f64> = draw.numbers().iter().map(|n| *n as f64).collect();
            let m = population_moments(&values);
            v.extend([m.mean, m.std_dev, m.skewness]);
        }

        let all_dated = window.iter().all(|d| d.date().is_some());
        match window.last().and_then(|d| d.date()) {
            Some(date) if all_dated => v.extend([
                1.0,
                date.month() as f64 / 12.0,
                date.day() as f64 / 31.0,
            ]),
            _ => v.extend([0.0; DATE_BLOCK_WIDTH]),
        }

        FeatureVector(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rng::SeededGenerator;
    use crate::infrastructure::synthetic::generate_draws;
    use chrono::NaiveDate;

    fn lotto() -> LotteryConfig {
        LotteryConfig::simple("lotto", 1, 49, 6)
    }

    fn draw(numbers: &[u32], date: Option<NaiveDate>) -> Draw {
        Draw::new(&lotto(), date, numbers.to_vec(), vec![]).unwrap()
    }

    #[test]
    fn test_twelve_draws_window_five_yields_seven_rows() {
        let mut rng = SeededGenerator::new(1);
        let draws = generate_draws(&lotto(), 12, &mut rng).unwrap();
        let extractor = FeatureExtractor::for_lottery(&lotto(), 5);

        let set = extractor.extract(&draws).unwrap();
        assert_eq!(set.features.len(), 7);
        assert_eq!(set.targets.len(), 7);
        assert_eq!(set.targets[0], draws[5].numbers().iter().map(|n| *n as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_width_is_constant() {
        let mut rng = SeededGenerator::new(3);
        let mut draws = generate_draws(&lotto(), 20, &mut rng).unwrap();
        // Undated draws mixed in must not change the width
        draws[10] = draw(&[1, 2, 3, 4, 5, 6], None);
        let extractor = FeatureExtractor::for_lottery(&lotto(), 5);

        let set = extractor.extract(&draws).unwrap();
        assert_eq!(extractor.width(), 6 + 49 + 15 + 3);
        assert!(set.features.iter().all(|f| f.len() == extractor.width()));
    }

    #[test]
    fn test_insufficient_draws() {
        let extractor = FeatureExtractor::for_lottery(&lotto(), 5);
        let draws: Vec<Draw> = (0..5).map(|_| draw(&[1, 2, 3, 4, 5, 6], None)).collect();

        assert_eq!(
            extractor.extract(&draws).unwrap_err(),
            FortunaError::InsufficientData {
                required: 6,
                available: 5
            }
        );
        assert!(extractor.latest(&draws).is_err());
    }

    #[test]
    fn test_feature_blocks() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        let window = vec![
            draw(&[1, 2, 3, 4, 5, 6], Some(date)),
            draw(&[1, 2, 3, 4, 5, 12], Some(date)),
            draw(&[7, 8, 9, 10, 11, 12], Some(date)),
        ];
        let extractor = FeatureExtractor::for_lottery(&lotto(), 2);
        let v = extractor.latest(&window).unwrap();
        let v = v.as_slice();

        // Per-position means of the last two draws
        assert_eq!(v[0], 4.0);
        assert_eq!(v[5], 12.0);
        // Frequency of 12 appears in both draws of the window: 2 / 12
        let freq_12 = v[6 + 11];
        assert!((freq_12 - 2.0 / 12.0).abs() < 1e-12);
        // Number 49 never appears
        assert_eq!(v[6 + 48], 0.0);
        // Date block
        let n = v.len();
        assert_eq!(v[n - 3], 1.0);
        assert!((v[n - 2] - 0.5).abs() < 1e-12);
        assert!((v[n - 1] - 15.0 / 31.0).abs() < 1e-12);
    }

    #[test]
    fn test_date_block_zeroed_when_any_draw_undated() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        let history = vec![
            draw(&[1, 2, 3, 4, 5, 6], Some(date)),
            draw(&[1, 2, 3, 4, 5, 6], None),
            draw(&[1, 2, 3, 4, 5, 6], Some(date)),
        ];
        let extractor = FeatureExtractor::for_lottery(&lotto(), 2);
        let v = extractor.latest(&history).unwrap();
        let tail = &v.as_slice()[v.len() - 3..];
        assert_eq!(tail, &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_features_never_nan() {
        let mut rng = SeededGenerator::new(17);
        let draws = generate_draws(&lotto(), 30, &mut rng).unwrap();
        let extractor = FeatureExtractor::for_lottery(&lotto(), 5);
        let set = extractor.extract(&draws).unwrap();
        assert!(
            set.features
                .iter()
                .all(|f| f.as_slice().iter().all(|x| x.is_finite()))
        );
    }
}
