use crate::domain::errors::{FortunaError, FortunaResult};
use crate::domain::ports::NumberGenerator;
use rand::rngs::StdRng;
use rand::seq::{SliceRandom, index};
use rand::{Rng, SeedableRng};

/// Uniform sampler backed by an owned `StdRng`.
/// Two generators built from the same seed produce the same sequence.
#[derive(Debug, Clone)]
pub struct SeededGenerator {
    rng: StdRng,
}

impl SeededGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from the operating system; used when the caller gives no seed.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl NumberGenerator for SeededGenerator {
    fn sample_unique(&mut self, min: u32, max: u32, count: usize) -> FortunaResult<Vec<u32>> {
        let span = if max < min {
            0
        } else {
            (max - min) as usize + 1
        };
        if count > span {
            return Err(FortunaError::RangeError { min, max, count });
        }

        let mut picked: Vec<u32> = index::sample(&mut self.rng, span, count)
            .into_iter()
            .map(|offset| min + offset as u32)
            .collect();
        picked.sort_unstable();
        Ok(picked)
    }

    fn sample(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    fn sample_indices(&mut self, len: usize, amount: usize) -> FortunaResult<Vec<usize>> {
        if amount > len {
            return Err(FortunaError::InsufficientData {
                required: amount,
                available: len,
            });
        }
        Ok(index::sample(&mut self.rng, len, amount).into_vec())
    }

    fn shuffle(&mut self, values: &mut [usize]) {
        values.shuffle(&mut self.rng);
    }

    fn next_seed(&mut self) -> u64 {
        self.rng.random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_unique_range_error() {
        let mut rng = SeededGenerator::new(7);
        let err = rng.sample_unique(1, 5, 10).unwrap_err();
        assert_eq!(
            err,
            FortunaError::RangeError {
                min: 1,
                max: 5,
                count: 10
            }
        );
    }

    #[test]
    fn test_sample_unique_is_sorted_and_in_range() {
        let mut rng = SeededGenerator::new(42);
        for _ in 0..200 {
            let picks = rng.sample_unique(1, 49, 6).unwrap();
            assert_eq!(picks.len(), 6);
            assert!(picks.windows(2).all(|w| w[0] < w[1]));
            assert!(picks.iter().all(|n| (1..=49).contains(n)));
        }
    }

    #[test]
    fn test_sample_unique_full_range() {
        let mut rng = SeededGenerator::new(3);
        let picks = rng.sample_unique(10, 14, 5).unwrap();
        assert_eq!(picks, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededGenerator::new(99);
        let mut b = SeededGenerator::new(99);
        for _ in 0..50 {
            assert_eq!(a.sample(1, 45), b.sample(1, 45));
            assert_eq!(
                a.sample_unique(1, 45, 5).unwrap(),
                b.sample_unique(1, 45, 5).unwrap()
            );
            assert_eq!(a.next_seed(), b.next_seed());
        }
    }

    #[test]
    fn test_sample_bounds() {
        let mut rng = SeededGenerator::new(11);
        for _ in 0..500 {
            let v = rng.sample(3, 8);
            assert!((3..=8).contains(&v), "{} out of [3, 8]", v);
        }
        assert_eq!(rng.sample(4, 4), 4);
    }

    #[test]
    fn test_sample_indices_without_replacement() {
        let mut rng = SeededGenerator::new(5);
        let mut idx = rng.sample_indices(20, 20).unwrap();
        idx.sort_unstable();
        assert_eq!(idx, (0..20).collect::<Vec<_>>());

        assert!(rng.sample_indices(3, 4).is_err());
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SeededGenerator::new(8);
        let mut values: Vec<usize> = (0..30).collect();
        rng.shuffle(&mut values);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..30).collect::<Vec<_>>());
    }
}
