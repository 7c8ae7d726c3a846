use super::draw::Draw;
use super::errors::FortunaResult;
use super::lottery::LotteryConfig;

/// Supplies the historical draws of one lottery, oldest first.
pub trait DrawSource {
    fn load(&self, lottery: &LotteryConfig) -> FortunaResult<Vec<Draw>>;
}

/// Seedable uniform sampler. Every random choice in the engine goes through
/// an owned instance of this trait so that runs are reproducible.
pub trait NumberGenerator {
    /// `count` distinct values from `[min, max]`, sorted ascending.
    /// Fails with `RangeError` when the range holds fewer than `count` values.
    fn sample_unique(&mut self, min: u32, max: u32, count: usize) -> FortunaResult<Vec<u32>>;

    /// One value from `[min, max]`.
    fn sample(&mut self, min: u32, max: u32) -> u32;

    /// Uniform index into a collection of length `len` (`len > 0`).
    fn index(&mut self, len: usize) -> usize;

    /// `amount` distinct indices below `len`, in draw order.
    fn sample_indices(&mut self, len: usize, amount: usize) -> FortunaResult<Vec<usize>>;

    /// Uniform random permutation of `values`.
    fn shuffle(&mut self, values: &mut [usize]);

    /// Seed for a downstream component that keeps its own generator.
    fn next_seed(&mut self) -> u64;
}
