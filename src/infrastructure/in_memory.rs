use crate::domain::draw::Draw;
use crate::domain::errors::{FortunaError, FortunaResult};
use crate::domain::lottery::LotteryConfig;
use crate::domain::ports::DrawSource;
use std::collections::HashMap;

/// Draw history held in memory, keyed by lottery id.
/// Used for synthetic runs and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDrawSource {
    draws: HashMap<String, Vec<Draw>>,
}

impl InMemoryDrawSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draws(mut self, lottery_id: &str, draws: Vec<Draw>) -> Self {
        self.insert(lottery_id, draws);
        self
    }

    pub fn insert(&mut self, lottery_id: &str, draws: Vec<Draw>) {
        self.draws.insert(lottery_id.to_string(), draws);
    }
}

impl DrawSource for InMemoryDrawSource {
    fn load(&self, lottery: &LotteryConfig) -> FortunaResult<Vec<Draw>> {
        self.draws
            .get(&lottery.id)
            .cloned()
            .ok_or_else(|| FortunaError::DataUnavailable {
                lottery: lottery.id.clone(),
                reason: "no draws registered".to_string(),
            })
    }
}
