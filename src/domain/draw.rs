use super::errors::{FortunaError, FortunaResult};
use super::lottery::{LotteryConfig, NumberRange};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One historical lottery outcome.
///
/// Construction goes through [`Draw::new`], which enforces the lottery's
/// draw size and range and keeps `numbers` strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    date: Option<NaiveDate>,
    numbers: Vec<u32>,
    special: Vec<u32>,
    lottery_id: String,
}

impl Draw {
    pub fn new(
        lottery: &LotteryConfig,
        date: Option<NaiveDate>,
        mut numbers: Vec<u32>,
        mut special: Vec<u32>,
    ) -> FortunaResult<Self> {
        let invalid = |reason: String| FortunaError::InvalidDraw {
            lottery: lottery.id.clone(),
            reason,
        };

        if numbers.len() != lottery.count {
            return Err(invalid(format!(
                "expected {} numbers, got {}",
                lottery.count,
                numbers.len()
            )));
        }

        numbers.sort_unstable();
        validate_pool(&numbers, lottery.range()).map_err(invalid)?;

        if !special.is_empty() {
            let Some(pool) = &lottery.special else {
                return Err(invalid("lottery has no special balls".to_string()));
            };
            if special.len() != pool.count {
                return Err(invalid(format!(
                    "expected {} {} values, got {}",
                    pool.count,
                    pool.label,
                    special.len()
                )));
            }
            special.sort_unstable();
            validate_pool(&special, pool.range()).map_err(invalid)?;
        }

        Ok(Self {
            date,
            numbers,
            special,
            lottery_id: lottery.id.clone(),
        })
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Main numbers, strictly increasing.
    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    pub fn special(&self) -> &[u32] {
        &self.special
    }

    pub fn lottery_id(&self) -> &str {
        &self.lottery_id
    }

    /// Size of the intersection between this draw and a selection.
    pub fn count_matches(&self, selection: &[u32]) -> usize {
        selection
            .iter()
            .filter(|n| self.numbers.binary_search(n).is_ok())
            .count()
    }
}

fn validate_pool(sorted: &[u32], range: NumberRange) -> Result<(), String> {
    if let Some(out) = sorted.iter().find(|n| !range.contains(**n)) {
        return Err(format!(
            "{} outside [{}, {}]",
            out, range.min, range.max
        ));
    }
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return Err(format!("duplicate numbers in {:?}", sorted));
    }
    Ok(())
}
