use serde::{Deserialize, Serialize};

/// Inclusive range of numbers a lottery draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: u32,
    pub max: u32,
}

impl NumberRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Number of distinct values in the range (0 when inverted).
    pub fn span(&self) -> usize {
        if self.max < self.min {
            0
        } else {
            (self.max - self.min) as usize + 1
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Secondary balls drawn from a separate pool (Powerball, EuroMillions stars).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialBalls {
    /// CSV column prefix, e.g. "Powerball" or "Star"
    pub label: String,
    pub min: u32,
    pub max: u32,
    pub count: usize,
}

impl SpecialBalls {
    pub fn range(&self) -> NumberRange {
        NumberRange::new(self.min, self.max)
    }
}

/// Shape of a lottery: how many numbers are drawn and from which range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryConfig {
    pub id: String,
    pub name: String,
    pub min: u32,
    pub max: u32,
    pub count: usize,
    #[serde(default)]
    pub special: Option<SpecialBalls>,
    pub file_name: String,
}

impl LotteryConfig {
    /// Plain `count`-from-`[min, max]` lottery without special balls.
    pub fn simple(id: &str, min: u32, max: u32, count: usize) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            min,
            max,
            count,
            special: None,
            file_name: format!("{}.csv", id),
        }
    }

    pub fn range(&self) -> NumberRange {
        NumberRange::new(self.min, self.max)
    }

    pub fn with_special(mut self, label: &str, min: u32, max: u32, count: usize) -> Self {
        self.special = Some(SpecialBalls {
            label: label.to_string(),
            min,
            max,
            count,
        });
        self
    }

    /// Built-in formats: Emirates Draw MEGA7/EASY6/FAST5, Powerball, EuroMillions, OMillionaire.
    pub fn builtin() -> Vec<LotteryConfig> {
        vec![
            Self::named("mega7", "Emirates Draw MEGA7", 1, 50, 7, "Emirates_Draw_MEGA7.csv"),
            Self::named("easy6", "Emirates Draw EASY6", 1, 45, 6, "Emirates_Draw_EASY6.csv"),
            Self::named("fast5", "Emirates Draw FAST5", 1, 45, 5, "Emirates_Draw_FAST5.csv"),
            Self::named("powerball", "Powerball USA", 1, 69, 5, "Powerball_USA.csv")
                .with_special("Powerball", 1, 26, 1),
            Self::named("euromillions", "EuroMillions", 1, 50, 5, "EuroMillions.csv")
                .with_special("Star", 1, 12, 2),
            Self::named("omillionaire", "OMillionaire", 1, 45, 6, "OMillionaire.csv"),
        ]
    }

    fn named(id: &str, name: &str, min: u32, max: u32, count: usize, file_name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            min,
            max,
            count,
            special: None,
            file_name: file_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_span() {
        assert_eq!(NumberRange::new(1, 49).span(), 49);
        assert_eq!(NumberRange::new(5, 5).span(), 1);
        assert_eq!(NumberRange::new(6, 5).span(), 0);
    }

    #[test]
    fn test_builtin_formats_are_drawable() {
        for lottery in LotteryConfig::builtin() {
            assert!(
                lottery.range().span() >= lottery.count,
                "{} draws more numbers than its range holds",
                lottery.id
            );
            if let Some(special) = &lottery.special {
                assert!(special.range().span() >= special.count);
            }
        }
    }

    #[test]
    fn test_euromillions_has_two_stars() {
        let euro = LotteryConfig::builtin()
            .into_iter()
            .find(|l| l.id == "euromillions")
            .unwrap();
        let stars = euro.special.unwrap();
        assert_eq!(stars.label, "Star");
        assert_eq!(stars.count, 2);
    }
}
