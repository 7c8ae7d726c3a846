//! Lottery catalog: the built-in formats plus any loaded from TOML.
//!
//! ```toml
//! [[lottery]]
//! id = "lotto"
//! name = "Lotto 6/49"
//! min = 1
//! max = 49
//! count = 6
//! file_name = "lotto.csv"
//! ```

use crate::domain::errors::{FortunaError, FortunaResult};
use crate::domain::lottery::LotteryConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "lottery")]
    lotteries: Vec<LotteryConfig>,
}

#[derive(Debug, Clone)]
pub struct LotteryCatalog {
    lotteries: Vec<LotteryConfig>,
}

impl Default for LotteryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LotteryCatalog {
    pub fn builtin() -> Self {
        Self {
            lotteries: LotteryConfig::builtin(),
        }
    }

    /// Built-in formats extended (or overridden by id) from a TOML file.
    pub fn with_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let mut catalog = Self::builtin();
        catalog
            .merge_toml(&content)
            .with_context(|| format!("Invalid catalog {}", path.display()))?;
        Ok(catalog)
    }

    pub fn merge_toml(&mut self, content: &str) -> Result<usize> {
        let file: CatalogFile = toml::from_str(content).context("Failed to parse catalog TOML")?;
        let added = file.lotteries.len();
        for lottery in file.lotteries {
            validate(&lottery)?;
            info!("Catalog entry {} ({})", lottery.id, lottery.name);
            self.insert(lottery);
        }
        Ok(added)
    }

    pub fn insert(&mut self, lottery: LotteryConfig) {
        match self.lotteries.iter_mut().find(|l| l.id == lottery.id) {
            Some(existing) => *existing = lottery,
            None => self.lotteries.push(lottery),
        }
    }

    pub fn find(&self, id: &str) -> FortunaResult<&LotteryConfig> {
        let wanted = id.to_lowercase();
        self.lotteries
            .iter()
            .find(|l| l.id.to_lowercase() == wanted)
            .ok_or_else(|| FortunaError::UnknownLottery(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.lotteries.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LotteryConfig> {
        self.lotteries.iter()
    }
}

fn validate(lottery: &LotteryConfig) -> Result<()> {
    if lottery.id.trim().is_empty() {
        anyhow::bail!("Lottery id must not be empty");
    }
    if lottery.count == 0 || lottery.min > lottery.max || lottery.count > lottery.range().span() {
        anyhow::bail!(
            "Lottery {}: cannot draw {} distinct numbers from [{}, {}]",
            lottery.id,
            lottery.count,
            lottery.min,
            lottery.max
        );
    }
    if let Some(special) = &lottery.special
        && (special.count == 0
            || special.min > special.max
            || special.count > special.range().span())
    {
        anyhow::bail!(
            "Lottery {}: cannot draw {} {} numbers from [{}, {}]",
            lottery.id,
            special.count,
            special.label,
            special.min,
            special.max
        );
    }
    Ok(())
}
