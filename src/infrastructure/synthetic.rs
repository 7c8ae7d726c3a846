//! Synthetic draw histories for demos and tests.

use crate::domain::draw::Draw;
use crate::domain::errors::FortunaResult;
use crate::domain::lottery::LotteryConfig;
use crate::domain::ports::NumberGenerator;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Weekly draws starting 2020-01-01, main and special numbers drawn uniformly.
pub fn generate_draws(
    lottery: &LotteryConfig,
    num_draws: usize,
    rng: &mut impl NumberGenerator,
) -> FortunaResult<Vec<Draw>> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
    let mut draws = Vec::with_capacity(num_draws);

    for i in 0..num_draws {
        let date = start + Duration::days(i as i64 * 7);
        let numbers = rng.sample_unique(lottery.min, lottery.max, lottery.count)?;
        let special = match &lottery.special {
            Some(pool) => rng.sample_unique(pool.min, pool.max, pool.count)?,
            None => Vec::new(),
        };
        draws.push(Draw::new(lottery, Some(date), numbers, special)?);
    }

    Ok(draws)
}

/// Writes draws in the layout `CsvDrawSource` reads back.
pub fn write_csv(lottery: &LotteryConfig, draws: &[Draw], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut wtr = csv::Writer::from_writer(file);

    let mut header = vec!["Date".to_string()];
    header.extend((1..=lottery.count).map(|i| format!("Number{}", i)));
    if let Some(pool) = &lottery.special {
        if pool.count == 1 {
            header.push(pool.label.clone());
        } else {
            header.extend((1..=pool.count).map(|i| format!("{}{}", pool.label, i)));
        }
    }
    wtr.write_record(&header)?;

    for draw in draws {
        let mut row = vec![
            draw.date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ];
        row.extend(draw.numbers().iter().map(|n| n.to_string()));
        row.extend(draw.special().iter().map(|n| n.to_string()));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    info!("Saved {} synthetic {} draws to {:?}", draws.len(), lottery.id, path);
    Ok(())
}

/// Generates a data file for every lottery whose file is missing.
/// Returns the paths that were written.
pub fn ensure_data_files(
    data_dir: &Path,
    lotteries: &[LotteryConfig],
    num_draws: usize,
    rng: &mut impl NumberGenerator,
) -> Result<Vec<PathBuf>> {
    if !data_dir.exists() {
        info!("Creating data directory {:?}", data_dir);
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;
    }

    let mut written = Vec::new();
    for lottery in lotteries {
        let path = data_dir.join(&lottery.file_name);
        if path.exists() {
            continue;
        }
        info!("Generating synthetic data for {}", lottery.id);
        let draws = generate_draws(lottery, num_draws, rng)?;
        write_csv(lottery, &draws, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::DrawSource;
    use crate::infrastructure::csv_source::CsvDrawSource;
    use crate::infrastructure::rng::SeededGenerator;

    #[test]
    fn test_generate_draws_shape() {
        let lottery = LotteryConfig::simple("lotto", 1, 49, 6);
        let mut rng = SeededGenerator::new(1);
        let draws = generate_draws(&lottery, 12, &mut rng).unwrap();

        assert_eq!(draws.len(), 12);
        for draw in &draws {
            assert_eq!(draw.numbers().len(), 6);
            assert!(draw.numbers().windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(
            draws[1].date().unwrap() - draws[0].date().unwrap(),
            Duration::days(7)
        );
    }

    #[test]
    fn test_generate_draws_is_deterministic() {
        let lottery = LotteryConfig::simple("lotto", 1, 49, 6);
        let a = generate_draws(&lottery, 20, &mut SeededGenerator::new(42)).unwrap();
        let b = generate_draws(&lottery, 20, &mut SeededGenerator::new(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_csv_written_can_be_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let powerball = LotteryConfig::builtin()
            .into_iter()
            .find(|l| l.id == "powerball")
            .unwrap();
        let mut rng = SeededGenerator::new(9);
        let draws = generate_draws(&powerball, 15, &mut rng).unwrap();

        write_csv(&powerball, &draws, &dir.path().join(&powerball.file_name)).unwrap();
        let loaded = CsvDrawSource::new(dir.path()).load(&powerball).unwrap();

        assert_eq!(loaded, draws);
    }

    #[test]
    fn test_ensure_data_files_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let lotteries = LotteryConfig::builtin();
        let mut rng = SeededGenerator::new(42);

        let first = ensure_data_files(dir.path(), &lotteries, 30, &mut rng).unwrap();
        assert_eq!(first.len(), lotteries.len());

        let second = ensure_data_files(dir.path(), &lotteries, 30, &mut rng).unwrap();
        assert!(second.is_empty());
    }
}
