//! CSV-backed draw history.
//!
//! Each lottery lives in one file inside the data directory. The header row
//! must contain a `Date` column and either `Number1..NumberN` columns or a
//! single comma separated `Numbers` column. Special balls are read from
//! `<Label>` / `<Label>1..<Label>K` columns or a plural `<Label>s` column.

use crate::domain::draw::Draw;
use crate::domain::errors::{FortunaError, FortunaResult};
use crate::domain::lottery::LotteryConfig;
use crate::domain::ports::DrawSource;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%B %d, %Y",
];

pub struct CsvDrawSource {
    data_dir: PathBuf,
}

impl CsvDrawSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, lottery: &LotteryConfig) -> PathBuf {
        self.data_dir.join(&lottery.file_name)
    }

    fn read_file(&self, path: &Path, lottery: &LotteryConfig) -> FortunaResult<Vec<Draw>> {
        let unavailable = |reason: String| FortunaError::DataUnavailable {
            lottery: lottery.id.clone(),
            reason,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| unavailable(format!("cannot open {:?}: {}", path, e)))?;

        let headers = rdr
            .headers()
            .map_err(|e| unavailable(format!("cannot read header of {:?}: {}", path, e)))?
            .clone();

        let mut draws = Vec::new();
        let mut skipped = 0usize;

        for (line, record) in rdr.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!("Skipping unreadable row {} in {:?}: {}", line + 2, path, e);
                    skipped += 1;
                    continue;
                }
            };

            let row: HashMap<&str, &str> = headers.iter().zip(record.iter()).collect();
            match parse_row(&row, lottery) {
                Ok(draw) => draws.push(draw),
                Err(e) => {
                    warn!("Skipping row {} in {:?}: {}", line + 2, path, e);
                    skipped += 1;
                }
            }
        }

        if draws.iter().all(|d| d.date().is_some()) {
            // Stable: draws sharing a date keep file order
            draws.sort_by_key(|d| d.date());
        }

        info!(
            "Loaded {} {} draws from {:?} ({} rows skipped)",
            draws.len(),
            lottery.id,
            path,
            skipped
        );
        Ok(draws)
    }
}

impl DrawSource for CsvDrawSource {
    fn load(&self, lottery: &LotteryConfig) -> FortunaResult<Vec<Draw>> {
        let path = self.path_for(lottery);
        if !path.exists() {
            return Err(FortunaError::DataUnavailable {
                lottery: lottery.id.clone(),
                reason: format!("data file not found: {:?}", path),
            });
        }
        self.read_file(&path, lottery)
    }
}

/// Parses a date in any of the supported layouts.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok());
    if parsed.is_none() {
        debug!("Failed to parse date: {}", raw);
    }
    parsed
}

/// Parses a delimited list of integers such as `"3, 14, 15"`.
pub fn parse_numbers(raw: &str, delimiter: char) -> FortunaResult<Vec<u32>> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map_err(|_| FortunaError::InvalidDraw {
                lottery: String::new(),
                reason: format!("not a number: {:?}", s),
            })
        })
        .collect()
}

fn indexed_columns(
    row: &HashMap<&str, &str>,
    prefix: &str,
    count: usize,
) -> FortunaResult<Vec<u32>> {
    let mut values = Vec::with_capacity(count);
    for i in 1..=count {
        let key = format!("{}{}", prefix, i);
        if let Some(cell) = row.get(key.as_str()).filter(|c| !c.is_empty()) {
            values.extend(parse_numbers(cell, ',')?);
        }
    }
    Ok(values)
}

fn parse_row(row: &HashMap<&str, &str>, lottery: &LotteryConfig) -> FortunaResult<Draw> {
    let date = row.get("Date").and_then(|d| {
        let parsed = parse_date(d);
        if parsed.is_none() && !d.trim().is_empty() {
            warn!("Failed to parse date: {}", d);
        }
        parsed
    });

    let mut numbers = indexed_columns(row, "Number", lottery.count)?;
    if numbers.is_empty() {
        if let Some(cell) = row.get("Numbers") {
            numbers = parse_numbers(cell, ',')?;
        }
    }
    if numbers.is_empty() {
        return Err(FortunaError::InvalidDraw {
            lottery: lottery.id.clone(),
            reason: "no numbers found in row".to_string(),
        });
    }

    let mut special = Vec::new();
    if let Some(pool) = &lottery.special {
        if let Some(cell) = row.get(pool.label.as_str()).filter(|c| !c.is_empty()) {
            special = parse_numbers(cell, ',')?;
        }
        if special.is_empty() {
            special = indexed_columns(row, &pool.label, pool.count)?;
        }
        if special.is_empty() {
            let plural = format!("{}s", pool.label);
            if let Some(cell) = row.get(plural.as_str()) {
                special = parse_numbers(cell, ',')?;
            }
        }
    }

    Draw::new(lottery, date, numbers, special)
}
