//! Configuration loading for Fortuna.
//!
//! Values come from `.env` (via dotenvy) and the process environment, each
//! with a default. Malformed values are errors rather than silently ignored.

mod catalog;

pub use catalog::LotteryCatalog;

use crate::application::evaluator::{ContextMode, EvaluationSettings};
use crate::application::features::DEFAULT_WINDOW_SIZE;
use crate::application::ml::ForestParams;
use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub evaluation: EvaluationSettings,
    /// p-value at or below which the model counts as better than random
    pub significance: f64,
    pub auto_generate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            evaluation: EvaluationSettings::default(),
            significance: DEFAULT_SIGNIFICANCE,
            auto_generate: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ForestParams::default();

        let data_dir = lookup("FORTUNA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let window_size = parse_or(&lookup, "FORTUNA_WINDOW_SIZE", DEFAULT_WINDOW_SIZE)?;
        if window_size == 0 {
            anyhow::bail!("FORTUNA_WINDOW_SIZE must be at least 1");
        }

        let forest = ForestParams {
            n_trees: parse_or(&lookup, "FORTUNA_N_TREES", defaults.n_trees)?,
            max_depth: parse_or(&lookup, "FORTUNA_MAX_DEPTH", defaults.max_depth)?,
            min_samples_split: parse_or(
                &lookup,
                "FORTUNA_MIN_SAMPLES_SPLIT",
                defaults.min_samples_split,
            )?,
        };
        if forest.n_trees == 0 {
            anyhow::bail!("FORTUNA_N_TREES must be at least 1");
        }

        let significance = parse_or(&lookup, "FORTUNA_SIGNIFICANCE", DEFAULT_SIGNIFICANCE)?;
        if !(significance > 0.0 && significance < 1.0) {
            anyhow::bail!(
                "FORTUNA_SIGNIFICANCE must be in (0, 1), got {}",
                significance
            );
        }

        let auto_generate = parse_or(&lookup, "FORTUNA_AUTO_GENERATE", false)?;
        let context_mode = parse_or(&lookup, "FORTUNA_CONTEXT_MODE", ContextMode::default())?;

        Ok(Self {
            data_dir,
            evaluation: EvaluationSettings {
                window_size,
                forest,
                context_mode,
            },
            significance,
            auto_generate,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}={}: {}", key, raw, e)),
        None => Ok(default),
    }
}
