//! Fortuna CLI
//!
//! Evaluates whether a learned model predicts lottery draws better than
//! random selection, generates random selections and writes synthetic data.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fortuna::application::evaluator::{ContextMode, Evaluator};
use fortuna::config::{Config, LotteryCatalog};
use fortuna::domain::draw::Draw;
use fortuna::domain::evaluation::EvaluationResult;
use fortuna::domain::lottery::LotteryConfig;
use fortuna::domain::ports::{DrawSource, NumberGenerator};
use fortuna::infrastructure::csv_source::CsvDrawSource;
use fortuna::infrastructure::rng::SeededGenerator;
use fortuna::infrastructure::synthetic;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

const AUTO_GENERATED_DRAWS: usize = 200;

#[derive(Parser)]
#[command(author, version, about = "Lottery prediction versus random selection", long_about = None)]
struct Cli {
    /// TOML file extending the built-in lottery catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the prediction model with random selection
    EvaluateModel {
        /// Lottery id (mega7, easy6, fast5, powerball, euromillions, omillionaire)
        #[arg(short, long, default_value = "mega7")]
        lottery: String,

        /// Number of evaluation trials
        #[arg(short, long, default_value = "1000")]
        trials: usize,

        /// Seed for every random choice of the run
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Draws per feature window (overrides FORTUNA_WINDOW_SIZE)
        #[arg(short, long)]
        window: Option<usize>,

        /// Predict each test draw from strictly earlier draws only
        #[arg(long)]
        leak_free: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Directory holding the draw CSV files (overrides FORTUNA_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print random selections for a lottery
    GenerateNumbers {
        #[arg(short, long, default_value = "mega7")]
        lottery: String,

        /// Number of selections
        #[arg(short, long, default_value = "5")]
        count: usize,

        /// Seed (random when omitted)
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Write synthetic draw histories as CSV
    GenerateData {
        /// Lottery id; every catalog lottery with a missing file when omitted
        #[arg(short, long)]
        lottery: Option<String>,

        /// Draws per lottery
        #[arg(short, long, default_value = "200")]
        draws: usize,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct EvaluationReport<'a> {
    lottery: &'a str,
    seed: u64,
    significance: f64,
    significant: bool,
    #[serde(flatten)]
    result: &'a EvaluationResult,
}

fn main() -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let catalog = match &cli.catalog {
        Some(path) => LotteryCatalog::with_file(path)?,
        None => LotteryCatalog::builtin(),
    };

    match cli.command {
        Commands::EvaluateModel {
            lottery,
            trials,
            seed,
            window,
            leak_free,
            json,
            data_dir,
        } => {
            let lottery = catalog.find(&lottery)?.clone();
            let mut config = config;
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(window) = window {
                if window == 0 {
                    anyhow::bail!("--window must be at least 1");
                }
                config.evaluation.window_size = window;
            }
            if leak_free {
                config.evaluation.context_mode = ContextMode::PrecedingOnly;
            }
            evaluate_model(&config, lottery, trials, seed, json)
        }
        Commands::GenerateNumbers {
            lottery,
            count,
            seed,
        } => generate_numbers(catalog.find(&lottery)?, count, seed),
        Commands::GenerateData {
            lottery,
            draws,
            seed,
            data_dir,
        } => {
            let data_dir = data_dir.unwrap_or(config.data_dir);
            let lotteries: Vec<LotteryConfig> = match lottery {
                Some(id) => vec![catalog.find(&id)?.clone()],
                None => catalog.iter().cloned().collect(),
            };
            generate_data(&data_dir, &lotteries, draws, seed)
        }
    }
}

fn evaluate_model(
    config: &Config,
    lottery: LotteryConfig,
    trials: usize,
    seed: u64,
    json: bool,
) -> Result<()> {
    info!(
        "Evaluating prediction model for {} against random baseline",
        lottery.id
    );
    info!("Running {} trials with seed {}", trials, seed);

    let draws = load_history(config, &lottery, seed)?;

    let evaluator = Evaluator::new(lottery, config.evaluation);
    let result = evaluator
        .evaluate(&draws, trials, seed)
        .context("Evaluation failed")?;

    let significant = result.is_significant(config.significance);
    if json {
        let report = EvaluationReport {
            lottery: &evaluator.lottery().id,
            seed,
            significance: config.significance,
            significant,
            result: &result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("===== EVALUATION RESULTS =====");
    println!(
        "Random Baseline - Average matches: {:.4}",
        result.baseline_avg
    );
    println!(
        "Prediction Model - Average matches: {:.4}",
        result.avg_matches
    );
    println!("Statistical significance (p-value): {:.4}", result.p_value);
    println!("Match distribution:");
    for (matches, count) in result.match_distribution.iter() {
        println!(
            "  {} matches: {} times ({:.1}%)",
            matches,
            count,
            100.0 * count as f64 / result.trials as f64
        );
    }
    if result.is_fallback() {
        println!("(model could not be trained; both figures come from the random baseline)");
    }

    if significant {
        println!();
        println!("UNEXPECTED RESULT: The model shows statistical significance.");
        println!("This is likely due to random chance in this specific trial.");
        println!("Try running with different seeds to verify.");
    } else {
        println!();
        println!("CONCLUSION: The prediction model shows NO statistically significant");
        println!("improvement over random selection. This demonstrates that lottery");
        println!("numbers CANNOT be predicted better than random chance.");
    }
    Ok(())
}

/// Loads the draw history, first writing synthetic draws when the file is
/// missing and auto-generation is enabled.
fn load_history(config: &Config, lottery: &LotteryConfig, seed: u64) -> Result<Vec<Draw>> {
    let source = CsvDrawSource::new(&config.data_dir);
    let path = source.path_for(lottery);
    if config.auto_generate && !path.exists() {
        warn!("{:?} not found; generating synthetic draws", path);
        synthetic::ensure_data_files(
            &config.data_dir,
            std::slice::from_ref(lottery),
            AUTO_GENERATED_DRAWS,
            &mut SeededGenerator::new(seed),
        )?;
    }

    source.load(lottery).with_context(|| {
        format!(
            "Failed to load data for lottery: {} (run `fortuna generate-data --lottery {}` \
             or set FORTUNA_AUTO_GENERATE=true)",
            lottery.id, lottery.id
        )
    })
}

fn generate_numbers(lottery: &LotteryConfig, count: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => SeededGenerator::new(seed),
        None => SeededGenerator::from_entropy(),
    };
    info!("Generating {} sets of {} numbers", count, lottery.name);

    for i in 0..count {
        let numbers = rng.sample_unique(lottery.min, lottery.max, lottery.count)?;
        let mut line = format!("Set {}: {:?}", i + 1, numbers);
        if let Some(special) = &lottery.special {
            let balls = rng.sample_unique(special.min, special.max, special.count)?;
            match balls.as_slice() {
                [single] => line.push_str(&format!(" {}: {}", special.label, single)),
                many => line.push_str(&format!(" {}s: {:?}", special.label, many)),
            }
        }
        println!("{}", line);
    }

    println!();
    println!("IMPORTANT: These numbers come from a uniform random generator.");
    println!("They do NOT have any predictive advantage over any other random selection.");
    println!("No algorithm can predict truly random lottery draws better than pure chance.");
    Ok(())
}

fn generate_data(
    data_dir: &std::path::Path,
    lotteries: &[LotteryConfig],
    draws: usize,
    seed: u64,
) -> Result<()> {
    let mut rng = SeededGenerator::new(seed);
    let written = synthetic::ensure_data_files(data_dir, lotteries, draws, &mut rng)?;
    if written.is_empty() {
        println!("All data files already exist in {:?}", data_dir);
    }
    for path in written {
        println!("Wrote {:?}", path);
    }
    Ok(())
}
