//! Command implementations for the AQF CLI.
//!
//! Every command opens the SQLite store given by `--db`, does its work on a
//! blocking thread and prints JSON to stdout.

use clap::Subcommand;
use std::path::PathBuf;

pub mod forecast;
pub mod store;

/// Forecasts need at least this many stored readings.
pub const MIN_FORECAST_HISTORY: usize = 10;

/// Evaluation needs at least this many held-out readings.
pub const MIN_EVALUATION_RECORDS: usize = 20;

#[derive(Subcommand)]
pub enum Command {
    /// Import measurements from a CSV file
    Load {
        /// SQLite database file (created if missing)
        #[arg(short, long)]
        db: PathBuf,

        /// Measurement CSV with a header row
        #[arg(short, long)]
        csv: PathBuf,
    },

    /// Generate forecasts for a location and print them as JSON
    Forecast {
        #[arg(short, long)]
        db: PathBuf,

        #[arg(short, long)]
        location: String,

        /// Hours ahead to forecast
        #[arg(long, default_value_t = 24)]
        hours: u32,

        /// Most recent readings used as history
        #[arg(long, default_value_t = 200)]
        limit: usize,

        /// TOML file overriding pipeline settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Store the forecasts in the database
        #[arg(long)]
        persist: bool,
    },

    /// Train on older readings and score the models on the most recent ones
    Evaluate {
        #[arg(short, long)]
        db: PathBuf,

        #[arg(short, long)]
        location: String,

        /// Readings used for training
        #[arg(long, default_value_t = 200)]
        limit: usize,

        /// Most recent readings held out for scoring
        #[arg(long, default_value_t = 100)]
        test_limit: usize,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summarize the confidence of stored forecasts
    Confidence {
        #[arg(short, long)]
        db: PathBuf,

        #[arg(short, long)]
        location: String,
    },

    /// Delete readings older than the given number of days
    Purge {
        #[arg(short, long)]
        db: PathBuf,

        #[arg(long)]
        days: u32,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    let output = match command {
        Command::Load { db, csv } => store::run_load(&db, &csv).await?,
        Command::Forecast {
            db,
            location,
            hours,
            limit,
            config,
            persist,
        } => {
            let request = forecast::ForecastRequest {
                location,
                hours,
                limit,
                persist,
            };
            forecast::run_forecast(&db, config.as_deref(), request).await?
        }
        Command::Evaluate {
            db,
            location,
            limit,
            test_limit,
            config,
        } => forecast::run_evaluate(&db, config.as_deref(), &location, limit, test_limit).await?,
        Command::Confidence { db, location } => forecast::run_confidence(&db, &location).await?,
        Command::Purge { db, days } => store::run_purge(&db, days).await?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
