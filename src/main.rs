use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use aadhaar_pulse::config::Config;
use aadhaar_pulse::pipeline::filter::RecordFilter;
use aadhaar_pulse::pipeline::{rollup, AggregationOutput, AggregationPipeline};
use aadhaar_pulse::source::fetch::{fetch_snapshot, HttpDatasetClient};
use aadhaar_pulse::source::{load_bundle, save_snapshot};
use aadhaar_pulse::{logging, metrics};

#[derive(Parser)]
#[command(name = "aadhaar_pulse")]
#[command(about = "Aadhaar enrolment and update statistics by state and month")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file (default: pulse.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve Prometheus metrics on this port while the command runs
    #[arg(long, global = true)]
    metrics_port: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the three datasets and save them as a snapshot
    Fetch {
        /// Snapshot path (default: snapshot.path from config)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Aggregate a snapshot into per-state monthly records
    Aggregate {
        /// Snapshot to read (default: snapshot.path from config)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Write records here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Only keep records for this state
        #[arg(long)]
        state: Option<String>,
        /// Only keep records for this year
        #[arg(long)]
        year: Option<i32>,
        /// Write row-level warnings (unparsed dates, missing states) here
        #[arg(long)]
        warnings: Option<PathBuf>,
    },
    /// Aggregate a snapshot and reduce it to per-state totals
    Rollup {
        /// Snapshot to read (default: snapshot.path from config)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Write rollups here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Only roll up records for this year
        #[arg(long)]
        year: Option<i32>,
    },
}

fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Output written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_aggregation(config: &Config, input: Option<PathBuf>) -> Result<AggregationOutput> {
    let input = input.unwrap_or_else(|| config.snapshot.path.clone());
    let bundle = load_bundle(&input).with_context(|| format!("Failed to load snapshot {}", input.display()))?;
    Ok(AggregationPipeline::new().run(&bundle))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let _log_guard = logging::init_logging(&config.logging.dir);

    if let Some(port) = cli.metrics_port {
        metrics::init_metrics(port);
    }

    match cli.command {
        Commands::Fetch { output } => {
            let output = output.unwrap_or_else(|| config.snapshot.path.clone());
            let api_key = config.require_api_key()?.to_string();
            let client = HttpDatasetClient::new(config.source.clone(), api_key)?;

            let document = fetch_snapshot(&client).await?;
            save_snapshot(&output, &document)?;
            info!(
                path = %output.display(),
                demographic = document.demographic.len(),
                enrolment = document.enrolment.len(),
                biometric = document.biometric.len(),
                "Snapshot saved"
            );
        }
        Commands::Aggregate { input, output, state, year, warnings } => {
            let result = run_aggregation(&config, input)?;

            if !result.warnings.is_empty() {
                warn!("{} rows were flagged during aggregation", result.warnings.len());
            }
            if let Some(path) = warnings {
                write_json(&result.warnings, Some(path.as_path()))?;
            }

            let records = RecordFilter::new(state, year).apply(result.records);
            info!(records = records.len(), "Writing records");
            write_json(&records, output.as_deref())?;
        }
        Commands::Rollup { input, output, year } => {
            let result = run_aggregation(&config, input)?;
            let records = RecordFilter::new(None, year).apply(result.records);
            let rollups = rollup(&records);
            info!(regions = rollups.len(), "Writing rollups");
            write_json(&rollups, output.as_deref())?;
        }
    }
    Ok(())
}
