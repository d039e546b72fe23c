//! Fundlens CLI - fund analytics over 13F filings and price history files.
//!
//! Every command prints an `ApiResponse` JSON envelope on stdout. Logs go to stderr
//! and are controlled with `RUST_LOG`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fund_analytics::{
    by_sector, portfolio_stats,
    sources::{InMemoryPrices, MemoryCache},
    ApiResponse, Benchmark, CancelToken, EngineConfig, Filing, FundMetricsService, PricePoint,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "fundlens")]
#[command(about = "Fund analytics for 13F filings - weights, sectors and risk metrics")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $FUNDLENS_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis: weights, sectors, performance series and metrics
    Analyze {
        /// Filing JSON file
        #[arg(short, long)]
        filing: PathBuf,
        /// Prior quarter's filing JSON, for quarterly share changes
        #[arg(long)]
        prior: Option<PathBuf>,
        /// Price history JSON file (array of price points)
        #[arg(short, long)]
        prices: PathBuf,
        /// Benchmark symbol, looked up in the price file
        #[arg(short, long, default_value = "SPY")]
        benchmark: String,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
    },
    /// Sector and industry allocation
    Sectors {
        /// Filing JSON file
        #[arg(short, long)]
        filing: PathBuf,
    },
    /// Largest holdings and their concentration
    Top {
        /// Filing JSON file
        #[arg(short, long)]
        filing: PathBuf,
        /// Number of holdings (defaults to the configured top_n)
        #[arg(short, long)]
        n: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output = match run(cli).await {
        Ok(data) => render(&ApiResponse::ok(data)),
        Err(e) => render(&ApiResponse::<()>::err(format!("{:#}", e))),
    };

    println!("{}", output);
}

async fn run(cli: Cli) -> Result<Value> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_path(path)?,
        None => EngineConfig::load()?,
    };

    match cli.command {
        Commands::Analyze {
            filing,
            prior,
            prices,
            benchmark,
            start,
            end,
        } => {
            let filing = load_filing(&filing)?;
            let prior = prior.as_deref().map(load_filing).transpose()?;
            let points: Vec<PricePoint> = read_json(&prices)?;

            let service = FundMetricsService::new(
                Arc::new(InMemoryPrices::from_points(points)),
                Arc::new(MemoryCache::new()),
                config,
            );
            let analysis = service
                .analyze_filing(
                    &filing,
                    prior.as_ref(),
                    &Benchmark::Symbol(benchmark),
                    start,
                    end,
                    &CancelToken::new(),
                )
                .await?;

            Ok(serde_json::to_value(analysis)?)
        }
        Commands::Sectors { filing } => {
            let filing = load_filing(&filing)?;
            let sectors = by_sector(&filing.holdings)?;
            Ok(json!({
                "filing_id": filing.accession_number,
                "total_value": filing.total_value(),
                "sectors": sectors,
            }))
        }
        Commands::Top { filing, n } => {
            let filing = load_filing(&filing)?;
            let stats = portfolio_stats(&filing.holdings, n.unwrap_or(config.top_n))?;
            Ok(json!({
                "filing_id": filing.accession_number,
                "stats": stats,
            }))
        }
    }
}

/// Read a filing and drop its principal-amount rows.
fn load_filing(path: &Path) -> Result<Filing> {
    let filing: Filing = read_json(path)?;
    Ok(Filing {
        holdings: filing.share_holdings(),
        ..filing
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| json!({ "ok": false, "error": e.to_string() }).to_string())
}
