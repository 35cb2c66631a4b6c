use anyhow::Context;
use clap::{Parser, Subcommand};
use pricecast::{
    model::ModelConfig,
    models::{ReportBlock, TickerTable},
    pipeline::{ForecastRequest, Forecaster},
    render::{price_chart_svg, text},
    services::{GoogleNewsClient, YahooClient},
    utils::{default_start_date, init_logger, parse_date, today},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "pricecast")]
#[command(about = "Forecast the next closing price of a stock with an LSTM and news sentiment")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch prices and news, train the model and print the forecast
    Predict {
        /// Ticker from the ticker table, or a raw exchange symbol (e.g. 4197.KL)
        #[arg(short, long)]
        ticker: String,
        /// First date of price history (YYYY-MM-DD)
        #[arg(short, long)]
        start: Option<String>,
        /// Last date of price history, inclusive (YYYY-MM-DD)
        #[arg(short, long)]
        end: Option<String>,
        /// JSON or YAML ticker table
        #[arg(long)]
        tickers_file: Option<PathBuf>,
        /// Write the price chart as SVG to this path
        #[arg(long)]
        chart: Option<PathBuf>,
        /// Training epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Seed for weight initialization and shuffling
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the ticker table
    Tickers {
        #[arg(long)]
        tickers_file: Option<PathBuf>,
    },
}

fn load_tickers(path: Option<&PathBuf>) -> anyhow::Result<TickerTable> {
    match path {
        Some(path) => TickerTable::load(path),
        None => Ok(TickerTable::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            ticker,
            start,
            end,
            tickers_file,
            chart,
            epochs,
            seed,
        } => {
            let start = match start {
                Some(value) => parse_date(&value)?,
                None => default_start_date(),
            };
            let end = match end {
                Some(value) => parse_date(&value)?,
                None => today(),
            };

            let mut model = ModelConfig::default();
            if let Some(epochs) = epochs {
                model = model.with_epochs(epochs);
            }
            if let Some(seed) = seed {
                model = model.with_seed(seed);
            }

            let forecaster = Forecaster::new(
                Arc::new(YahooClient::new(true)?),
                Arc::new(GoogleNewsClient::new()?),
                Arc::new(load_tickers(tickers_file.as_ref())?),
                model,
            );

            let report = forecaster
                .run(&ForecastRequest { ticker, start, end })
                .await?;
            print!("{}", text::render_report(&report));

            if let Some(path) = chart {
                let series = report.blocks.iter().find_map(|block| match block {
                    ReportBlock::PriceChart(series) => Some(series),
                    _ => None,
                });
                match series {
                    Some(series) => {
                        let svg = price_chart_svg(series)?;
                        std::fs::write(&path, svg)
                            .with_context(|| format!("Failed to write chart {}", path.display()))?;
                        info!(path = %path.display(), "Wrote price chart");
                    }
                    None => info!("No price data, chart not written"),
                }
            }
        }
        Commands::Tickers { tickers_file } => {
            let table = load_tickers(tickers_file.as_ref())?;
            for (ticker, entry) in &table.0 {
                println!(
                    "{:<10} {:<12} {:<4} {}",
                    ticker,
                    entry.symbol,
                    entry.currency,
                    entry.name.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}
