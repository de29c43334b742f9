use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::str::FromStr;
use std::time::Duration;
use stocksight::application::forecast_service::ForecastService;
use stocksight::config::{Config, DataSourceKind, clamp_refresh_secs};
use stocksight::domain::market::{HistoryPeriod, HistoryRange};
use stocksight::infrastructure::ServiceFactory;
use stocksight::interfaces::render_report;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Stock dashboard: price history, news sentiment, fundamentals and a next-close forecast
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ticker symbol (defaults to DEFAULT_TICKER)
    #[arg(long, short)]
    ticker: Option<String>,

    /// History period: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, max
    #[arg(long, short, conflicts_with_all = ["start", "end"])]
    period: Option<String>,

    /// Custom range start (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Custom range end, exclusive (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Auto-refresh interval in seconds (10-600)
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Run a single refresh and exit
    #[arg(long)]
    once: bool,

    /// Price source: yahoo, csv, mock
    #[arg(long)]
    source: Option<String>,
}

impl Args {
    fn range(&self, config: &Config) -> Result<HistoryRange> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            return Ok(HistoryRange::custom(start, end)?);
        }

        let period = match &self.period {
            Some(code) => HistoryPeriod::from_str(code)?,
            None => config.dashboard.default_period,
        };
        Ok(HistoryRange::Period(period))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false) // cleaner
        .with_writer(std::io::stderr)
        .pretty();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.dashboard.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .init();

    if let Some(source) = &args.source {
        config.data_source.kind = DataSourceKind::from_str(source)?;
    }

    let ticker = args
        .ticker
        .clone()
        .unwrap_or_else(|| config.dashboard.default_ticker.clone());
    let range = args.range(&config)?;
    let refresh_secs = args
        .refresh_secs
        .map(clamp_refresh_secs)
        .unwrap_or(config.dashboard.refresh_interval_secs);

    info!(
        "Starting Stocksight for {} ({}), source={}, refresh every {}s",
        ticker,
        range.label(),
        config.data_source.kind,
        refresh_secs
    );

    let (price_source, sentiment_provider, fundamentals_provider) =
        ServiceFactory::create_services(&config);
    let service = ForecastService::new(
        price_source,
        sentiment_provider,
        fundamentals_provider,
        config.predictor,
    );

    let refresh = service.run_periodic(
        &ticker,
        range,
        Duration::from_secs(refresh_secs),
        args.once,
        |snapshot| println!("{}", render_report(snapshot)),
    );

    tokio::select! {
        result = refresh => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Shutdown signal received. Exiting...");
        }
    }

    Ok(())
}
