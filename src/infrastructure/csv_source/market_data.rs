//! Offline price history from `{dir}/{TICKER}.csv` files.
//!
//! Expected header: `timestamp,open,high,low,close,volume`. Timestamps are RFC 3339
//! or plain `YYYY-MM-DD` (midnight UTC). Empty cells are read as missing values.

use crate::domain::errors::MarketDataError;
use crate::domain::market::{HistoryRange, PriceBar, PriceSeries};
use crate::domain::ports::PriceDataSource;
use crate::domain::validation::data_quality::BarValidator;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

pub struct CsvPriceDataSource {
    data_dir: PathBuf,
}

impl CsvPriceDataSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn file_for(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", ticker.to_uppercase()))
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Unrecognised timestamp '{}'", raw))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// Parses CSV content into bars sorted by timestamp
pub fn parse_csv_bars(content: &str, source: &Path) -> Result<Vec<PriceBar>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut bars = Vec::new();
    for (line, record) in reader.deserialize::<CsvBar>().enumerate() {
        let record = record.with_context(|| {
            format!("Malformed row {} in {}", line + 2, source.display())
        })?;

        bars.push(PriceBar {
            timestamp: parse_timestamp(&record.timestamp)
                .with_context(|| format!("Row {} in {}", line + 2, source.display()))?,
            open: record.open.unwrap_or(f64::NAN),
            high: record.high.unwrap_or(f64::NAN),
            low: record.low.unwrap_or(f64::NAN),
            close: record.close.unwrap_or(f64::NAN),
            volume: record.volume.unwrap_or(f64::NAN),
        });
    }

    bars.sort_by_key(|bar| bar.timestamp);
    Ok(bars)
}

/// Keeps the bars inside `range`. Predefined periods are measured back from the latest bar,
/// custom ranges include `start` and exclude `end`.
pub fn filter_to_range(bars: Vec<PriceBar>, range: HistoryRange) -> Vec<PriceBar> {
    match range {
        HistoryRange::Period(period) => {
            let (Some(days), Some(latest)) = (period.approx_days(), bars.last().map(|b| b.timestamp))
            else {
                return bars;
            };
            let cutoff = latest - Duration::days(days);
            bars.into_iter().filter(|b| b.timestamp > cutoff).collect()
        }
        HistoryRange::Custom { start, end } => bars
            .into_iter()
            .filter(|b| {
                let date = b.timestamp.date_naive();
                date >= start && date < end
            })
            .collect(),
    }
}

#[async_trait]
impl PriceDataSource for CsvPriceDataSource {
    async fn get_price_series(&self, ticker: &str, range: HistoryRange) -> Result<PriceSeries> {
        let path = self.file_for(ticker);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("CsvPriceDataSource: no file at {}", path.display());
                return Err(MarketDataError::NoData {
                    ticker: ticker.to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let bars = filter_to_range(parse_csv_bars(&content, &path)?, range);
        let invalid = BarValidator::count_invalid(ticker, &bars);
        if invalid > 0 {
            warn!(
                "CsvPriceDataSource: {} of {} bars for {} failed validation",
                invalid,
                bars.len(),
                ticker
            );
        }

        let series = PriceSeries::new(ticker, bars)?;
        debug!(
            "CsvPriceDataSource: {} bars for {} ({})",
            series.len(),
            ticker,
            range.label()
        );
        Ok(series)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::HistoryPeriod;
    use std::io::Write;

    const SAMPLE: &str = "timestamp,open,high,low,close,volume
2024-01-03,101,103,100,102,1200
2024-01-02,99,101,98,100,1000
2024-01-04T00:00:00Z,102,102,100,,900
2024-03-01,104,106,103,105,1500
";

    #[test]
    fn test_parse_sorts_and_reads_missing_as_nan() {
        let bars = parse_csv_bars(SAMPLE, Path::new("AAPL.csv")).unwrap();

        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0].close, 100.0);
        assert_eq!(bars[1].close, 102.0);
        assert!(bars[2].close.is_nan());
        assert_eq!(bars[2].volume, 900.0);
    }

    #[test]
    fn test_bad_timestamp_is_error() {
        let content = "timestamp,open,high,low,close,volume\nyesterday,1,1,1,1,1\n";
        assert!(parse_csv_bars(content, Path::new("X.csv")).is_err());
    }

    #[test]
    fn test_period_filter_is_relative_to_latest_bar() {
        let bars = parse_csv_bars(SAMPLE, Path::new("AAPL.csv")).unwrap();
        let kept = filter_to_range(bars, HistoryRange::Period(HistoryPeriod::OneMonth));

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].close, 105.0);
    }

    #[test]
    fn test_custom_filter_excludes_end() {
        let bars = parse_csv_bars(SAMPLE, Path::new("AAPL.csv")).unwrap();
        let range = HistoryRange::custom(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        )
        .unwrap();

        let kept = filter_to_range(bars, range);
        assert_eq!(kept.len(), 2);
    }

    #[tokio::test]
    async fn test_reads_ticker_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("MSFT.csv")).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = CsvPriceDataSource::new(dir.path());
        let series = source
            .get_price_series("msft", HistoryRange::Period(HistoryPeriod::Max))
            .await
            .unwrap();

        assert_eq!(series.len(), 4);
        assert_eq!(series.last_close(), Some(105.0));
    }

    #[tokio::test]
    async fn test_missing_file_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvPriceDataSource::new(dir.path());

        let err = source
            .get_price_series("NOPE", HistoryRange::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MarketDataError>(),
            Some(MarketDataError::NoData { .. })
        ));
    }
}
