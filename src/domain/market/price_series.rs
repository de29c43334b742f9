use crate::domain::errors::MarketDataError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV observation. Missing values from the source are carried as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn has_close(&self) -> bool {
        self.close.is_finite()
    }
}

/// Chronological price history for a single ticker.
///
/// Invariants enforced at construction:
/// - at least one bar
/// - timestamps strictly ascending (hence unique)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, MarketDataError> {
        let ticker = ticker.into();

        if bars.is_empty() {
            return Err(MarketDataError::NoData { ticker });
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(MarketDataError::InvalidData {
                ticker,
                reason: format!(
                    "timestamps must be strictly ascending ({} followed by {})",
                    pair[0].timestamp, pair[1].timestamp
                ),
            });
        }

        Ok(Self { ticker, bars })
    }

    /// Builds a daily series from closes only (open/high/low set to the close, zero volume).
    /// Handy for mocks and tests.
    pub fn from_closes(ticker: impl Into<String>, closes: &[f64]) -> Result<Self, MarketDataError> {
        let origin = Utc
            .with_ymd_and_hms(2024, 1, 2, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);

        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: origin + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect();

        Self::new(ticker, bars)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Most recent finite close
    pub fn last_close(&self) -> Option<f64> {
        self.bars.iter().rev().find(|b| b.has_close()).map(|b| b.close)
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.first().map(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_at(secs: i64, close: f64) -> PriceBar {
        PriceBar {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let err = PriceSeries::new("AAPL", vec![]).unwrap_err();
        assert!(matches!(err, MarketDataError::NoData { .. }));
    }

    #[test]
    fn test_non_ascending_timestamps_are_rejected() {
        let bars = vec![bar_at(200, 10.0), bar_at(100, 11.0)];
        let err = PriceSeries::new("AAPL", bars).unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidData { .. }));
    }

    #[test]
    fn test_duplicate_timestamps_are_rejected() {
        let bars = vec![bar_at(100, 10.0), bar_at(100, 11.0)];
        assert!(PriceSeries::new("AAPL", bars).is_err());
    }

    #[test]
    fn test_last_close_skips_missing_values() {
        let series = PriceSeries::from_closes("MSFT", &[10.0, 11.0, f64::NAN]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.last_close(), Some(11.0));
    }

    #[test]
    fn test_from_closes_builds_daily_bars() {
        let series = PriceSeries::from_closes("MSFT", &[1.0, 2.0, 3.0]).unwrap();
        let bars = series.bars();
        assert_eq!(bars[1].timestamp - bars[0].timestamp, Duration::days(1));
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.ticker(), "MSFT");
    }
}
