use crate::application::market_data::indicators::{ChartOverlays, IndicatorConfig};
use crate::application::ml::{LinearPricePredictor, PricePredictor};
use crate::config::PredictorEnvConfig;
use crate::domain::errors::PredictionError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::market::{HistoryRange, PriceSeries};
use crate::domain::ports::{FundamentalsProvider, PriceDataSource, SentimentProvider};
use crate::domain::sentiment::{SentimentReport, SentimentScore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Outcome of the prediction step. A failed prediction never fails the cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Forecast {
    Available {
        predicted: f64,
        last_close: f64,
        change: f64,
        change_pct: f64,
        r_squared: Option<f64>,
        training_rows: usize,
        model: String,
    },
    Unavailable {
        reason: String,
    },
}

impl Forecast {
    pub fn predicted(&self) -> Option<f64> {
        match self {
            Forecast::Available { predicted, .. } => Some(*predicted),
            Forecast::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Forecast::Available { .. })
    }
}

/// Everything the rendering layer needs for one refresh
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub ticker: String,
    pub range: HistoryRange,
    pub series: PriceSeries,
    pub fundamentals: Option<Fundamentals>,
    pub sentiment: SentimentReport,
    pub forecast: Forecast,
    pub overlays: ChartOverlays,
    pub generated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    pub fn company_name(&self) -> &str {
        self.fundamentals
            .as_ref()
            .map(|f| f.display_name())
            .unwrap_or(self.ticker.as_str())
    }
}

pub struct ForecastService {
    price_source: Arc<dyn PriceDataSource>,
    sentiment_provider: Arc<dyn SentimentProvider>,
    fundamentals_provider: Arc<dyn FundamentalsProvider>,
    predictor_config: PredictorEnvConfig,
}

impl ForecastService {
    pub fn new(
        price_source: Arc<dyn PriceDataSource>,
        sentiment_provider: Arc<dyn SentimentProvider>,
        fundamentals_provider: Arc<dyn FundamentalsProvider>,
        predictor_config: PredictorEnvConfig,
    ) -> Self {
        Self {
            price_source,
            sentiment_provider,
            fundamentals_provider,
            predictor_config,
        }
    }

    /// Fetch, fit, predict and compute overlays for one ticker.
    ///
    /// Only a missing price history fails the cycle. Fundamentals and sentiment
    /// fall back to empty/neutral, and prediction errors become `Forecast::Unavailable`.
    pub async fn run_cycle(&self, ticker: &str, range: HistoryRange) -> Result<DashboardSnapshot> {
        let ticker = normalize_ticker(ticker)?;

        info!(
            "ForecastService: refreshing {} ({}) from {}",
            ticker,
            range.label(),
            self.price_source.name()
        );

        let series = self
            .price_source
            .get_price_series(&ticker, range)
            .await
            .with_context(|| format!("No data available for {} ({})", ticker, range.label()))?;

        let fundamentals = match self.fundamentals_provider.fetch_fundamentals(&ticker).await {
            Ok(f) => Some(f),
            Err(e) => {
                warn!("ForecastService: fundamentals unavailable for {}: {:#}", ticker, e);
                None
            }
        };

        let company_name = fundamentals
            .as_ref()
            .map(|f| f.display_name().to_string())
            .unwrap_or_else(|| ticker.clone());

        let sentiment = match self
            .sentiment_provider
            .fetch_sentiment(&ticker, &company_name)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                warn!(
                    "ForecastService: sentiment unavailable for {}, using neutral: {:#}",
                    ticker, e
                );
                SentimentReport::neutral("fallback")
            }
        };

        let forecast = Self::forecast(&series, sentiment.score, self.predictor_config.standardize);

        let overlays = match ChartOverlays::compute(&series, &IndicatorConfig::default()) {
            Ok(overlays) => overlays,
            Err(e) => {
                warn!("ForecastService: overlays unavailable for {}: {:#}", ticker, e);
                ChartOverlays::default()
            }
        };

        Ok(DashboardSnapshot {
            ticker,
            range,
            series,
            fundamentals,
            sentiment,
            forecast,
            overlays,
            generated_at: Utc::now(),
        })
    }

    /// Train a fresh predictor on the series and predict the bar after the last close.
    pub fn forecast(series: &PriceSeries, sentiment: SentimentScore, standardize: bool) -> Forecast {
        match Self::try_forecast(series, sentiment, standardize) {
            Ok(forecast) => forecast,
            Err(e) => {
                warn!(
                    "ForecastService: no forecast for {}: {}",
                    series.ticker(),
                    e
                );
                Forecast::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn try_forecast(
        series: &PriceSeries,
        sentiment: SentimentScore,
        standardize: bool,
    ) -> Result<Forecast, PredictionError> {
        let last_close = series.last_close().ok_or(PredictionError::InsufficientData {
            rows: 0,
            required: 2,
        })?;

        let mut predictor = LinearPricePredictor::new(standardize);
        predictor.train(series, sentiment)?;
        let predicted = predictor.predict_next(last_close, sentiment)?;

        let summary = predictor.fit_summary();
        let change = predicted - last_close;

        info!(
            "ForecastService: {} next close {:.2} (last {:.2}, sentiment {})",
            series.ticker(),
            predicted,
            last_close,
            sentiment
        );

        Ok(Forecast::Available {
            predicted,
            last_close,
            change,
            change_pct: change / last_close * 100.0,
            r_squared: summary.as_ref().and_then(|s| s.r_squared),
            training_rows: summary.map(|s| s.training_rows).unwrap_or_default(),
            model: format!("{} {}", predictor.name(), predictor.version()),
        })
    }

    /// Refresh on a fixed interval, handing every snapshot to `on_snapshot`.
    ///
    /// Cycle errors are logged and the loop carries on. With `once` the loop
    /// returns after the first cycle, propagating its error.
    pub async fn run_periodic<F>(
        &self,
        ticker: &str,
        range: HistoryRange,
        interval: Duration,
        once: bool,
        mut on_snapshot: F,
    ) -> Result<()>
    where
        F: FnMut(&DashboardSnapshot),
    {
        let mut ticker_interval = tokio::time::interval(interval);
        ticker_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker_interval.tick().await;

            match self.run_cycle(ticker, range).await {
                Ok(snapshot) => on_snapshot(&snapshot),
                Err(e) if once => return Err(e),
                Err(e) => error!("ForecastService: refresh failed: {:#}", e),
            }

            if once {
                return Ok(());
            }
        }
    }
}

fn normalize_ticker(ticker: &str) -> Result<String> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        anyhow::bail!("Please enter a ticker symbol to start");
    }
    Ok(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker(" aapl ").unwrap(), "AAPL");
        assert!(normalize_ticker("   ").is_err());
    }

    #[test]
    fn test_forecast_available() {
        let series =
            PriceSeries::from_closes("AAPL", &[100.0, 102.0, 101.0, 105.0, 107.0]).unwrap();
        let forecast = ForecastService::forecast(&series, SentimentScore(0.2), true);

        match forecast {
            Forecast::Available {
                predicted,
                last_close,
                change,
                training_rows,
                model,
                ..
            } => {
                assert_eq!(model, "OLS Linear Regression (standardized) v1.0");
                assert_eq!(last_close, 107.0);
                assert_eq!(training_rows, 4);
                assert!((change - (predicted - 107.0)).abs() < 1e-12);
            }
            Forecast::Unavailable { reason } => panic!("unexpected: {}", reason),
        }
    }

    #[test]
    fn test_forecast_degrades_on_short_series() {
        let series = PriceSeries::from_closes("AAPL", &[100.0]).unwrap();
        let forecast = ForecastService::forecast(&series, SentimentScore(0.2), true);

        assert!(!forecast.is_available());
        assert!(forecast.predicted().is_none());
    }

    #[test]
    fn test_forecast_degrades_on_flat_series() {
        let series = PriceSeries::from_closes("AAPL", &[10.0, 10.0, 10.0, 10.0]).unwrap();
        match ForecastService::forecast(&series, SentimentScore(0.0), false) {
            Forecast::Unavailable { reason } => assert!(reason.contains("Degenerate")),
            other => panic!("expected unavailable, got {:?}", other),
        }
    }
}
