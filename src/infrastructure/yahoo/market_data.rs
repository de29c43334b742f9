use super::common::{ChartResponse, parse_chart_response};
use crate::domain::errors::MarketDataError;
use crate::domain::market::{HistoryRange, PriceSeries};
use crate::domain::ports::PriceDataSource;
use crate::domain::validation::data_quality::BarValidator;
use crate::infrastructure::core::{HttpClientFactory, TtlCache, build_url_with_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveTime;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Daily/intraday history from Yahoo Finance's v8 chart endpoint
pub struct YahooPriceDataSource {
    client: ClientWithMiddleware,
    chart_url: String,
    cache: TtlCache<PriceSeries>,
}

impl YahooPriceDataSource {
    pub fn new(chart_url: impl Into<String>, cache_ttl: Duration) -> Self {
        Self {
            client: HttpClientFactory::create_client(),
            chart_url: chart_url.into(),
            cache: TtlCache::new("YahooPriceDataSource", cache_ttl),
        }
    }

    /// Full request URL for a ticker and range
    pub fn chart_request_url(&self, ticker: &str, range: HistoryRange) -> Result<String> {
        let base = format!("{}/{}", self.chart_url.trim_end_matches('/'), ticker);
        let interval = range.timeframe().to_yahoo_string().to_string();

        let params: Vec<(&str, String)> = match range {
            HistoryRange::Period(period) => vec![
                ("range", period.code().to_string()),
                ("interval", interval),
                ("includePrePost", "false".to_string()),
            ],
            HistoryRange::Custom { start, end } => vec![
                (
                    "period1",
                    start.and_time(NaiveTime::MIN).and_utc().timestamp().to_string(),
                ),
                (
                    "period2",
                    end.and_time(NaiveTime::MIN).and_utc().timestamp().to_string(),
                ),
                ("interval", interval),
                ("includePrePost", "false".to_string()),
            ],
        };

        build_url_with_query(&base, &params)
    }
}

#[async_trait]
impl PriceDataSource for YahooPriceDataSource {
    async fn get_price_series(&self, ticker: &str, range: HistoryRange) -> Result<PriceSeries> {
        let cache_key = format!(
            "{}:{}:{}",
            ticker,
            range.cache_key(),
            range.timeframe().to_yahoo_string()
        );

        if let Some(series) = self.cache.get(&cache_key) {
            return Ok(series);
        }

        debug!(
            "YahooPriceDataSource: Cache MISS for {}. Fetching...",
            cache_key
        );

        let url = self.chart_request_url(ticker, range)?;
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch chart from Yahoo Finance")?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(MarketDataError::RateLimitExceeded { retry_after_secs }.into());
        }

        // 404 still carries a structured chart error body
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "YahooPriceDataSource: API error {} for {}: {}",
                status, ticker, error_text
            );
            anyhow::bail!("Yahoo Finance API error ({}): {}", status, error_text);
        }

        let body: ChartResponse = response
            .json()
            .await
            .context("Failed to parse Yahoo chart response")?;

        let bars = parse_chart_response(ticker, body)?;

        let invalid = BarValidator::count_invalid(ticker, &bars);
        if invalid > 0 {
            warn!(
                "YahooPriceDataSource: {} of {} bars for {} failed validation",
                invalid,
                bars.len(),
                ticker
            );
        }

        let series = PriceSeries::new(ticker, bars)?;
        debug!(
            "YahooPriceDataSource: {} bars for {} ({})",
            series.len(),
            ticker,
            range.label()
        );

        self.cache.insert(cache_key, series.clone());
        Ok(series)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
