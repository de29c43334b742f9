use super::common::{QUOTE_SUMMARY_MODULES, QuoteSummaryResponse};
use crate::domain::errors::MarketDataError;
use crate::domain::fundamentals::{Fundamentals, FundamentalsProvider};
use crate::infrastructure::core::{HttpClientFactory, TtlCache, build_url_with_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Duration;
use tracing::{debug, error};

/// Company profile and key statistics from Yahoo's quoteSummary endpoint
pub struct YahooFundamentalsProvider {
    client: ClientWithMiddleware,
    quote_summary_url: String,
    cache: TtlCache<Fundamentals>,
}

impl YahooFundamentalsProvider {
    pub fn new(quote_summary_url: impl Into<String>, cache_ttl: Duration) -> Self {
        Self {
            client: HttpClientFactory::create_client(),
            quote_summary_url: quote_summary_url.into(),
            cache: TtlCache::new("YahooFundamentalsProvider", cache_ttl),
        }
    }
}

#[async_trait]
impl FundamentalsProvider for YahooFundamentalsProvider {
    async fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals> {
        if let Some(fundamentals) = self.cache.get(ticker) {
            return Ok(fundamentals);
        }

        let base = format!(
            "{}/{}",
            self.quote_summary_url.trim_end_matches('/'),
            ticker
        );
        let url = build_url_with_query(&base, &[("modules", QUOTE_SUMMARY_MODULES)])?;

        debug!("YahooFundamentalsProvider: fetching {}", ticker);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch quote summary from Yahoo Finance")?;

        let status = response.status();
        if !status.is_success() && status.as_u16() != 404 {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "YahooFundamentalsProvider: API error {} for {}: {}",
                status, ticker, error_text
            );
            anyhow::bail!("Yahoo quoteSummary error ({}): {}", status, error_text);
        }

        let body: QuoteSummaryResponse = response
            .json()
            .await
            .context("Failed to parse Yahoo quoteSummary response")?;

        if let Some(err) = body.quote_summary.error {
            return Err(MarketDataError::InvalidData {
                ticker: ticker.to_string(),
                reason: format!("{}: {}", err.code, err.description.unwrap_or_default()),
            }
            .into());
        }

        let fundamentals = body
            .quote_summary
            .result
            .and_then(|results| results.into_iter().next())
            .map(|result| result.into_fundamentals(ticker))
            .ok_or_else(|| MarketDataError::NoData {
                ticker: ticker.to_string(),
            })?;

        self.cache.insert(ticker, fundamentals.clone());
        Ok(fundamentals)
    }
}
