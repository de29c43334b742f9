use super::sentiment_analyzer::SentimentAnalyzer;
use crate::config::NewsEnvConfig;
use crate::domain::errors::MarketDataError;
use crate::domain::sentiment::{NewsArticle, SentimentProvider, SentimentReport, SentimentScore};
use crate::infrastructure::core::{HttpClientFactory, TtlCache, build_url_with_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, error, info};

/// Topics that make an article about the company price-relevant
const TOPICS: &[&str] = &[
    "earnings",
    "revenue",
    "profit",
    "guidance",
    "acquisition",
    "merger",
    "takeover",
    "new product",
    "launch",
    "CEO",
    "CFO",
    "lawsuit",
    "settlement",
    "rating",
    "upgrade",
    "downgrade",
    "fda approval",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    source: Option<NewsApiSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

/// Company news from NewsAPI's `/v2/everything`, scored headline by headline
pub struct NewsApiSentimentProvider {
    client: ClientWithMiddleware,
    analyzer: SentimentAnalyzer,
    api_key: String,
    api_url: String,
    page_size: u32,
    lookback_days: i64,
    cache: TtlCache<SentimentReport>,
}

impl NewsApiSentimentProvider {
    /// `None` when no API key is configured
    pub fn from_config(config: &NewsEnvConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: HttpClientFactory::create_client(),
            analyzer: SentimentAnalyzer::new(),
            api_key,
            api_url: config.api_url.clone(),
            page_size: config.page_size,
            lookback_days: config.lookback_days,
            cache: TtlCache::new(
                "NewsApiSentimentProvider",
                std::time::Duration::from_secs(config.cache_ttl_secs),
            ),
        })
    }

    fn request_url(&self, ticker: &str, company_name: &str, now: DateTime<Utc>) -> Result<String> {
        let from = (now - Duration::days(self.lookback_days)).format("%Y-%m-%d").to_string();
        let to = now.format("%Y-%m-%d").to_string();
        let page_size = self.page_size.to_string();

        build_url_with_query(
            &self.api_url,
            &[
                ("q", build_query(ticker, company_name).as_str()),
                ("language", "en"),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", "relevancy"),
                ("pageSize", page_size.as_str()),
            ],
        )
    }
}

/// `("{company}" OR {ticker}) AND ("earnings" OR ...)`
pub fn build_query(ticker: &str, company_name: &str) -> String {
    let topics = TOPICS
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(" OR ");
    let company = company_name.replace('"', "");
    format!("(\"{}\" OR {}) AND ({})", company, ticker, topics)
}

fn score_articles(analyzer: &SentimentAnalyzer, raw: Vec<NewsApiArticle>) -> SentimentReport {
    let articles: Vec<NewsArticle> = raw
        .into_iter()
        .map(|a| {
            let title = a.title.unwrap_or_default();
            let sentiment = analyzer.analyze_article(&title, a.description.as_deref());
            NewsArticle {
                title,
                description: a.description,
                source: a.source.and_then(|s| s.name),
                author: a.author,
                url: a.url,
                published_at: a.published_at,
                sentiment,
            }
        })
        .collect();

    let scores: Vec<f64> = articles.iter().filter_map(|a| a.sentiment).collect();

    SentimentReport {
        score: SentimentScore::average(&scores),
        articles,
        fetched_at: Utc::now(),
        source: "newsapi".to_string(),
    }
}

#[async_trait]
impl SentimentProvider for NewsApiSentimentProvider {
    async fn fetch_sentiment(&self, ticker: &str, company_name: &str) -> Result<SentimentReport> {
        if let Some(report) = self.cache.get(ticker) {
            return Ok(report);
        }

        let url = self.request_url(ticker, company_name, Utc::now())?;
        debug!("NewsApiSentimentProvider: fetching news for {}", ticker);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .context("Failed to send request to NewsAPI")?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimitExceeded {
                retry_after_secs: 3600,
            }
            .into());
        }

        let status = response.status();
        let body: NewsApiResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse NewsAPI response ({})", status))?;

        if body.status != "ok" {
            error!(
                "NewsApiSentimentProvider: API error {} for {}: {:?}",
                status, ticker, body.message
            );
            anyhow::bail!(
                "NewsAPI error ({}): {}",
                body.code.unwrap_or_else(|| status.to_string()),
                body.message.unwrap_or_default()
            );
        }

        let report = score_articles(&self.analyzer, body.articles);
        info!(
            "NewsApiSentimentProvider: {} sentiment {} ({}) from {} articles",
            ticker,
            report.score,
            report.score.classification(),
            report.articles.len()
        );

        self.cache.insert(ticker, report.clone());
        Ok(report)
    }
}
