use crate::domain::errors::MarketDataError;
use crate::domain::fundamentals::{Fundamentals, FundamentalsProvider, QuarterlyFinancials};
use crate::domain::market::{HistoryRange, PriceBar, PriceSeries, Timeframe};
use crate::domain::ports::PriceDataSource;
use crate::domain::sentiment::{SentimentProvider, SentimentReport, SentimentScore};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Bars generated for `max` and other open-ended requests
const MAX_MOCK_BARS: usize = 2500;
/// 15-minute bars in a regular US session
const INTRADAY_BARS_PER_DAY: usize = 26;

#[derive(Debug, Clone)]
enum MockPrices {
    RandomWalk { seed: u64, start_price: f64 },
    Fixed(PriceSeries),
    Unavailable,
}

/// Offline price source: a seeded random walk per ticker, a fixed series, or always failing.
#[derive(Debug, Clone)]
pub struct MockPriceDataSource {
    prices: MockPrices,
}

impl MockPriceDataSource {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            prices: MockPrices::RandomWalk {
                seed,
                start_price: 150.0,
            },
        }
    }

    /// Always returns `series`, whatever ticker or range is asked for
    pub fn with_series(series: PriceSeries) -> Self {
        Self {
            prices: MockPrices::Fixed(series),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            prices: MockPrices::Unavailable,
        }
    }

    fn bar_count(range: HistoryRange) -> usize {
        let days = match range {
            HistoryRange::Period(period) => period.approx_days(),
            HistoryRange::Custom { start, end } => Some((end - start).num_days()),
        };

        match (days, range.timeframe()) {
            (None, _) => MAX_MOCK_BARS,
            (Some(days), Timeframe::FifteenMin) => days.max(1) as usize * INTRADAY_BARS_PER_DAY,
            (Some(days), Timeframe::OneDay) => (days.max(1) as usize).min(MAX_MOCK_BARS),
        }
    }

    fn random_walk(ticker: &str, range: HistoryRange, seed: u64, start_price: f64) -> Vec<PriceBar> {
        // Per-ticker stream so different symbols do not share a path
        let ticker_seed = ticker
            .bytes()
            .fold(seed, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut rng = StdRng::seed_from_u64(ticker_seed);

        let count = Self::bar_count(range);
        let step = Duration::minutes(range.timeframe().to_minutes() as i64);
        let end = match range {
            HistoryRange::Custom { end, .. } => end.and_time(NaiveTime::MIN).and_utc(),
            HistoryRange::Period(_) => Utc::now()
                .date_naive()
                .and_time(NaiveTime::MIN)
                .and_utc(),
        };
        let first = end - step * count as i32;

        let mut close = start_price;
        (0..count)
            .map(|i| {
                let open = close;
                let change_pct: f64 = rng.random_range(-0.02..0.02);
                close = (open * (1.0 + change_pct)).max(0.01);
                let wick: f64 = rng.random_range(0.0..0.005);
                PriceBar {
                    timestamp: first + step * i as i32,
                    open,
                    high: open.max(close) * (1.0 + wick),
                    low: open.min(close) * (1.0 - wick),
                    close,
                    volume: rng.random_range(500_000.0..5_000_000.0_f64).round(),
                }
            })
            .collect()
    }
}

impl Default for MockPriceDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceDataSource for MockPriceDataSource {
    async fn get_price_series(&self, ticker: &str, range: HistoryRange) -> Result<PriceSeries> {
        match &self.prices {
            MockPrices::RandomWalk { seed, start_price } => {
                let bars = Self::random_walk(ticker, range, *seed, *start_price);
                debug!("MockPriceDataSource: generated {} bars for {}", bars.len(), ticker);
                Ok(PriceSeries::new(ticker, bars)?)
            }
            MockPrices::Fixed(series) => Ok(series.clone()),
            MockPrices::Unavailable => Err(MarketDataError::NoData {
                ticker: ticker.to_string(),
            }
            .into()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Returns a fixed score with no articles, or fails on every call
#[derive(Debug, Clone)]
pub struct MockSentimentProvider {
    score: Option<SentimentScore>,
}

impl MockSentimentProvider {
    pub fn new(score: f64) -> Self {
        Self {
            score: Some(SentimentScore(score)),
        }
    }

    pub fn failing() -> Self {
        Self { score: None }
    }
}

#[async_trait]
impl SentimentProvider for MockSentimentProvider {
    async fn fetch_sentiment(&self, ticker: &str, _company_name: &str) -> Result<SentimentReport> {
        let Some(score) = self.score else {
            anyhow::bail!("Mock sentiment unavailable for {}", ticker);
        };
        Ok(SentimentReport {
            score,
            ..SentimentReport::neutral("mock")
        })
    }
}

/// Used when no news API key is configured
#[derive(Debug, Clone, Default)]
pub struct NeutralSentimentProvider;

#[async_trait]
impl SentimentProvider for NeutralSentimentProvider {
    async fn fetch_sentiment(&self, _ticker: &str, _company_name: &str) -> Result<SentimentReport> {
        Ok(SentimentReport::neutral("neutral"))
    }
}

#[derive(Debug, Clone)]
pub struct MockFundamentalsProvider {
    fundamentals: Option<Fundamentals>,
}

impl MockFundamentalsProvider {
    pub fn new() -> Self {
        Self {
            fundamentals: Some(Fundamentals {
                company_name: Some("Mock Corporation".to_string()),
                business_summary: Some("Synthetic company used for offline runs.".to_string()),
                current_price: Some(151.20),
                market_cap: Some(2.4e12),
                trailing_pe: Some(28.5),
                forward_pe: Some(25.1),
                fifty_two_week_high: Some(199.62),
                fifty_two_week_low: Some(124.17),
                volume: Some(48_250_000.0),
                previous_close: Some(150.0),
                open: Some(150.4),
                dividend_yield: Some(0.0055),
                profit_margin: Some(0.25),
                total_revenue: Some(3.83e11),
                debt_to_equity: Some(145.0),
                quarterly: mock_quarters(),
                ..Fundamentals::default()
            }),
        }
    }

    pub fn with_fundamentals(fundamentals: Fundamentals) -> Self {
        Self {
            fundamentals: Some(fundamentals),
        }
    }

    pub fn failing() -> Self {
        Self { fundamentals: None }
    }
}

fn mock_quarters() -> Vec<QuarterlyFinancials> {
    [
        ((2024, 3, 31), 90.8e9, 23.6e9, 104.6e9, 74.2e9),
        ((2024, 6, 30), 85.8e9, 21.4e9, 101.3e9, 66.7e9),
        ((2024, 9, 30), 94.9e9, 14.7e9, 106.6e9, 57.0e9),
        ((2024, 12, 31), 124.3e9, 36.3e9, 96.8e9, 66.8e9),
    ]
    .into_iter()
    .filter_map(|((y, m, d), revenue, income, debt, equity)| {
        Some(QuarterlyFinancials {
            period_end: NaiveDate::from_ymd_opt(y, m, d)?,
            total_revenue: Some(revenue),
            net_income: Some(income),
            total_debt: Some(debt),
            stockholder_equity: Some(equity),
        })
    })
    .collect()
}

impl Default for MockFundamentalsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FundamentalsProvider for MockFundamentalsProvider {
    async fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals> {
        let Some(fundamentals) = &self.fundamentals else {
            anyhow::bail!("Mock fundamentals unavailable for {}", ticker);
        };
        Ok(Fundamentals {
            ticker: ticker.to_string(),
            ..fundamentals.clone()
        })
    }
}
