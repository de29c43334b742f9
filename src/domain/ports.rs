use crate::domain::market::{HistoryRange, PriceSeries};
use anyhow::Result;
use async_trait::async_trait;

// Need async_trait for async functions in traits
#[async_trait]
pub trait PriceDataSource: Send + Sync {
    /// Historical OHLCV bars for `ticker` over `range`, ascending by timestamp.
    async fn get_price_series(&self, ticker: &str, range: HistoryRange) -> Result<PriceSeries>;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}

pub use crate::domain::fundamentals::FundamentalsProvider;
pub use crate::domain::sentiment::SentimentProvider;
