use crate::config::{Config, DataSourceKind};
use crate::domain::ports::{FundamentalsProvider, PriceDataSource, SentimentProvider};
use crate::infrastructure::csv_source::CsvPriceDataSource;
use crate::infrastructure::mock::{
    MockFundamentalsProvider, MockPriceDataSource, NeutralSentimentProvider,
};
use crate::infrastructure::news::NewsApiSentimentProvider;
use crate::infrastructure::yahoo::{YahooFundamentalsProvider, YahooPriceDataSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create_services(
        config: &Config,
    ) -> (
        Arc<dyn PriceDataSource>,
        Arc<dyn SentimentProvider>,
        Arc<dyn FundamentalsProvider>,
    ) {
        let source = &config.data_source;
        let cache_ttl = Duration::from_secs(source.price_cache_ttl_secs);

        let (price_source, fundamentals_provider): (
            Arc<dyn PriceDataSource>,
            Arc<dyn FundamentalsProvider>,
        ) = match source.kind {
            DataSourceKind::Yahoo => (
                Arc::new(YahooPriceDataSource::new(
                    source.yahoo_chart_url.clone(),
                    cache_ttl,
                )),
                Arc::new(YahooFundamentalsProvider::new(
                    source.yahoo_quote_summary_url.clone(),
                    cache_ttl,
                )),
            ),
            DataSourceKind::Csv => (
                Arc::new(CsvPriceDataSource::new(source.csv_data_dir.clone())),
                // CSV files carry prices only
                Arc::new(MockFundamentalsProvider::failing()),
            ),
            DataSourceKind::Mock => (
                Arc::new(MockPriceDataSource::new()),
                Arc::new(MockFundamentalsProvider::new()),
            ),
        };

        let sentiment_provider: Arc<dyn SentimentProvider> =
            match NewsApiSentimentProvider::from_config(&config.news) {
                Some(provider) => Arc::new(provider),
                None => {
                    warn!("NEWS_API_KEY not set, news sentiment will be neutral");
                    Arc::new(NeutralSentimentProvider)
                }
            };

        info!(
            "ServiceFactory: prices from {} (cache {}s)",
            price_source.name(),
            source.price_cache_ttl_secs
        );

        (price_source, sentiment_provider, fundamentals_provider)
    }
}
