pub mod common;
pub mod fundamentals;
pub mod market_data;

pub use fundamentals::YahooFundamentalsProvider;
pub use market_data::YahooPriceDataSource;
