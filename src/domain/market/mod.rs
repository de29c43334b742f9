// Price history and requested ranges
pub mod price_series;
pub mod timeframe;

pub use price_series::{PriceBar, PriceSeries};
pub use timeframe::{HistoryPeriod, HistoryRange, Timeframe};
