use thiserror::Error;

/// Errors raised by the forecasting pipeline (feature building, fitting, inference).
///
/// None of these are fatal: the dashboard degrades to "no forecast available".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("Insufficient data: {rows} usable training rows, need at least {required}")]
    InsufficientData { rows: usize, required: usize },

    #[error("Degenerate fit: {reason}")]
    DegenerateFit { reason: String },

    #[error("Model has not been trained yet; call train() before predict_next()")]
    NotTrained,

    #[error("Invalid input: {field} must be finite, got {value}")]
    InvalidInput { field: &'static str, value: f64 },
}

/// Errors related to market data retrieval and integrity
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("No price data available for {ticker}")]
    NoData { ticker: String },

    #[error("Invalid market data for {ticker}: {reason}")]
    InvalidData { ticker: String, reason: String },

    #[error("Rate limit exceeded: retry after {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Unsupported history range: {reason}")]
    UnsupportedRange { reason: String },
}
