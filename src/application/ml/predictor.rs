use crate::domain::errors::PredictionError;
use crate::domain::market::PriceSeries;
use crate::domain::sentiment::SentimentScore;

/// Interface for one-step-ahead price models
pub trait PricePredictor: Send + Sync {
    /// Fit on the series with the sentiment broadcast across all rows.
    /// On error the previously fitted state (if any) is kept.
    fn train(&mut self, series: &PriceSeries, sentiment: SentimentScore)
    -> Result<(), PredictionError>;

    /// Predict the next close. Fails with `NotTrained` before a successful `train`.
    fn predict_next(&self, last_close: f64, sentiment: SentimentScore)
    -> Result<f64, PredictionError>;

    fn is_trained(&self) -> bool;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
