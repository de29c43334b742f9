use serde::{Deserialize, Serialize};

/// Ordered list of feature names.
/// Column order of every design matrix and inference row follows this list.
pub const FEATURE_NAMES: &[&str] = &["close_lag1", "sentiment"];

/// Number of model inputs
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Model input for one step: yesterday's close plus the broadcast sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub previous_close: f64,
    pub sentiment: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [self.previous_close, self.sentiment]
    }

    pub fn is_finite(&self) -> bool {
        self.previous_close.is_finite() && self.sentiment.is_finite()
    }
}

/// One supervised row: features at step i-1 and the close at step i.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub target: f64,
}
