pub mod feature_builder;
pub mod linear_model;
pub mod linear_predictor;
pub mod predictor;
pub mod scaler;

pub use linear_predictor::{FitSummary, LinearPricePredictor};
pub use predictor::PricePredictor;
