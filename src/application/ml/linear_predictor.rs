use super::feature_builder::{build_inference_features, build_training_set};
use super::linear_model::{LinearModel, MIN_TRAINING_ROWS, varying_columns};
use super::predictor::PricePredictor;
use super::scaler::StandardScaler;
use crate::domain::errors::PredictionError;
use crate::domain::market::PriceSeries;
use crate::domain::ml::feature_registry::{FEATURE_COUNT, TrainingExample};
use crate::domain::sentiment::SentimentScore;
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use tracing::debug;

/// Fitted state, only reachable through `ModelState::Trained`
#[derive(Debug, Clone)]
struct FittedModel {
    scaler: Option<StandardScaler>,
    model: LinearModel,
    training_rows: usize,
    trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
enum ModelState {
    #[default]
    Untrained,
    Trained(FittedModel),
}

/// Summary of the last successful fit, for display and logging
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    pub training_rows: usize,
    pub intercept: f64,
    /// Coefficients in feature-registry order, in scaled units when standardization is on
    pub coefficients: Vec<f64>,
    pub r_squared: Option<f64>,
    pub standardized: bool,
    pub trained_at: DateTime<Utc>,
}

/// OLS on `(close_lag1, sentiment)` predicting the next close.
///
/// With `standardize` on, features are z-scored before fitting (the scaler is
/// fitted on the training rows and reused at inference). Predictions are not
/// clamped: a poor fit may return implausible or negative prices.
#[derive(Debug, Clone)]
pub struct LinearPricePredictor {
    state: ModelState,
    standardize: bool,
}

impl LinearPricePredictor {
    pub fn new(standardize: bool) -> Self {
        Self {
            state: ModelState::Untrained,
            standardize,
        }
    }

    pub fn fit_summary(&self) -> Option<FitSummary> {
        match &self.state {
            ModelState::Untrained => None,
            ModelState::Trained(fitted) => Some(FitSummary {
                training_rows: fitted.training_rows,
                intercept: fitted.model.intercept(),
                coefficients: fitted.model.coefficients().to_vec(),
                r_squared: fitted.model.r_squared(),
                standardized: fitted.scaler.is_some(),
                trained_at: fitted.trained_at,
            }),
        }
    }

    fn design_matrix(rows: &[TrainingExample]) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(i, j)| {
            rows[i].features.to_array()[j]
        });
        let y = rows.iter().map(|r| r.target).collect::<Array1<f64>>();
        (x, y)
    }

    fn fit(&self, rows: &[TrainingExample]) -> Result<FittedModel, PredictionError> {
        if rows.len() < MIN_TRAINING_ROWS {
            return Err(PredictionError::InsufficientData {
                rows: rows.len(),
                required: MIN_TRAINING_ROWS,
            });
        }

        let (x, y) = Self::design_matrix(rows);
        // Constant columns are decided on raw prices so both settings agree
        let varying = varying_columns(&x);

        let (scaler, model) = if self.standardize {
            let scaler = StandardScaler::fit(&x);
            let model = LinearModel::fit_columns(&scaler.transform(&x), &y, &varying)?;
            (Some(scaler), model)
        } else {
            (None, LinearModel::fit_columns(&x, &y, &varying)?)
        };

        Ok(FittedModel {
            scaler,
            model,
            training_rows: rows.len(),
            trained_at: Utc::now(),
        })
    }
}

impl Default for LinearPricePredictor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PricePredictor for LinearPricePredictor {
    fn train(
        &mut self,
        series: &PriceSeries,
        sentiment: SentimentScore,
    ) -> Result<(), PredictionError> {
        let rows = build_training_set(series, sentiment);
        let fitted = self.fit(&rows)?;

        debug!(
            "LinearPricePredictor: fitted {} on {} rows (r2={:?}, standardized={})",
            series.ticker(),
            fitted.training_rows,
            fitted.model.r_squared(),
            fitted.scaler.is_some()
        );

        self.state = ModelState::Trained(fitted);
        Ok(())
    }

    fn predict_next(
        &self,
        last_close: f64,
        sentiment: SentimentScore,
    ) -> Result<f64, PredictionError> {
        let ModelState::Trained(fitted) = &self.state else {
            return Err(PredictionError::NotTrained);
        };

        let features = build_inference_features(last_close, sentiment)?;
        if !sentiment.is_finite() {
            return Err(PredictionError::InvalidInput {
                field: "sentiment",
                value: sentiment.value(),
            });
        }

        let row = Array1::from(features.to_array().to_vec());
        let prediction = match &fitted.scaler {
            Some(scaler) => fitted.model.predict_row(scaler.transform_row(row.view()).view()),
            None => fitted.model.predict_row(row.view()),
        };

        Ok(prediction)
    }

    fn is_trained(&self) -> bool {
        matches!(self.state, ModelState::Trained(_))
    }

    fn name(&self) -> &str {
        if self.standardize {
            "OLS Linear Regression (standardized)"
        } else {
            "OLS Linear Regression"
        }
    }

    fn version(&self) -> &str {
        "v1.0"
    }
}
