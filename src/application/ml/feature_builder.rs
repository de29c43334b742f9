//! Turns a price history plus one sentiment reading into model inputs.
//!
//! The sentiment value is broadcast unchanged to every historical row: no
//! per-day sentiment history is tracked, so within one training pass the
//! column is constant and the model effectively regresses close on lagged close.

use crate::domain::errors::PredictionError;
use crate::domain::market::PriceSeries;
use crate::domain::ml::feature_registry::{FeatureVector, TrainingExample};
use crate::domain::sentiment::SentimentScore;

/// Lags the close column by one bar and pairs each lag with the current close.
///
/// Row 0 has no predecessor and is skipped. A row is dropped when its close,
/// its lagged close or the sentiment is not finite. The lag is positional over the
/// raw series, so a missing close removes both the row it belongs to and the row after it.
/// Output is chronological and may be empty.
pub fn build_training_set(series: &PriceSeries, sentiment: SentimentScore) -> Vec<TrainingExample> {
    if !sentiment.is_finite() {
        return Vec::new();
    }

    series
        .bars()
        .windows(2)
        .filter(|w| w[0].close.is_finite() && w[1].close.is_finite())
        .map(|w| TrainingExample {
            features: FeatureVector {
                previous_close: w[0].close,
                sentiment: sentiment.value(),
            },
            target: w[1].close,
        })
        .collect()
}

/// Feature row for a one-step-ahead prediction from the latest close.
pub fn build_inference_features(
    last_close: f64,
    sentiment: SentimentScore,
) -> Result<FeatureVector, PredictionError> {
    if !last_close.is_finite() {
        return Err(PredictionError::InvalidInput {
            field: "last_close",
            value: last_close,
        });
    }

    Ok(FeatureVector {
        previous_close: last_close,
        sentiment: sentiment.value(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lagged_rows() {
        let series = PriceSeries::from_closes("AAPL", &[100.0, 102.0, 101.0, 105.0, 107.0]).unwrap();
        let rows = build_training_set(&series, SentimentScore(0.2));

        assert_eq!(rows.len(), 4);
        let pairs: Vec<(f64, f64)> = rows
            .iter()
            .map(|r| (r.features.previous_close, r.target))
            .collect();
        assert_eq!(
            pairs,
            vec![(100.0, 102.0), (102.0, 101.0), (101.0, 105.0), (105.0, 107.0)]
        );
        assert!(rows.iter().all(|r| r.features.sentiment == 0.2));
    }

    #[test]
    fn test_n_minus_one_rows() {
        for n in 2..20 {
            let closes: Vec<f64> = (0..n).map(|i| 50.0 + i as f64 * 0.5).collect();
            let series = PriceSeries::from_closes("T", &closes).unwrap();
            let rows = build_training_set(&series, SentimentScore(0.0));
            assert_eq!(rows.len(), n - 1);
            for (i, row) in rows.iter().enumerate() {
                assert_eq!(row.features.previous_close, closes[i]);
                assert_eq!(row.target, closes[i + 1]);
            }
        }
    }

    #[test]
    fn test_single_bar_yields_no_rows() {
        let series = PriceSeries::from_closes("AAPL", &[100.0]).unwrap();
        assert!(build_training_set(&series, SentimentScore(0.1)).is_empty());
    }

    #[test]
    fn test_missing_close_drops_its_row_and_the_next() {
        let series =
            PriceSeries::from_closes("AAPL", &[100.0, 101.0, f64::NAN, 103.0, 104.0]).unwrap();
        let rows = build_training_set(&series, SentimentScore(0.0));

        // (100->101) and (103->104) survive; (101->NaN) and (NaN->103) are dropped
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].target, 101.0);
        assert_eq!(rows[1].features.previous_close, 103.0);
    }

    #[test]
    fn test_non_finite_sentiment_drops_everything() {
        let series = PriceSeries::from_closes("AAPL", &[1.0, 2.0, 3.0]).unwrap();
        assert!(build_training_set(&series, SentimentScore(f64::NAN)).is_empty());
    }

    #[test]
    fn test_inference_features() {
        let fv = build_inference_features(107.0, SentimentScore(0.2)).unwrap();
        assert_eq!(fv.to_array(), [107.0, 0.2]);

        let err = build_inference_features(f64::NAN, SentimentScore(0.2)).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::InvalidInput {
                field: "last_close",
                ..
            }
        ));
    }
}
