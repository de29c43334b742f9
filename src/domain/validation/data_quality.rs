use crate::domain::market::PriceBar;
use tracing::warn;

/// Sanity checks for bars coming from external price sources.
///
/// Non-finite fields mean "missing" and are not reported here; the feature
/// builder drops those rows. This only flags values that are present but impossible.
pub struct BarValidator;

impl BarValidator {
    /// Returns true if the bar is plausible, false (with a warning) otherwise.
    pub fn validate_bar(ticker: &str, bar: &PriceBar) -> bool {
        let prices = [bar.open, bar.high, bar.low, bar.close];

        if prices.iter().any(|p| p.is_finite() && *p <= 0.0) {
            warn!(
                "Validation FAILED: {} bar at {} has non-positive price component(s)",
                ticker, bar.timestamp
            );
            return false;
        }

        if bar.low.is_finite() && bar.high.is_finite() && bar.low > bar.high {
            warn!(
                "Validation FAILED: {} bar at {} has low {} > high {}",
                ticker, bar.timestamp, bar.low, bar.high
            );
            return false;
        }

        if bar.volume.is_finite() && bar.volume < 0.0 {
            warn!(
                "Validation FAILED: {} bar at {} has negative volume: {}",
                ticker, bar.timestamp, bar.volume
            );
            return false;
        }

        true
    }

    /// Number of implausible bars in a batch
    pub fn count_invalid(ticker: &str, bars: &[PriceBar]) -> usize {
        bars.iter()
            .filter(|bar| !Self::validate_bar(ticker, bar))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bar(open: f64, high: f64, low: f64, close: f64, volume: f64) -> PriceBar {
        PriceBar {
            timestamp: Utc::now(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    #[test]
    fn test_valid_bar() {
        assert!(BarValidator::validate_bar(
            "AAPL",
            &bar(100.0, 101.0, 99.0, 100.5, 1_000.0)
        ));
    }

    #[test]
    fn test_negative_price() {
        assert!(!BarValidator::validate_bar(
            "AAPL",
            &bar(-1.0, 101.0, 99.0, 100.5, 1_000.0)
        ));
    }

    #[test]
    fn test_low_above_high() {
        assert!(!BarValidator::validate_bar(
            "AAPL",
            &bar(100.0, 100.0, 101.0, 100.0, 1_000.0)
        ));
    }

    #[test]
    fn test_missing_values_are_not_invalid() {
        assert!(BarValidator::validate_bar(
            "AAPL",
            &bar(f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN)
        ));
    }

    #[test]
    fn test_count_invalid() {
        let bars = vec![
            bar(100.0, 101.0, 99.0, 100.5, 10.0),
            bar(100.0, 101.0, 99.0, 100.5, -10.0),
        ];
        assert_eq!(BarValidator::count_invalid("AAPL", &bars), 1);
    }
}
