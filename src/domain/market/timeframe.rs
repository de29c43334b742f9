use crate::domain::errors::MarketDataError;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bar interval requested from the price source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    FifteenMin,
    OneDay,
}

impl Timeframe {
    /// Returns the duration of this timeframe in minutes
    pub fn to_minutes(&self) -> usize {
        match self {
            Timeframe::FifteenMin => 15,
            Timeframe::OneDay => 1440,
        }
    }

    /// Converts to Yahoo chart API interval string
    pub fn to_yahoo_string(&self) -> &'static str {
        match self {
            Timeframe::FifteenMin => "15m",
            Timeframe::OneDay => "1d",
        }
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "15m" | "15min" | "fifteenmin" => Ok(Timeframe::FifteenMin),
            "1d" | "1day" | "oneday" => Ok(Timeframe::OneDay),
            _ => Err(anyhow!(
                "Invalid timeframe: '{}'. Valid options: 15m, 1d",
                s
            )),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_yahoo_string())
    }
}

/// Predefined look-back windows offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryPeriod {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl HistoryPeriod {
    pub fn code(&self) -> &'static str {
        match self {
            HistoryPeriod::OneDay => "1d",
            HistoryPeriod::FiveDays => "5d",
            HistoryPeriod::OneMonth => "1mo",
            HistoryPeriod::ThreeMonths => "3mo",
            HistoryPeriod::SixMonths => "6mo",
            HistoryPeriod::OneYear => "1y",
            HistoryPeriod::TwoYears => "2y",
            HistoryPeriod::FiveYears => "5y",
            HistoryPeriod::Max => "max",
        }
    }

    /// Human label as shown in the period selector
    pub fn label(&self) -> &'static str {
        match self {
            HistoryPeriod::OneDay => "1 Day",
            HistoryPeriod::FiveDays => "5 Days",
            HistoryPeriod::OneMonth => "1 Month",
            HistoryPeriod::ThreeMonths => "3 Months",
            HistoryPeriod::SixMonths => "6 Months",
            HistoryPeriod::OneYear => "1 Year",
            HistoryPeriod::TwoYears => "2 Years",
            HistoryPeriod::FiveYears => "5 Years",
            HistoryPeriod::Max => "Max",
        }
    }

    /// Intraday bars for the short windows, daily bars otherwise.
    pub fn timeframe(&self) -> Timeframe {
        match self {
            HistoryPeriod::OneDay | HistoryPeriod::FiveDays => Timeframe::FifteenMin,
            _ => Timeframe::OneDay,
        }
    }

    /// Approximate calendar length in days, `None` for `max`.
    pub fn approx_days(&self) -> Option<i64> {
        match self {
            HistoryPeriod::OneDay => Some(1),
            HistoryPeriod::FiveDays => Some(5),
            HistoryPeriod::OneMonth => Some(30),
            HistoryPeriod::ThreeMonths => Some(91),
            HistoryPeriod::SixMonths => Some(182),
            HistoryPeriod::OneYear => Some(365),
            HistoryPeriod::TwoYears => Some(730),
            HistoryPeriod::FiveYears => Some(1826),
            HistoryPeriod::Max => None,
        }
    }

    pub fn all() -> Vec<HistoryPeriod> {
        vec![
            HistoryPeriod::OneDay,
            HistoryPeriod::FiveDays,
            HistoryPeriod::OneMonth,
            HistoryPeriod::ThreeMonths,
            HistoryPeriod::SixMonths,
            HistoryPeriod::OneYear,
            HistoryPeriod::TwoYears,
            HistoryPeriod::FiveYears,
            HistoryPeriod::Max,
        ]
    }
}

impl FromStr for HistoryPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        HistoryPeriod::all()
            .into_iter()
            .find(|p| p.code() == wanted)
            .ok_or_else(|| {
                anyhow!(
                    "Invalid period: '{}'. Valid options: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, max",
                    s
                )
            })
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What slice of history to request: a predefined period or an explicit date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryRange {
    Period(HistoryPeriod),
    Custom { start: NaiveDate, end: NaiveDate },
}

impl HistoryRange {
    /// Builds a custom range, rejecting empty or inverted windows.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, MarketDataError> {
        if start >= end {
            return Err(MarketDataError::UnsupportedRange {
                reason: format!("start date {} must be before end date {}", start, end),
            });
        }
        Ok(HistoryRange::Custom { start, end })
    }

    pub fn timeframe(&self) -> Timeframe {
        match self {
            HistoryRange::Period(period) => period.timeframe(),
            HistoryRange::Custom { .. } => Timeframe::OneDay,
        }
    }

    pub fn label(&self) -> String {
        match self {
            HistoryRange::Period(period) => period.label().to_string(),
            HistoryRange::Custom { start, end } => format!("{} to {}", start, end),
        }
    }

    /// Stable key used by caches
    pub fn cache_key(&self) -> String {
        match self {
            HistoryRange::Period(period) => period.code().to_string(),
            HistoryRange::Custom { start, end } => format!("{}..{}", start, end),
        }
    }
}

impl Default for HistoryRange {
    fn default() -> Self {
        HistoryRange::Period(HistoryPeriod::SixMonths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_periods_use_intraday_bars() {
        assert_eq!(HistoryPeriod::OneDay.timeframe(), Timeframe::FifteenMin);
        assert_eq!(HistoryPeriod::FiveDays.timeframe(), Timeframe::FifteenMin);
        assert_eq!(HistoryPeriod::OneMonth.timeframe(), Timeframe::OneDay);
        assert_eq!(HistoryPeriod::Max.timeframe(), Timeframe::OneDay);
    }

    #[test]
    fn test_period_from_str() {
        assert_eq!(
            HistoryPeriod::from_str("6mo").unwrap(),
            HistoryPeriod::SixMonths
        );
        assert_eq!(HistoryPeriod::from_str("MAX").unwrap(), HistoryPeriod::Max);
        assert_eq!(HistoryPeriod::from_str(" 1y ").unwrap(), HistoryPeriod::OneYear);
        assert!(HistoryPeriod::from_str("7w").is_err());
    }

    #[test]
    fn test_timeframe_from_str() {
        assert_eq!(Timeframe::from_str("15m").unwrap(), Timeframe::FifteenMin);
        assert_eq!(Timeframe::from_str("1Day").unwrap(), Timeframe::OneDay);
        assert!(Timeframe::from_str("4h").is_err());
    }

    #[test]
    fn test_custom_range_validation() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let range = HistoryRange::custom(start, end).unwrap();
        assert_eq!(range.timeframe(), Timeframe::OneDay);
        assert_eq!(range.label(), "2024-01-01 to 2024-06-01");

        assert!(HistoryRange::custom(end, start).is_err());
        assert!(HistoryRange::custom(start, start).is_err());
    }

    #[test]
    fn test_default_range_is_six_months() {
        assert_eq!(
            HistoryRange::default(),
            HistoryRange::Period(HistoryPeriod::SixMonths)
        );
    }
}
