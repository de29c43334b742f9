//! Dashboard defaults parsed from environment variables.

use crate::domain::market::HistoryPeriod;
use anyhow::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const MIN_REFRESH_SECS: u64 = 10;
pub const MAX_REFRESH_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct DashboardEnvConfig {
    pub default_ticker: String,
    pub default_period: HistoryPeriod,
    pub refresh_interval_secs: u64,
    pub log_level: String,
}

impl Default for DashboardEnvConfig {
    fn default() -> Self {
        Self {
            default_ticker: "AAPL".to_string(),
            default_period: HistoryPeriod::SixMonths,
            refresh_interval_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

impl DashboardEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let default_period = match env::var("DEFAULT_PERIOD") {
            Ok(value) => HistoryPeriod::from_str(&value)?,
            Err(_) => defaults.default_period,
        };

        Ok(Self {
            default_ticker: env::var("DEFAULT_TICKER")
                .map(|t| t.trim().to_uppercase())
                .ok()
                .filter(|t| !t.is_empty())
                .unwrap_or(defaults.default_ticker),
            default_period,
            refresh_interval_secs: clamp_refresh_secs(
                env::var("REFRESH_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(defaults.refresh_interval_secs),
            ),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// Keeps the auto-refresh within the range the dashboard offers
pub fn clamp_refresh_secs(secs: u64) -> u64 {
    secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_refresh_secs() {
        assert_eq!(clamp_refresh_secs(1), 10);
        assert_eq!(clamp_refresh_secs(60), 60);
        assert_eq!(clamp_refresh_secs(3600), 600);
    }

    #[test]
    fn test_dashboard_defaults() {
        let config = DashboardEnvConfig::default();
        assert_eq!(config.default_ticker, "AAPL");
        assert_eq!(config.default_period, HistoryPeriod::SixMonths);
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
    }
}
