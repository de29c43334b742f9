//! Price and fundamentals source configuration parsed from environment variables.

use anyhow::Result;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where price history comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSourceKind {
    #[default]
    Yahoo,
    Csv,
    Mock,
}

impl FromStr for DataSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(DataSourceKind::Yahoo),
            "csv" => Ok(DataSourceKind::Csv),
            "mock" => Ok(DataSourceKind::Mock),
            _ => anyhow::bail!(
                "Invalid DATA_SOURCE: {}. Must be 'yahoo', 'csv', or 'mock'",
                s
            ),
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataSourceKind::Yahoo => "yahoo",
            DataSourceKind::Csv => "csv",
            DataSourceKind::Mock => "mock",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct DataSourceEnvConfig {
    pub kind: DataSourceKind,
    pub yahoo_chart_url: String,
    pub yahoo_quote_summary_url: String,
    pub csv_data_dir: PathBuf,
    pub price_cache_ttl_secs: u64,
}

impl Default for DataSourceEnvConfig {
    fn default() -> Self {
        Self {
            kind: DataSourceKind::Yahoo,
            yahoo_chart_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            yahoo_quote_summary_url: "https://query2.finance.yahoo.com/v10/finance/quoteSummary"
                .to_string(),
            csv_data_dir: PathBuf::from("data"),
            price_cache_ttl_secs: 300,
        }
    }
}

impl DataSourceEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let kind = match env::var("DATA_SOURCE") {
            Ok(value) => DataSourceKind::from_str(&value)?,
            Err(_) => defaults.kind,
        };

        Ok(Self {
            kind,
            yahoo_chart_url: env::var("YAHOO_CHART_URL").unwrap_or(defaults.yahoo_chart_url),
            yahoo_quote_summary_url: env::var("YAHOO_QUOTE_SUMMARY_URL")
                .unwrap_or(defaults.yahoo_quote_summary_url),
            csv_data_dir: env::var("CSV_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.csv_data_dir),
            price_cache_ttl_secs: env::var("PRICE_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.price_cache_ttl_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_kind_parsing() {
        assert_eq!(DataSourceKind::from_str("YAHOO").unwrap(), DataSourceKind::Yahoo);
        assert_eq!(DataSourceKind::from_str(" csv ").unwrap(), DataSourceKind::Csv);
        assert_eq!(DataSourceKind::from_str("mock").unwrap(), DataSourceKind::Mock);
        assert!(DataSourceKind::from_str("alpaca").is_err());
    }

    #[test]
    fn test_data_source_defaults() {
        let config = DataSourceEnvConfig::default();
        assert_eq!(config.kind, DataSourceKind::Yahoo);
        assert_eq!(config.price_cache_ttl_secs, 300);
        assert!(config.yahoo_chart_url.ends_with("/v8/finance/chart"));
    }
}
