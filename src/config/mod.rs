//! Configuration module for Stocksight.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Data source, News, Predictor, and Dashboard.

mod dashboard_config;
mod data_source_config;
mod news_config;
mod predictor_config;

pub use dashboard_config::{
    DashboardEnvConfig, MAX_REFRESH_SECS, MIN_REFRESH_SECS, clamp_refresh_secs,
};
pub use data_source_config::{DataSourceEnvConfig, DataSourceKind};
pub use news_config::NewsEnvConfig;
pub use predictor_config::PredictorEnvConfig;

use anyhow::{Context, Result};

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub data_source: DataSourceEnvConfig,
    pub news: NewsEnvConfig,
    pub predictor: PredictorEnvConfig,
    pub dashboard: DashboardEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_source =
            DataSourceEnvConfig::from_env().context("Failed to load data source config")?;
        let news = NewsEnvConfig::from_env();
        let predictor = PredictorEnvConfig::from_env();
        let dashboard = DashboardEnvConfig::from_env().context("Failed to load dashboard config")?;

        Ok(Config {
            data_source,
            news,
            predictor,
            dashboard,
        })
    }
}
