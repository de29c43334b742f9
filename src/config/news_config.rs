//! News sentiment configuration parsed from environment variables.

use std::env;

#[derive(Debug, Clone)]
pub struct NewsEnvConfig {
    /// Without a key the dashboard falls back to a neutral sentiment
    pub api_key: Option<String>,
    pub api_url: String,
    pub page_size: u32,
    pub lookback_days: i64,
    pub cache_ttl_secs: u64,
}

impl Default for NewsEnvConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://newsapi.org/v2/everything".to_string(),
            page_size: 50,
            lookback_days: 28,
            cache_ttl_secs: 3600,
        }
    }
}

impl NewsEnvConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_key: env::var("NEWS_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            api_url: env::var("NEWS_API_URL").unwrap_or(defaults.api_url),
            page_size: env::var("NEWS_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .map(|v| v.clamp(1, 100))
                .unwrap_or(defaults.page_size),
            lookback_days: env::var("NEWS_LOOKBACK_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.lookback_days),
            cache_ttl_secs: env::var("NEWS_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.cache_ttl_secs),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
