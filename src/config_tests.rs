use crate::config::{Config, DataSourceKind};
use crate::domain::market::HistoryPeriod;
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const VARS: [&str; 9] = [
    "DATA_SOURCE",
    "PRICE_CACHE_TTL_SECS",
    "NEWS_API_KEY",
    "NEWS_PAGE_SIZE",
    "STANDARDIZE_FEATURES",
    "DEFAULT_TICKER",
    "DEFAULT_PERIOD",
    "REFRESH_INTERVAL_SECS",
    "LOG_LEVEL",
];

fn clear_vars() {
    for var in VARS {
        unsafe { env::remove_var(var) };
    }
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_vars();

    let config = Config::from_env().unwrap();

    assert_eq!(config.data_source.kind, DataSourceKind::Yahoo);
    assert_eq!(config.data_source.price_cache_ttl_secs, 300);
    assert!(config.news.api_key.is_none());
    assert!(config.predictor.standardize);
    assert_eq!(config.dashboard.default_ticker, "AAPL");
    assert_eq!(config.dashboard.default_period, HistoryPeriod::SixMonths);
    assert_eq!(config.dashboard.refresh_interval_secs, 60);
}

#[test]
fn test_config_reads_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    clear_vars();

    unsafe {
        env::set_var("DATA_SOURCE", "mock");
        env::set_var("NEWS_API_KEY", "  secret  ");
        env::set_var("STANDARDIZE_FEATURES", "false");
        env::set_var("DEFAULT_TICKER", "msft");
        env::set_var("DEFAULT_PERIOD", "1Y");
        env::set_var("REFRESH_INTERVAL_SECS", "120");
    }

    let config = Config::from_env().unwrap();

    assert_eq!(config.data_source.kind, DataSourceKind::Mock);
    assert_eq!(config.news.api_key.as_deref(), Some("secret"));
    assert!(!config.predictor.standardize);
    assert_eq!(config.dashboard.default_ticker, "MSFT");
    assert_eq!(config.dashboard.default_period, HistoryPeriod::OneYear);
    assert_eq!(config.dashboard.refresh_interval_secs, 120);

    clear_vars();
}

#[test]
fn test_config_malformed_numbers_fall_back() {
    let _guard = get_env_lock().lock().unwrap();
    clear_vars();

    unsafe {
        env::set_var("PRICE_CACHE_TTL_SECS", "five minutes");
        env::set_var("NEWS_PAGE_SIZE", "-3");
        env::set_var("REFRESH_INTERVAL_SECS", "abc");
    }

    let config = Config::from_env().unwrap();

    assert_eq!(config.data_source.price_cache_ttl_secs, 300);
    assert_eq!(config.news.page_size, 50);
    assert_eq!(config.dashboard.refresh_interval_secs, 60);

    clear_vars();
}

#[test]
fn test_config_refresh_interval_is_clamped() {
    let _guard = get_env_lock().lock().unwrap();
    clear_vars();

    unsafe { env::set_var("REFRESH_INTERVAL_SECS", "2") };
    assert_eq!(Config::from_env().unwrap().dashboard.refresh_interval_secs, 10);

    unsafe { env::set_var("REFRESH_INTERVAL_SECS", "86400") };
    assert_eq!(Config::from_env().unwrap().dashboard.refresh_interval_secs, 600);

    clear_vars();
}

#[test]
fn test_config_invalid_enum_is_error() {
    let _guard = get_env_lock().lock().unwrap();
    clear_vars();

    unsafe { env::set_var("DATA_SOURCE", "bloomberg") };
    assert!(Config::from_env().is_err());

    unsafe {
        env::set_var("DATA_SOURCE", "yahoo");
        env::set_var("DEFAULT_PERIOD", "3 weeks");
    }
    assert!(Config::from_env().is_err());

    clear_vars();
}
