// Market data processing
pub mod market_data;

// Feature building and price models
pub mod ml;

// Refresh orchestrator
pub mod forecast_service;
