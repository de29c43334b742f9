// Domain-specific error types
pub mod errors;

// Company fundamentals and metric formatting
pub mod fundamentals;

// Price history and ranges
pub mod market;

// Model inputs
pub mod ml;

// Port interfaces
pub mod ports;

// News sentiment
pub mod sentiment;

// Market data integrity checks
pub mod validation;
