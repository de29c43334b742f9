use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictorEnvConfig {
    /// Z-score features before fitting
    pub standardize: bool,
}

impl Default for PredictorEnvConfig {
    fn default() -> Self {
        Self { standardize: true }
    }
}

impl PredictorEnvConfig {
    pub fn from_env() -> Self {
        Self {
            standardize: env::var("STANDARDIZE_FEATURES")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<bool>()
                .unwrap_or(true),
        }
    }
}
