use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerError {
    /// The strategy could not be loaded for parameter discovery. Fatal.
    #[error("Failed to load strategy for parameter discovery: {0}")]
    Load(#[from] strategies::StrategyError),

    #[error("Invalid optimizer settings: {0}")]
    Settings(#[from] configuration::error::ConfigError),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}
