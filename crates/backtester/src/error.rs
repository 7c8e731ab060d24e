use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    /// The strategy could not be constructed. Fatal for the whole request.
    #[error("Failed to load strategy: {0}")]
    Load(#[from] strategies::StrategyError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
}
