use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("An error occurred during indicator calculation: {0}")]
    IndicatorError(String),

    #[error("Strategy '{0}' not found or implemented")]
    UnknownStrategy(String),
}

impl StrategyError {
    /// True for errors that prevent a strategy from being constructed at all.
    ///
    /// These are fatal for a whole backtest or optimization request, whereas
    /// indicator errors raised while generating a signal only affect one bar.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            StrategyError::InvalidParameters(_) | StrategyError::UnknownStrategy(_)
        )
    }
}
