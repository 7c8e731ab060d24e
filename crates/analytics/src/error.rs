use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Strategy returns have zero variance over {observations} observations; Sharpe ratio is undefined")]
    DegenerateSeries { observations: usize },

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),
}
