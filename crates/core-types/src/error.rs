use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Price series is empty; the market data provider returned no bars")]
    EmptySeries,

    #[error("Price series is not chronological: bar {index} is dated before its predecessor")]
    NotChronological { index: usize },
}
