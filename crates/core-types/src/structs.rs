use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A single OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A non-empty, chronologically ordered sequence of bars.
///
/// The series is immutable once constructed. It derefs to `[PriceBar]`, so
/// the engine can hand strategies a prefix slice (`&series[..=i]`) without
/// copying.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Validates and wraps a vector of bars.
    ///
    /// An empty vector is the "market data empty" condition and is rejected
    /// here so that nothing downstream ever sees a zero-length series.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, CoreError> {
        if bars.is_empty() {
            return Err(CoreError::EmptySeries);
        }
        if let Some(index) = bars
            .windows(2)
            .position(|pair| pair[1].date < pair[0].date)
        {
            return Err(CoreError::NotChronological { index: index + 1 });
        }
        Ok(Self { bars })
    }

    /// Closing prices in bar order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|bar| bar.date).collect()
    }
}

impl Deref for PriceSeries {
    type Target = [PriceBar];

    fn deref(&self) -> &Self::Target {
        &self.bars
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = CoreError;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bars = Vec::<PriceBar>::deserialize(deserializer)?;
        PriceSeries::new(bars).map_err(serde::de::Error::custom)
    }
}
