use crate::Strategy;
use crate::error::StrategyError;
use crate::schema::{ParameterDecl, positive_length, resolve_parameters};
use core_types::{ParameterSet, PriceBar, Signal};
use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

pub const SHORT_WINDOW: &str = "short_window";
pub const LONG_WINDOW: &str = "long_window";

/// The Golden Cross trend-following strategy.
///
/// Long while the short moving average of closes sits above the long one,
/// short while it sits below, flat on a tie or until `long_window` bars exist.
pub struct GoldenCross {
    short_window: usize,
    long_window: usize,
}

impl GoldenCross {
    pub const DEFAULT_SHORT_WINDOW: i64 = 13;
    pub const DEFAULT_LONG_WINDOW: i64 = 33;

    /// Creates a new `GoldenCross`, filling unspecified parameters with defaults.
    ///
    /// The windows are not required to be ordered: the optimizer may well try
    /// a short window longer than the long one, and that is a legitimate
    /// (if unusual) configuration to evaluate.
    pub fn new(params: Option<&ParameterSet>) -> Result<Self, StrategyError> {
        let resolved = resolve_parameters(&Self::defaults(), params)?;
        Ok(Self {
            short_window: positive_length(&resolved, SHORT_WINDOW)?,
            long_window: positive_length(&resolved, LONG_WINDOW)?,
        })
    }

    fn defaults() -> Vec<ParameterDecl> {
        vec![
            ParameterDecl::new(SHORT_WINDOW, Self::DEFAULT_SHORT_WINDOW),
            ParameterDecl::new(LONG_WINDOW, Self::DEFAULT_LONG_WINDOW),
        ]
    }
}

/// Mean of the last `window` closes (or of all of them when fewer exist).
pub(crate) fn trailing_mean(history: &[PriceBar], window: usize) -> Result<f64, StrategyError> {
    let mut sma = Sma::new(window)
        .map_err(|e| StrategyError::IndicatorError(format!("Failed to initialize SMA: {:?}", e)))?;
    let start = history.len().saturating_sub(window);
    Ok(history[start..]
        .iter()
        .fold(0.0, |_, bar| sma.next(bar.close)))
}

impl Strategy for GoldenCross {
    fn declared_parameters(&self) -> Vec<ParameterDecl> {
        vec![
            ParameterDecl::new(SHORT_WINDOW, self.short_window as i64),
            ParameterDecl::new(LONG_WINDOW, self.long_window as i64),
        ]
    }

    fn generate_signal(&mut self, history: &[PriceBar]) -> Result<Signal, StrategyError> {
        if history.len() < self.long_window {
            return Ok(Signal::Hold);
        }

        let short_mavg = trailing_mean(history, self.short_window)?;
        let long_mavg = trailing_mean(history, self.long_window)?;

        let signal = if short_mavg > long_mavg {
            Signal::Buy
        } else if short_mavg < long_mavg {
            Signal::Sell
        } else {
            Signal::Hold
        };
        Ok(signal)
    }
}
