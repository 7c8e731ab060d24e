use crate::Strategy;
use crate::error::StrategyError;
use crate::schema::{ParameterDecl, integer, positive_length, resolve_parameters};
use core_types::{ParameterSet, PriceBar, Signal};

pub const PERIOD: &str = "period";
pub const BUY_THRESHOLD: &str = "buy_threshold";
pub const SELL_THRESHOLD: &str = "sell_threshold";

/// RSI mean-reversion strategy.
///
/// Buys when the RSI over the last `period` close-to-close changes drops below
/// `buy_threshold` (oversold) and sells when it rises above `sell_threshold`
/// (overbought). Between the two levels it stays flat.
///
/// The RSI here uses plain averages of gains and losses over the window rather
/// than Wilder smoothing, so every signal depends only on the last
/// `period + 1` closes.
pub struct RsiReversion {
    period: usize,
    buy_threshold: i64,
    sell_threshold: i64,
}

impl RsiReversion {
    pub fn new(params: Option<&ParameterSet>) -> Result<Self, StrategyError> {
        let resolved = resolve_parameters(&Self::defaults(), params)?;
        Ok(Self {
            period: positive_length(&resolved, PERIOD)?,
            buy_threshold: integer(&resolved, BUY_THRESHOLD)?,
            sell_threshold: integer(&resolved, SELL_THRESHOLD)?,
        })
    }

    fn defaults() -> Vec<ParameterDecl> {
        vec![
            ParameterDecl::new(PERIOD, 14),
            ParameterDecl::new(BUY_THRESHOLD, 30),
            ParameterDecl::new(SELL_THRESHOLD, 70),
        ]
    }
}

/// Simple-average RSI of the last `period` changes in `history`.
///
/// Requires at least `period + 1` bars. With no losses in the window the RSI
/// is pinned at 100.
pub(crate) fn simple_rsi(history: &[PriceBar], period: usize) -> f64 {
    let start = history.len() - period - 1;
    let (gain, loss) = history[start..]
        .windows(2)
        .map(|pair| pair[1].close - pair[0].close)
        .fold((0.0, 0.0), |(gain, loss), delta| {
            if delta > 0.0 {
                (gain + delta, loss)
            } else {
                (gain, loss - delta)
            }
        });

    let n = period as f64;
    let (avg_gain, avg_loss) = (gain / n, loss / n);
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

impl Strategy for RsiReversion {
    fn declared_parameters(&self) -> Vec<ParameterDecl> {
        vec![
            ParameterDecl::new(PERIOD, self.period as i64),
            ParameterDecl::new(BUY_THRESHOLD, self.buy_threshold),
            ParameterDecl::new(SELL_THRESHOLD, self.sell_threshold),
        ]
    }

    fn generate_signal(&mut self, history: &[PriceBar]) -> Result<Signal, StrategyError> {
        if history.len() < self.period + 1 {
            return Ok(Signal::Hold);
        }

        let rsi = simple_rsi(history, self.period);
        if !rsi.is_finite() {
            return Err(StrategyError::IndicatorError(format!(
                "RSI is not finite ({}) over the last {} bars",
                rsi, self.period
            )));
        }

        let signal = if rsi < self.buy_threshold as f64 {
            Signal::Buy
        } else if rsi > self.sell_threshold as f64 {
            Signal::Sell
        } else {
            Signal::Hold
        };
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bars;

    fn with_period(period: i64) -> ParameterSet {
        ParameterSet::from([(PERIOD.to_string(), period)])
    }

    #[test]
    fn test_rsi_known_values() {
        // Two gains of 1 and one loss of 2 over three changes: RS = 2/2 = 1 -> RSI 50.
        let history = bars(&[10.0, 11.0, 12.0, 10.0]);
        assert!((simple_rsi(&history, 3) - 50.0).abs() < 1e-9);

        let only_gains = bars(&[1.0, 2.0, 3.0]);
        assert_eq!(simple_rsi(&only_gains, 2), 100.0);
    }

    #[test]
    fn test_oversold_buys_and_overbought_sells() {
        let mut strategy = RsiReversion::new(Some(&with_period(3))).unwrap();
        let selloff = bars(&[10.0, 9.0, 8.0, 7.0]);
        assert_eq!(strategy.generate_signal(&selloff), Ok(Signal::Buy));

        let rally = bars(&[7.0, 8.0, 9.0, 10.0]);
        assert_eq!(strategy.generate_signal(&rally), Ok(Signal::Sell));

        let balanced = bars(&[10.0, 11.0, 12.0, 10.0]);
        assert_eq!(strategy.generate_signal(&balanced), Ok(Signal::Hold));
    }

    #[test]
    fn test_holds_until_enough_history() {
        let mut strategy = RsiReversion::new(None).unwrap();
        let history = bars(&[1.0; 14]);
        assert_eq!(strategy.generate_signal(&history), Ok(Signal::Hold));
    }

    #[test]
    fn test_non_finite_prices_raise() {
        let mut strategy = RsiReversion::new(Some(&with_period(2))).unwrap();
        let history = bars(&[1.0, f64::NAN, 2.0]);
        assert!(strategy.generate_signal(&history).is_err());
    }
}
