use crate::Strategy;
use crate::error::StrategyError;
use crate::schema::{ParameterDecl, positive_length, resolve_parameters};
use core_types::{ParameterSet, PriceBar, Signal};

pub const LOOKBACK_PERIOD_MONTHS: &str = "lookback_period_months";
pub const TRADING_DAYS_PER_MONTH: &str = "trading_days_per_month";

/// Time-series momentum: long after a positive trailing return, short after a
/// negative one, measured over `lookback_period_months * trading_days_per_month`
/// bars.
pub struct TimeSeriesMomentum {
    lookback_period_months: usize,
    trading_days_per_month: usize,
}

impl TimeSeriesMomentum {
    pub fn new(params: Option<&ParameterSet>) -> Result<Self, StrategyError> {
        let resolved = resolve_parameters(&Self::defaults(), params)?;
        Ok(Self {
            lookback_period_months: positive_length(&resolved, LOOKBACK_PERIOD_MONTHS)?,
            trading_days_per_month: positive_length(&resolved, TRADING_DAYS_PER_MONTH)?,
        })
    }

    fn defaults() -> Vec<ParameterDecl> {
        vec![
            ParameterDecl::new(LOOKBACK_PERIOD_MONTHS, 12),
            ParameterDecl::new(TRADING_DAYS_PER_MONTH, 21),
        ]
    }

    fn lookback_bars(&self) -> usize {
        self.lookback_period_months
            .saturating_mul(self.trading_days_per_month)
    }
}

impl Strategy for TimeSeriesMomentum {
    fn declared_parameters(&self) -> Vec<ParameterDecl> {
        vec![
            ParameterDecl::new(LOOKBACK_PERIOD_MONTHS, self.lookback_period_months as i64),
            ParameterDecl::new(TRADING_DAYS_PER_MONTH, self.trading_days_per_month as i64),
        ]
    }

    fn generate_signal(&mut self, history: &[PriceBar]) -> Result<Signal, StrategyError> {
        let lookback = self.lookback_bars();
        if history.len() <= lookback {
            return Ok(Signal::Hold);
        }

        let current = history[history.len() - 1].close;
        let past = history[history.len() - 1 - lookback].close;
        if past == 0.0 {
            return Ok(Signal::Hold);
        }

        let momentum = current / past - 1.0;
        let signal = if momentum > 0.0 {
            Signal::Buy
        } else if momentum < 0.0 {
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

    fn short_lookback() -> ParameterSet {
        ParameterSet::from([
            (LOOKBACK_PERIOD_MONTHS.to_string(), 1),
            (TRADING_DAYS_PER_MONTH.to_string(), 2),
        ])
    }

    #[test]
    fn test_compares_against_lookback_bar() {
        let mut strategy = TimeSeriesMomentum::new(Some(&short_lookback())).unwrap();
        // Needs lookback + 1 = 3 bars.
        assert_eq!(strategy.generate_signal(&bars(&[1.0, 2.0])), Ok(Signal::Hold));
        assert_eq!(strategy.generate_signal(&bars(&[1.0, 9.0, 2.0])), Ok(Signal::Buy));
        assert_eq!(strategy.generate_signal(&bars(&[3.0, 9.0, 2.0])), Ok(Signal::Sell));
        assert_eq!(strategy.generate_signal(&bars(&[2.0, 9.0, 2.0])), Ok(Signal::Hold));
    }

    #[test]
    fn test_zero_past_price_holds() {
        let mut strategy = TimeSeriesMomentum::new(Some(&short_lookback())).unwrap();
        assert_eq!(strategy.generate_signal(&bars(&[0.0, 1.0, 2.0])), Ok(Signal::Hold));
    }

    #[test]
    fn test_default_lookback_is_one_year() {
        let strategy = TimeSeriesMomentum::new(None).unwrap();
        assert_eq!(strategy.lookback_bars(), 252);
    }
}
