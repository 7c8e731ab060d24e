//! # Backtester
//!
//! Replays a price series through a strategy and scores the result.
//!
//! The engine guarantees the strategy only ever sees the prefix of the series
//! up to the bar being decided, and that decisions are executed one bar later.
//! A run is a pure function of (strategy, parameters, prices): no shared state,
//! no randomness, so results are reproducible bit for bit and independent runs
//! can safely execute in parallel (see [`battle`]).

use crate::error::BacktestError;
use analytics::AnalyticsEngine;
use analytics::returns::{pct_change, shift_positions, strategy_returns};
use configuration::BacktestSettings;
use core_types::{ParameterSet, PriceSeries, Signal};
use strategies::{Strategy, StrategyLoader};

pub mod battle;
pub mod error;
pub mod result;

pub use battle::{BattleEntry, BattleOutcome, BattleReport, Contender, run_battle};
pub use result::BacktestResult;

/// The main backtesting engine.
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    analytics_engine: AnalyticsEngine,
}

/// Signals for every bar plus the number of bars that had to be recovered.
pub struct SignalTrace {
    pub signals: Vec<Signal>,
    pub recovered_bars: usize,
}

impl BacktestEngine {
    pub fn new(settings: &BacktestSettings) -> Self {
        Self { analytics_engine: AnalyticsEngine::new(settings) }
    }

    /// Computes the signal for every bar from the history prefix ending at it.
    ///
    /// A strategy error on one bar is recovered as [`Signal::Hold`]; the run
    /// continues.
    pub fn generate_signals(strategy: &mut dyn Strategy, series: &PriceSeries) -> SignalTrace {
        let mut recovered_bars = 0;
        let signals = (0..series.len())
            .map(|i| match strategy.generate_signal(&series[..=i]) {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::debug!(bar = i, error = %e, "Signal generation failed; holding.");
                    recovered_bars += 1;
                    Signal::Hold
                }
            })
            .collect();
        SignalTrace { signals, recovered_bars }
    }

    /// Runs the simulation for an already-constructed strategy.
    pub fn run(
        &self,
        strategy: &mut dyn Strategy,
        series: &PriceSeries,
    ) -> Result<BacktestResult, BacktestError> {
        let trace = Self::generate_signals(strategy, series);
        if trace.recovered_bars > 0 {
            tracing::warn!(
                recovered = trace.recovered_bars,
                bars = series.len(),
                "Strategy raised on some bars; they were treated as Hold."
            );
        }

        let positions = shift_positions(&trace.signals);
        let market = pct_change(&series.closes());
        let returns = strategy_returns(&positions, &market);

        let report = self.analytics_engine.calculate(&returns)?;
        Ok(BacktestResult::from_report(report, trace.recovered_bars))
    }

    /// Loads `source` through `loader` and runs it against `series`.
    ///
    /// `params == None` runs the strategy with its declared defaults. A load
    /// failure is returned as [`BacktestError::Load`] before any bar is
    /// evaluated.
    pub fn run_source(
        &self,
        loader: &dyn StrategyLoader,
        source: &str,
        params: Option<&ParameterSet>,
        series: &PriceSeries,
    ) -> Result<BacktestResult, BacktestError> {
        let mut strategy = loader.load(source, params)?;
        let result = self.run(strategy.as_mut(), series)?;
        tracing::debug!(
            source,
            ?params,
            sharpe = ?result.sharpe_ratio,
            total_return_pct = result.total_return_pct,
            "Backtest complete."
        );
        Ok(result)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::DateTime;
    use core_types::{PriceBar, PriceSeries};

    pub fn series(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: DateTime::from_timestamp(86_400 * i as i64, 0).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }
}
