use analytics::PerformanceReport;
use serde::{Deserialize, Serialize};

/// The outcome of one backtest run. Produced fresh per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Annualized Sharpe ratio rounded to 2 dp; `null` only under the
    /// `undefined` zero-variance policy.
    pub sharpe_ratio: Option<f64>,
    pub total_return_pct: f64,
    /// One point per price bar, starting at exactly 1.0.
    pub equity_curve: Vec<f64>,
    pub max_drawdown_pct: f64,
    /// Number of bars evaluated.
    pub bars: usize,
    /// Bars on which the strategy raised and was treated as holding.
    pub recovered_bars: usize,
}

impl BacktestResult {
    pub(crate) fn from_report(report: PerformanceReport, recovered_bars: usize) -> Self {
        Self {
            sharpe_ratio: report.sharpe_ratio,
            total_return_pct: report.total_return_pct,
            bars: report.equity_curve.len(),
            equity_curve: report.equity_curve,
            max_drawdown_pct: report.max_drawdown_pct,
            recovered_bars,
        }
    }

    /// Final value of one unit invested.
    pub fn final_equity(&self) -> f64 {
        self.equity_curve.last().copied().unwrap_or(1.0)
    }
}
