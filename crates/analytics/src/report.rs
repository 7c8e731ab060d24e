use serde::{Deserialize, Serialize};

/// Metrics derived from one series of strategy returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Annualized Sharpe ratio, rounded to 2 dp. `None` only under the
    /// `undefined` zero-variance policy.
    pub sharpe_ratio: Option<f64>,
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    /// Compounded value of one unit invested, one point per bar, starting at 1.0.
    pub equity_curve: Vec<f64>,
}
