use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use configuration::{BacktestSettings, ZeroVariancePolicy};
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

/// Standard deviations at or below this are treated as zero variance.
const VARIANCE_EPSILON: f64 = 1e-12;

/// Rounds half-to-even at `dp` decimal places.
///
/// Values outside the `Decimal` range (or non-finite ones) are returned unrounded.
pub fn round_dp(value: f64, dp: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// A stateless calculator for deriving performance metrics from strategy returns.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    annualization_factor: f64,
    zero_variance: ZeroVariancePolicy,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(&BacktestSettings::default())
    }
}

impl AnalyticsEngine {
    pub fn new(settings: &BacktestSettings) -> Self {
        Self {
            annualization_factor: settings.annualization_factor,
            zero_variance: settings.zero_variance,
        }
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `strategy_returns` - One entry per bar; `None` where the return is
    ///   undefined (bar 0). Undefined entries contribute a flat bar to the
    ///   equity curve and are excluded from the Sharpe statistics.
    pub fn calculate(
        &self,
        strategy_returns: &[Option<f64>],
    ) -> Result<PerformanceReport, AnalyticsError> {
        if strategy_returns.is_empty() {
            return Err(AnalyticsError::NotEnoughData(
                "at least one bar is required".to_string(),
            ));
        }

        let equity_curve = Self::equity_curve(strategy_returns);
        let final_equity = equity_curve.last().copied().unwrap_or(1.0);

        let defined: Vec<f64> = strategy_returns.iter().flatten().copied().collect();

        Ok(PerformanceReport {
            sharpe_ratio: self.sharpe_ratio(&defined)?,
            total_return_pct: round_dp((final_equity - 1.0) * 100.0, 2),
            max_drawdown_pct: round_dp(Self::max_drawdown_pct(&equity_curve), 2),
            equity_curve,
        })
    }

    /// Cumulative product of `1 + r`, with undefined returns counted as 0.
    pub fn equity_curve(strategy_returns: &[Option<f64>]) -> Vec<f64> {
        strategy_returns
            .iter()
            .scan(1.0_f64, |equity, ret| {
                *equity *= 1.0 + ret.unwrap_or(0.0);
                Some(*equity)
            })
            .collect()
    }

    /// Annualized Sharpe ratio (risk-free rate 0), rounded to 2 dp.
    ///
    /// Uses the sample standard deviation. Fewer than two observations, or
    /// no dispersion, is handled by the configured zero-variance policy.
    pub fn sharpe_ratio(&self, returns: &[f64]) -> Result<Option<f64>, AnalyticsError> {
        let n = returns.len();
        let std_dev = if n >= 2 {
            let mean = returns.iter().sum::<f64>() / n as f64;
            let variance = returns
                .iter()
                .map(|r| (r - mean) * (r - mean))
                .sum::<f64>()
                / (n - 1) as f64;
            Some((mean, variance.sqrt()))
        } else {
            None
        };

        match std_dev {
            Some((mean, sd)) if sd > VARIANCE_EPSILON => {
                let sharpe = mean / sd * self.annualization_factor.sqrt();
                Ok(Some(round_dp(sharpe, 2)))
            }
            _ => {
                tracing::debug!(observations = n, policy = ?self.zero_variance, "Degenerate return series.");
                match self.zero_variance {
                    ZeroVariancePolicy::Zero => Ok(Some(0.0)),
                    ZeroVariancePolicy::Undefined => Ok(None),
                    ZeroVariancePolicy::Error => {
                        Err(AnalyticsError::DegenerateSeries { observations: n })
                    }
                }
            }
        }
    }

    /// Largest peak-to-trough decline of the equity curve, in percent of the peak.
    pub fn max_drawdown_pct(equity_curve: &[f64]) -> f64 {
        let mut peak = match equity_curve.first() {
            Some(first) => *first,
            None => return 0.0,
        };
        let mut max_drawdown = 0.0_f64;

        for &equity in equity_curve {
            if equity > peak {
                peak = equity;
            }
            if peak > 0.0 {
                max_drawdown = max_drawdown.max((peak - equity) / peak);
            }
        }

        max_drawdown * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(policy: ZeroVariancePolicy) -> AnalyticsEngine {
        AnalyticsEngine::new(&BacktestSettings {
            annualization_factor: 252.0,
            zero_variance: policy,
        })
    }

    #[test]
    fn test_equity_curve_starts_at_one() {
        let curve = AnalyticsEngine::equity_curve(&[None, Some(0.10), Some(-0.10)]);
        assert_eq!(curve[0], 1.0);
        assert!((curve[1] - 1.10).abs() < 1e-12);
        assert!((curve[2] - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_sharpe_matches_hand_computation() {
        let returns = [0.01, -0.02, 0.03, 0.015];
        let mean = returns.iter().sum::<f64>() / 4.0;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 3.0;
        let expected = round_dp(mean / var.sqrt() * 252f64.sqrt(), 2);

        let sharpe = engine(ZeroVariancePolicy::Zero).sharpe_ratio(&returns).unwrap();
        assert_eq!(sharpe, Some(expected));
    }

    #[test]
    fn test_zero_variance_policies() {
        let flat = [0.0, 0.0, 0.0];
        assert_eq!(engine(ZeroVariancePolicy::Zero).sharpe_ratio(&flat), Ok(Some(0.0)));
        assert_eq!(engine(ZeroVariancePolicy::Undefined).sharpe_ratio(&flat), Ok(None));
        assert_eq!(
            engine(ZeroVariancePolicy::Error).sharpe_ratio(&flat),
            Err(AnalyticsError::DegenerateSeries { observations: 3 })
        );
        // A single observation has no sample variance either.
        assert_eq!(engine(ZeroVariancePolicy::Zero).sharpe_ratio(&[0.05]), Ok(Some(0.0)));
    }

    #[test]
    fn test_max_drawdown() {
        let dd = AnalyticsEngine::max_drawdown_pct(&[1.0, 1.2, 0.9, 1.1, 1.5]);
        assert!((dd - 25.0).abs() < 1e-9);
        assert_eq!(AnalyticsEngine::max_drawdown_pct(&[1.0, 1.1, 1.2]), 0.0);
    }

    #[test]
    fn test_round_dp_is_half_even() {
        assert_eq!(round_dp(0.125, 2), 0.12);
        assert_eq!(round_dp(0.135, 2), 0.14);
        assert_eq!(round_dp(-1.006, 2), -1.01);
        assert!(round_dp(f64::NAN, 2).is_nan());
    }

    #[test]
    fn test_calculate_requires_bars() {
        assert!(engine(ZeroVariancePolicy::Zero).calculate(&[]).is_err());
    }
}
