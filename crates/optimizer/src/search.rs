use crate::mutation::mutate;
use crate::record::OptimizationRecord;
use backtester::BacktestEngine;
use configuration::OptimizerSettings;
use core_types::{ParameterSet, PriceSeries};
use rand::Rng;
use std::sync::Arc;
use strategies::{ParameterSchema, StrategyLoader};

/// Reward recorded when a run completes without a Sharpe ratio.
pub const MISSING_SHARPE_REWARD: f64 = -1.0;

/// Where the search currently is in its fixed record sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Announce,
    Episode(u32),
    Complete,
    Summary,
    Done,
}

/// A hill-climbing parameter search, yielding one record per step.
///
/// The sequence is always: one announcement, one record per episode, a
/// completion marker, then a summary. Each episode perturbs the best set found
/// so far, backtests it and keeps it only on a strict improvement.
pub struct HillClimb<R> {
    engine: BacktestEngine,
    loader: Arc<dyn StrategyLoader>,
    source: String,
    series: PriceSeries,
    schema: ParameterSchema,
    settings: OptimizerSettings,
    rng: R,
    best_params: ParameterSet,
    best_reward: f64,
    phase: Phase,
}

impl<R: Rng> HillClimb<R> {
    pub(crate) fn new(
        engine: BacktestEngine,
        loader: Arc<dyn StrategyLoader>,
        source: &str,
        series: PriceSeries,
        schema: ParameterSchema,
        settings: OptimizerSettings,
        rng: R,
    ) -> Self {
        Self {
            best_params: schema.defaults(),
            best_reward: settings.initial_best_reward,
            engine,
            loader,
            source: source.to_string(),
            series,
            schema,
            settings,
            rng,
            phase: Phase::Announce,
        }
    }

    /// True when the next record is produced by running a backtest.
    pub fn next_is_episode(&self) -> bool {
        matches!(self.phase, Phase::Episode(_))
    }

    fn run_episode(&mut self, episode: u32) -> OptimizationRecord {
        let candidate = mutate(
            &self.schema,
            &self.best_params,
            self.settings.mutation_step,
            &mut self.rng,
        );
        tracing::debug!(episode, params = %format_params(&candidate), "Testing mutation.");

        let result = self.engine.run_source(
            self.loader.as_ref(),
            &self.source,
            Some(&candidate),
            &self.series,
        );

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(episode, error = %e, "Episode failed; best parameters unchanged.");
                return OptimizationRecord::message(format!("Ep {}: Error: {}", episode, e));
            }
        };

        let reward = result.sharpe_ratio.unwrap_or(MISSING_SHARPE_REWARD);
        let mut log = format!(
            "Ep {}: Testing {} -> Sharpe: {}",
            episode,
            format_params(&candidate),
            reward
        );
        if reward > self.best_reward {
            tracing::info!(episode, reward, previous = self.best_reward, "New best parameters.");
            self.best_reward = reward;
            self.best_params = candidate.clone();
            log.push_str(" (NEW RECORD!)");
        }

        OptimizationRecord::Episode { episode, log, reward, params: candidate }
    }
}

impl<R: Rng> Iterator for HillClimb<R> {
    type Item = OptimizationRecord;

    fn next(&mut self) -> Option<Self::Item> {
        match self.phase {
            Phase::Announce => {
                self.phase = Phase::Episode(1);
                Some(OptimizationRecord::message(format!(
                    "DETECTED PARAMETERS: [{}]",
                    self.schema.names().join(", ")
                )))
            }
            Phase::Episode(episode) => {
                self.phase = if episode >= self.settings.episodes {
                    Phase::Complete
                } else {
                    Phase::Episode(episode + 1)
                };
                Some(self.run_episode(episode))
            }
            Phase::Complete => {
                self.phase = Phase::Summary;
                tracing::info!(
                    source = %self.source,
                    best_reward = self.best_reward,
                    best_params = %format_params(&self.best_params),
                    "Optimization complete."
                );
                Some(OptimizationRecord::message("--- OPTIMIZATION COMPLETE ---"))
            }
            Phase::Summary => {
                self.phase = Phase::Done;
                Some(OptimizationRecord::Summary {
                    log: format!(
                        "BEST PARAMETERS: {} (Sharpe: {})",
                        format_params(&self.best_params),
                        self.best_reward
                    ),
                    best_params: self.best_params.clone(),
                    best_reward: self.best_reward,
                })
            }
            Phase::Done => None,
        }
    }
}

/// Renders a parameter set as `{name: value, ...}`.
pub fn format_params(params: &ParameterSet) -> String {
    let body = params
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_params() {
        let params = ParameterSet::from([("b".to_string(), 2), ("a".to_string(), 1)]);
        assert_eq!(format_params(&params), "{a: 1, b: 2}");
        assert_eq!(format_params(&ParameterSet::new()), "{}");
    }
}
