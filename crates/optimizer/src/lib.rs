//! # Optimizer
//!
//! Streaming hill-climbing search over a strategy's integer parameters, using
//! the backtester's Sharpe ratio as the fitness function.
//!
//! A search is one sequential task: episode `i` mutates the best set found by
//! episodes `1..i`, so episodes are never run in parallel. Independent searches
//! share nothing and may run concurrently.

use backtester::BacktestEngine;
use configuration::OptimizerSettings;
use core_types::PriceSeries;
use futures::StreamExt;
use futures::stream::BoxStream;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use strategies::{ParameterSchema, StrategyLoader};

pub mod error;
pub mod mutation;
pub mod record;
pub mod search;

pub use error::OptimizerError;
pub use record::OptimizationRecord;
pub use search::{HillClimb, MISSING_SHARPE_REWARD, format_params};

pub struct Optimizer {
    engine: BacktestEngine,
    loader: Arc<dyn StrategyLoader>,
    settings: OptimizerSettings,
}

impl Optimizer {
    /// Fails when `settings` would not describe a finite, well-formed search.
    pub fn new(
        engine: BacktestEngine,
        loader: Arc<dyn StrategyLoader>,
        settings: OptimizerSettings,
    ) -> Result<Self, OptimizerError> {
        settings.validate()?;
        Ok(Self { engine, loader, settings })
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Loads the strategy once with defaults and derives its search schema.
    pub fn discover(&self, source: &str) -> Result<ParameterSchema, OptimizerError> {
        let strategy = self.loader.load(source, None)?;
        Ok(ParameterSchema::discover(strategy.as_ref()))
    }

    /// Starts a fresh search with the configured seed (or OS entropy).
    pub fn search(
        &self,
        source: &str,
        series: PriceSeries,
    ) -> Result<HillClimb<StdRng>, OptimizerError> {
        let rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.search_with_rng(source, series, rng)
    }

    /// Starts a fresh search drawing mutations from `rng`.
    ///
    /// Parameter discovery happens here, so a strategy that cannot be loaded
    /// fails the whole request before any record is produced.
    pub fn search_with_rng<R: Rng>(
        &self,
        source: &str,
        series: PriceSeries,
        rng: R,
    ) -> Result<HillClimb<R>, OptimizerError> {
        let schema = self.discover(source)?;
        tracing::info!(
            source,
            parameters = ?schema.names(),
            episodes = self.settings.episodes,
            bars = series.len(),
            "Starting optimization."
        );
        Ok(HillClimb::new(
            self.engine.clone(),
            Arc::clone(&self.loader),
            source,
            series,
            schema,
            self.settings.clone(),
            rng,
        ))
    }

    /// The search as an async stream of records.
    pub fn stream(
        &self,
        source: &str,
        series: PriceSeries,
    ) -> Result<BoxStream<'static, OptimizationRecord>, OptimizerError> {
        let search = self.search(source, series)?;
        Ok(into_stream(search, self.pause()))
    }

    pub fn stream_with_rng<R: Rng + Send + 'static>(
        &self,
        source: &str,
        series: PriceSeries,
        rng: R,
    ) -> Result<BoxStream<'static, OptimizationRecord>, OptimizerError> {
        let search = self.search_with_rng(source, series, rng)?;
        Ok(into_stream(search, self.pause()))
    }

    fn pause(&self) -> Duration {
        Duration::from_millis(self.settings.episode_pause_ms)
    }
}

/// Drives a search lazily, suspending before every episode.
///
/// The pause is the stream's only suspension point; it lets a consumer flush
/// earlier records before the next backtest runs. Dropping the stream cancels
/// the search, as there is nothing to clean up.
fn into_stream<R: Rng + Send + 'static>(
    search: HillClimb<R>,
    pause: Duration,
) -> BoxStream<'static, OptimizationRecord> {
    futures::stream::unfold(search, move |mut search| async move {
        if search.next_is_episode() {
            if pause.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(pause).await;
            }
        }
        search.next().map(|record| (record, search))
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use core_types::{ParameterSet, PriceBar};
    use strategies::{BuiltinLoader, Strategy, StrategyError};

    fn prices() -> PriceSeries {
        let closes = (0..120).map(|i| {
            let t = i as f64;
            100.0 + 10.0 * (t / 7.0).sin() + 0.15 * t
        });
        let bars = closes
            .enumerate()
            .map(|(i, close)| PriceBar {
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

    fn optimizer(seed: u64) -> Optimizer {
        Optimizer::new(
            BacktestEngine::default(),
            Arc::new(BuiltinLoader),
            OptimizerSettings { seed: Some(seed), episode_pause_ms: 0, ..Default::default() },
        )
        .unwrap()
    }

    /// Loads fine with defaults but rejects every explicit parameter set.
    struct RejectsMutations;

    impl StrategyLoader for RejectsMutations {
        fn load(
            &self,
            source: &str,
            params: Option<&ParameterSet>,
        ) -> Result<Box<dyn Strategy>, StrategyError> {
            match params {
                None => BuiltinLoader.load(source, None),
                Some(_) => Err(StrategyError::InvalidParameters("rejected".to_string())),
            }
        }
    }

    #[test]
    fn test_record_sequence_shape() {
        let records: Vec<_> = optimizer(11).search("golden_cross", prices()).unwrap().collect();

        assert_eq!(records.len(), 1 + 20 + 2);
        assert_eq!(records[0].log(), "DETECTED PARAMETERS: [short_window, long_window]");
        let episodes: Vec<u32> = records.iter().filter_map(|r| r.episode()).collect();
        assert_eq!(episodes, (1..=20).collect::<Vec<_>>());
        assert_eq!(records[21].log(), "--- OPTIMIZATION COMPLETE ---");
        assert!(matches!(records[22], OptimizationRecord::Summary { .. }));
    }

    #[test]
    fn test_tested_parameters_respect_schema() {
        let optimizer = optimizer(5);
        let schema = optimizer.discover("rsi_reversion").unwrap();
        for record in optimizer.search("rsi_reversion", prices()).unwrap() {
            if let OptimizationRecord::Episode { params, .. } = record {
                assert!(schema.contains(&params), "{:?} out of range", params);
                assert_eq!(params.len(), schema.len());
            }
        }
    }

    #[test]
    fn test_best_reward_never_decreases() {
        let records: Vec<_> = optimizer(99).search("golden_cross", prices()).unwrap().collect();

        let mut best = OptimizerSettings::default().initial_best_reward;
        let mut history = Vec::new();
        for record in &records {
            if let OptimizationRecord::Episode { reward, log, .. } = record {
                let improved = *reward > best;
                assert_eq!(log.ends_with("(NEW RECORD!)"), improved);
                if improved {
                    best = *reward;
                }
                history.push(best);
            }
        }
        assert!(history.windows(2).all(|w| w[0] <= w[1]));

        match records.last() {
            Some(OptimizationRecord::Summary { best_reward, .. }) => assert_eq!(*best_reward, best),
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn test_same_seed_same_search() {
        let first: Vec<_> = optimizer(42).search("momentum", prices()).unwrap().collect();
        let second: Vec<_> = optimizer(42).search("momentum", prices()).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_step_errors_do_not_abort_the_search() {
        let optimizer = Optimizer::new(
            BacktestEngine::default(),
            Arc::new(RejectsMutations),
            OptimizerSettings { seed: Some(1), episode_pause_ms: 0, ..Default::default() },
        )
        .unwrap();
        let records: Vec<_> = optimizer.search("golden_cross", prices()).unwrap().collect();

        assert_eq!(records.len(), 23);
        assert!(records[1..21].iter().all(|r| r.log().contains("Error")));
        assert!(records.iter().all(|r| r.episode().is_none()));
        match records.last() {
            Some(OptimizationRecord::Summary { best_params, best_reward, .. }) => {
                assert_eq!(*best_reward, -999.0);
                assert_eq!(best_params, &optimizer.discover("golden_cross").unwrap().defaults());
            }
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_negative_mutation_step() {
        let result = Optimizer::new(
            BacktestEngine::default(),
            Arc::new(BuiltinLoader),
            OptimizerSettings { mutation_step: -1, ..Default::default() },
        );
        assert!(matches!(result, Err(OptimizerError::Settings(_))));
    }

    #[test]
    fn test_rejects_zero_episodes() {
        let result = Optimizer::new(
            BacktestEngine::default(),
            Arc::new(BuiltinLoader),
            OptimizerSettings { episodes: 0, ..Default::default() },
        );
        assert!(matches!(result, Err(OptimizerError::Settings(_))));
    }

    #[test]
    fn test_zero_step_retests_the_defaults() {
        let optimizer = Optimizer::new(
            BacktestEngine::default(),
            Arc::new(BuiltinLoader),
            OptimizerSettings {
                mutation_step: 0,
                episodes: 3,
                episode_pause_ms: 0,
                seed: Some(8),
                ..Default::default()
            },
        )
        .unwrap();
        let defaults = optimizer.discover("golden_cross").unwrap().defaults();
        for record in optimizer.search("golden_cross", prices()).unwrap() {
            if let OptimizationRecord::Episode { params, .. } = record {
                assert_eq!(params, defaults);
            }
        }
    }

    #[test]
    fn test_unknown_strategy_fails_up_front() {
        let err = optimizer(1).search("nope", prices()).err().unwrap();
        assert!(matches!(err, OptimizerError::Load(_)));
    }
}
