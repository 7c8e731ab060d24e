use crate::error::ConfigError;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backtest: BacktestSettings,
    pub optimizer: OptimizerSettings,
    pub allocator: AllocatorSettings,
    pub logging: LoggingSettings,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.backtest.annualization_factor > 0.0) {
            return Err(ConfigError::ValidationError(
                "backtest.annualization_factor must be positive".to_string(),
            ));
        }
        self.optimizer.validate()?;
        if self.allocator.fairness > 100 {
            return Err(ConfigError::ValidationError(format!(
                "allocator.fairness must be within 0..=100, got {}",
                self.allocator.fairness
            )));
        }
        Ok(())
    }
}

/// What the Sharpe calculation reports when strategy returns have no variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ZeroVariancePolicy {
    /// Report a Sharpe ratio of exactly 0.0.
    #[default]
    Zero,
    /// Report no Sharpe ratio at all (`None`).
    Undefined,
    /// Fail the run with a degenerate-series error.
    Error,
}

/// Contains parameters for the backtesting engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// Periods per year used to annualize the Sharpe ratio (252 trading days).
    pub annualization_factor: f64,
    pub zero_variance: ZeroVariancePolicy,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            annualization_factor: 252.0,
            zero_variance: ZeroVariancePolicy::default(),
        }
    }
}

/// Contains parameters for the hill-climbing optimizer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Number of mutate-and-evaluate episodes per run.
    pub episodes: u32,
    /// Maximum absolute integer perturbation applied to each parameter.
    pub mutation_step: i64,
    /// Starting "best" reward; must be below any achievable Sharpe ratio.
    pub initial_best_reward: f64,
    /// Pause before each episode so consumers can drain earlier records.
    pub episode_pause_ms: u64,
    /// Fixed seed for reproducible searches. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl OptimizerSettings {
    /// Checked by [`Config::validate`] and again by every optimizer, since the
    /// fields are public and settings can be built without loading a file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.episodes == 0 {
            return Err(ConfigError::ValidationError(
                "optimizer.episodes must be at least 1".to_string(),
            ));
        }
        if self.mutation_step < 0 {
            return Err(ConfigError::ValidationError(
                "optimizer.mutation_step must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            episodes: 20,
            mutation_step: 5,
            initial_best_reward: -999.0,
            episode_pause_ms: 100,
            seed: None,
        }
    }
}

/// Contains parameters for the fairness-blended capital allocator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AllocatorSettings {
    /// Default fairness slider (0 = pure Thompson sampling, 100 = uniform).
    pub fairness: u8,
    pub seed: Option<u64>,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self { fairness: 50, seed: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), directory: None }
    }
}
