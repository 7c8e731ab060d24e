use crate::Strategy;
use crate::baseline::{BuyAndHold, Flat};
use crate::error::StrategyError;
use crate::golden_cross::GoldenCross;
use crate::momentum::TimeSeriesMomentum;
use crate::rsi_reversion::RsiReversion;
use core_types::ParameterSet;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Identifies one of the compiled-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    GoldenCross,
    RsiReversion,
    Momentum,
    BuyAndHold,
    Flat,
}

impl StrategyId {
    pub const ALL: [StrategyId; 5] = [
        StrategyId::GoldenCross,
        StrategyId::RsiReversion,
        StrategyId::Momentum,
        StrategyId::BuyAndHold,
        StrategyId::Flat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::GoldenCross => "golden_cross",
            StrategyId::RsiReversion => "rsi_reversion",
            StrategyId::Momentum => "momentum",
            StrategyId::BuyAndHold => "buy_and_hold",
            StrategyId::Flat => "flat",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = StrategyError;

    /// Accepts the snake_case name, case-insensitively, with `-` or `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        StrategyId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| StrategyError::UnknownStrategy(s.to_string()))
    }
}

/// Creates a new strategy instance based on the provided ID and parameters.
///
/// `None` builds the strategy with all of its declared defaults.
pub fn create_strategy(
    id: StrategyId,
    params: Option<&ParameterSet>,
) -> Result<Box<dyn Strategy>, StrategyError> {
    // The compiler will error if a new StrategyId is added but not handled here.
    match id {
        StrategyId::GoldenCross => Ok(Box::new(GoldenCross::new(params)?)),
        StrategyId::RsiReversion => Ok(Box::new(RsiReversion::new(params)?)),
        StrategyId::Momentum => Ok(Box::new(TimeSeriesMomentum::new(params)?)),
        StrategyId::BuyAndHold => Ok(Box::new(BuyAndHold::new(params)?)),
        StrategyId::Flat => Ok(Box::new(Flat::new(params)?)),
    }
}

/// Turns a strategy *source* into a runnable instance.
///
/// This is the only way the backtester and optimizer obtain strategies, which
/// makes it the place to put an isolation boundary: an implementation may
/// compile a declarative definition, or proxy to a separate process, as long as
/// it hands back something that honours the [`Strategy`] contract.
pub trait StrategyLoader: Send + Sync {
    /// Builds an instance from `source`. `params == None` means all defaults.
    ///
    /// Any error returned here is a load failure and is fatal for the request.
    fn load(
        &self,
        source: &str,
        params: Option<&ParameterSet>,
    ) -> Result<Box<dyn Strategy>, StrategyError>;
}

/// Loads the strategies compiled into this crate by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLoader;

impl StrategyLoader for BuiltinLoader {
    fn load(
        &self,
        source: &str,
        params: Option<&ParameterSet>,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        let id: StrategyId = source.parse()?;
        tracing::debug!(strategy = %id, ?params, "Loading built-in strategy.");
        create_strategy(id, params)
    }
}
