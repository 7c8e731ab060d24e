//! # Strategy Library
//!
//! This crate defines the contract every trading strategy implements and ships
//! the compiled-in strategies the rest of the workspace can load by name.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No knowledge of data providers, persistence or execution.
//!   It depends only on `core-types`.
//! - **Explicit Schemas:** Strategies declare their tunable parameters through
//!   [`Strategy::declared_parameters`]. The optimizer derives search ranges from
//!   those declarations instead of inspecting constructors at runtime.
//! - **Loading Boundary:** Turning a strategy *source* into a live instance goes
//!   through the [`StrategyLoader`] trait. [`BuiltinLoader`] resolves names
//!   against the registry in [`factory`]; other loaders (e.g. an out-of-process
//!   sandbox) can be slotted in without touching the engine or optimizer.
//!
//! ## Public API
//!
//! - `Strategy`: The core trait all strategies implement.
//! - `StrategyId`: Identifies a built-in strategy.
//! - `StrategyLoader` / `BuiltinLoader`: Source-to-instance resolution.
//! - `ParameterDecl` / `ParameterSchema`: Declared tunables and their search ranges.

// Declare all the modules that constitute this crate.
pub mod baseline;
pub mod error;
pub mod factory;
pub mod golden_cross;
pub mod momentum;
pub mod rsi_reversion;
pub mod schema;

// Re-export the key components to create a clean, public-facing API.
pub use baseline::{BuyAndHold, Flat};
pub use error::StrategyError;
pub use factory::{BuiltinLoader, StrategyId, StrategyLoader, create_strategy};
pub use golden_cross::GoldenCross;
pub use momentum::TimeSeriesMomentum;
pub use rsi_reversion::RsiReversion;
pub use schema::{ParameterDecl, ParameterSchema, ParameterSpec, heuristic_range};

use core_types::{PriceBar, Signal};

/// The core trait that all trading strategies must implement.
///
/// The backtester calls [`generate_signal`](Strategy::generate_signal) once per
/// bar with the history *up to and including* that bar, so a strategy can never
/// see the future. Returning an error for a bar is not fatal: the engine treats
/// that bar as [`Signal::Hold`] and carries on.
///
/// The `Send + Sync` bounds are required to allow strategies to be evaluated
/// across multiple threads when several of them are compared at once.
pub trait Strategy: Send + Sync {
    /// The tunable parameters of this instance, with their current values as
    /// the `default` of each declaration.
    fn declared_parameters(&self) -> Vec<ParameterDecl>;

    /// Evaluates the strategy for the last bar of `history`.
    fn generate_signal(&mut self, history: &[PriceBar]) -> Result<Signal, StrategyError>;
}
