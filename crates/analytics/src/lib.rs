//! # Analytics Engine
//!
//! This crate turns a sequence of per-bar strategy returns into performance
//! metrics. It acts as the "unbiased judge" of the system.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No knowledge of strategies or data sources. It depends
//!   only on `core-types` and `configuration`.
//! - **Stateless Calculation:** The `AnalyticsEngine` takes returns as input and
//!   produces a `PerformanceReport`. Identical input gives bit-identical output.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The calculator (equity curve, Sharpe, total return, drawdown).
//! - `returns`: Helpers to derive market returns, shifted positions and strategy returns.
//! - `PerformanceReport`: The output of a calculation.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod returns;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, round_dp};
pub use error::AnalyticsError;
pub use report::PerformanceReport;
