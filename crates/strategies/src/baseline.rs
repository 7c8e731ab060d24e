//! Parameterless reference strategies.

use crate::Strategy;
use crate::error::StrategyError;
use crate::schema::{ParameterDecl, resolve_parameters};
use core_types::{ParameterSet, PriceBar, Signal};

/// Always long. Its equity curve is the buy-and-hold benchmark.
#[derive(Debug, Default)]
pub struct BuyAndHold;

impl BuyAndHold {
    pub fn new(params: Option<&ParameterSet>) -> Result<Self, StrategyError> {
        resolve_parameters(&[], params)?;
        Ok(Self)
    }
}

impl Strategy for BuyAndHold {
    fn declared_parameters(&self) -> Vec<ParameterDecl> {
        Vec::new()
    }

    fn generate_signal(&mut self, _history: &[PriceBar]) -> Result<Signal, StrategyError> {
        Ok(Signal::Buy)
    }
}

/// Never in the market.
#[derive(Debug, Default)]
pub struct Flat;

impl Flat {
    pub fn new(params: Option<&ParameterSet>) -> Result<Self, StrategyError> {
        resolve_parameters(&[], params)?;
        Ok(Self)
    }
}

impl Strategy for Flat {
    fn declared_parameters(&self) -> Vec<ParameterDecl> {
        Vec::new()
    }

    fn generate_signal(&mut self, _history: &[PriceBar]) -> Result<Signal, StrategyError> {
        Ok(Signal::Hold)
    }
}
