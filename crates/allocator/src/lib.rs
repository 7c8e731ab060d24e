//! # Allocator
//!
//! Splits capital across strategy arms by blending a Thompson-sampling draw
//! with a uniform split. A single fairness slider picks the mix: 0 chases
//! performance, 100 ignores it.
//!
//! The allocator is a plain owned value. Callers that share one across tasks
//! must serialize access themselves.

pub mod error;

pub use error::AllocatorError;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};

/// Upper bound of the fairness slider.
pub const MAX_FAIRNESS: u8 = 100;

/// Win/loss counts of one arm, Laplace-smoothed from a Beta(1, 1) prior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BanditArm {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for BanditArm {
    fn default() -> Self {
        Self { alpha: 1.0, beta: 1.0 }
    }
}

impl BanditArm {
    /// Expected win rate under the current posterior.
    pub fn posterior_mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    fn record(&mut self, won: bool) {
        if won {
            self.alpha += 1.0;
        } else {
            self.beta += 1.0;
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> Result<f64, AllocatorError> {
        let dist = Beta::new(self.alpha, self.beta)
            .map_err(|e| AllocatorError::InvalidArm(e.to_string()))?;
        Ok(dist.sample(rng))
    }
}

/// A fairness-blended Thompson-sampling allocator over a fixed set of arms.
#[derive(Debug, Clone)]
pub struct FairBandit<R = StdRng> {
    arms: Vec<BanditArm>,
    rng: R,
}

impl FairBandit<StdRng> {
    /// `n` fresh arms, sampling from OS entropy.
    pub fn new(n: usize) -> Result<Self, AllocatorError> {
        Self::with_rng(n, StdRng::from_os_rng())
    }

    /// `n` fresh arms with a reproducible sampling sequence.
    pub fn seeded(n: usize, seed: u64) -> Result<Self, AllocatorError> {
        Self::with_rng(n, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> FairBandit<R> {
    pub fn with_rng(n: usize, rng: R) -> Result<Self, AllocatorError> {
        Self::from_arms(vec![BanditArm::default(); n], rng)
    }

    /// Restores an allocator from previously reported arm state.
    pub fn from_arms(arms: Vec<BanditArm>, rng: R) -> Result<Self, AllocatorError> {
        if arms.is_empty() {
            return Err(AllocatorError::NoArms);
        }
        if let Some(arm) = arms.iter().find(|a| !(a.alpha >= 1.0 && a.beta >= 1.0)) {
            return Err(AllocatorError::InvalidArm(format!(
                "alpha and beta must be at least 1, got ({}, {})",
                arm.alpha, arm.beta
            )));
        }
        Ok(Self { arms, rng })
    }

    pub fn arms(&self) -> &[BanditArm] {
        &self.arms
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Records a binary outcome for one arm.
    pub fn update(&mut self, arm: usize, won: bool) -> Result<(), AllocatorError> {
        let arms = self.arms.len();
        let slot = self
            .arms
            .get_mut(arm)
            .ok_or(AllocatorError::ArmOutOfRange { index: arm, arms })?;
        slot.record(won);
        tracing::debug!(arm, won, alpha = slot.alpha, beta = slot.beta, "Arm updated.");
        Ok(())
    }

    pub fn posterior_mean(&self, arm: usize) -> Result<f64, AllocatorError> {
        self.arms
            .get(arm)
            .map(BanditArm::posterior_mean)
            .ok_or(AllocatorError::ArmOutOfRange { index: arm, arms: self.arms.len() })
    }

    /// Draws one allocation. The weights are ordered by arm and sum to 1.
    ///
    /// Each arm's Beta posterior is sampled once and the draws are normalized
    /// into greedy weights, then blended linearly with the uniform split by
    /// `fairness / 100`. If every draw is exactly zero the greedy half falls
    /// back to uniform.
    pub fn calculate_allocation(&mut self, fairness: u8) -> Result<Vec<f64>, AllocatorError> {
        if fairness > MAX_FAIRNESS {
            return Err(AllocatorError::InvalidFairness(fairness));
        }

        let samples = self
            .arms
            .iter()
            .map(|arm| arm.sample(&mut self.rng))
            .collect::<Result<Vec<_>, _>>()?;

        let n = self.arms.len() as f64;
        let fair = 1.0 / n;
        let total: f64 = samples.iter().sum();
        let greedy: Vec<f64> = if total == 0.0 {
            tracing::debug!("All Beta samples were zero; using uniform greedy weights.");
            vec![fair; samples.len()]
        } else {
            samples.iter().map(|s| s / total).collect()
        };

        let lambda = f64::from(fairness) / f64::from(MAX_FAIRNESS);
        Ok(greedy
            .into_iter()
            .map(|g| (1.0 - lambda) * g + lambda * fair)
            .collect())
    }
}
