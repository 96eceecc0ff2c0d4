use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::payload::Payload;

/// Total selections in one distribution cycle, summed across all variants.
pub const MAX_CALLS: u32 = 10;

/// One weighted response option. `call_count` tracks how many of the current
/// cycle's selections this variant has received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedVariant {
    pub weight: u32,
    pub response: Payload,
    #[serde(default)]
    pub call_count: u32,
}

/// Ordered set of weighted variants. Declaration order is a correctness
/// input: ties from integer rounding resolve in favor of earlier variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalancerStrategy(pub Vec<WeightedVariant>);

impl BalancerStrategy {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Write-time check, never invoked by `distribute`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let total: u32 = self.0.iter().map(|v| v.weight).sum();
        if total != 100 {
            return Err(ValidationError::InvalidWeightSum(total));
        }

        Ok(())
    }

    /// Pick one response, converging on the configured split over every
    /// `MAX_CALLS` selections.
    ///
    /// Returns `None` for an empty list or an all-zero weight total. Once
    /// the combined counters reach `MAX_CALLS` every counter resets and the
    /// cycle restarts.
    pub fn distribute(&mut self) -> Option<Payload> {
        if self.0.is_empty() {
            return None;
        }

        let total_weight: u32 = self.0.iter().map(|v| v.weight).sum();
        if total_weight == 0 {
            return None;
        }

        let total_calls: u32 = self.0.iter().map(|v| v.call_count).sum();
        if total_calls >= MAX_CALLS {
            for variant in self.0.iter_mut() {
                variant.call_count = 0;
            }
        }

        for variant in self.0.iter_mut() {
            let expected =
                (variant.weight as f64 / total_weight as f64 * MAX_CALLS as f64) as u32;
            if variant.call_count < expected {
                variant.call_count += 1;
                return Some(variant.response.clone());
            }
        }

        // Integer rounding can leave every variant at its expected share
        // before the cycle completes; hand the remainder out in declared
        // order.
        for variant in self.0.iter_mut() {
            if variant.call_count < MAX_CALLS {
                variant.call_count += 1;
                return Some(variant.response.clone());
            }
        }

        self.0.first().map(|v| v.response.clone())
    }

    /// Structural comparison for reconciliation; per-variant counters are
    /// rollout progress, not configuration.
    pub fn config_eq(&self, other: &BalancerStrategy) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|(a, b)| a.weight == b.weight && a.response == b.response)
    }

    /// Carry a live record's cycle progress onto this (server-sourced) copy.
    /// Counters only transfer when the variant configuration is unchanged;
    /// a reshaped balancer starts a fresh cycle.
    pub fn adopt_counters(&mut self, live: &BalancerStrategy) {
        if !self.config_eq(live) {
            return;
        }

        for (variant, live_variant) in self.0.iter_mut().zip(&live.0) {
            variant.call_count = live_variant.call_count;
        }
    }
}
