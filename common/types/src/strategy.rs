use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Number of evaluations in one rollout cycle. A percentage target is
/// expected to hold exactly over this window.
pub const CYCLE_LEN: u32 = 10;

/// Rollout configuration for a flag: either explicit session membership or a
/// percentage of calls, advanced by a per-flag counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolloutStrategy {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub session_overrides: HashMap<String, bool>,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub call_count: u32,
}

impl RolloutStrategy {
    /// How many calls of the cycle stay inactive before the percentage
    /// threshold is crossed: percent 90 => 1, 50 => 5, 0 => 10, 100 => 0.
    pub fn threshold(&self) -> u32 {
        ((100.0 - self.percent) / CYCLE_LEN as f64).ceil() as u32
    }

    /// Decide activation for one call without touching the counter.
    ///
    /// When session overrides are configured and a session ID is supplied,
    /// the decision is the override value, and `false` for sessions not in
    /// the map. There is deliberately no fallback to percentage mode or to a
    /// default entry on this path.
    pub fn decide(&self, session_id: Option<&str>) -> bool {
        if let Some(id) = session_id {
            if !self.session_overrides.is_empty() {
                return self.session_overrides.get(id).copied().unwrap_or(false);
            }
        }

        self.threshold() <= self.call_count
    }

    /// Advance the rollout counter. The counter sits at `CYCLE_LEN` for one
    /// evaluation before wrapping back to 0, so the wrap happens on the next
    /// increment, not on read.
    pub fn advance(&mut self) {
        if self.call_count == CYCLE_LEN {
            self.call_count = 0;
        } else {
            self.call_count += 1;
        }
    }

    /// Structural comparison for reconciliation. The live counter is rollout
    /// progress, not configuration, and is excluded.
    pub fn config_eq(&self, other: &RolloutStrategy) -> bool {
        self.enabled == other.enabled
            && self.percent == other.percent
            && self.session_overrides == other.session_overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent_strategy(percent: f64) -> RolloutStrategy {
        RolloutStrategy {
            enabled: true,
            percent,
            ..Default::default()
        }
    }

    fn run_cycle(strategy: &mut RolloutStrategy, calls: usize) -> Vec<bool> {
        (0..calls)
            .map(|_| {
                let active = strategy.decide(None);
                strategy.advance();
                active
            })
            .collect()
    }

    #[test]
    fn thresholds_match_percentages() {
        assert_eq!(percent_strategy(90.0).threshold(), 1);
        assert_eq!(percent_strategy(50.0).threshold(), 5);
        assert_eq!(percent_strategy(0.0).threshold(), 10);
        assert_eq!(percent_strategy(100.0).threshold(), 0);
        // non-multiples of ten round up to the next inactive slot
        assert_eq!(percent_strategy(1.0).threshold(), 10);
        assert_eq!(percent_strategy(30.0).threshold(), 7);
    }

    #[test]
    fn ninety_percent_is_false_exactly_once() {
        let mut strategy = percent_strategy(90.0);

        assert_eq!(
            run_cycle(&mut strategy, 5),
            vec![false, true, true, true, true]
        );
    }

    #[test]
    fn ten_percent_is_nine_false_then_true() {
        let mut strategy = percent_strategy(10.0);

        let decisions = run_cycle(&mut strategy, 10);
        assert_eq!(decisions[..9], [false; 9]);
        assert!(decisions[9]);
    }

    #[test]
    fn hundred_percent_is_always_true() {
        let mut strategy = percent_strategy(100.0);

        assert!(run_cycle(&mut strategy, 11).into_iter().all(|d| d));
    }

    #[test]
    fn counter_wraps_and_pattern_repeats() {
        let mut strategy = percent_strategy(50.0);

        let first = run_cycle(&mut strategy, 11);
        assert_eq!(strategy.call_count, 0);
        let second = run_cycle(&mut strategy, 11);

        assert_eq!(first, second);
    }

    #[test]
    fn counter_transiently_holds_cycle_len() {
        let mut strategy = percent_strategy(50.0);

        for _ in 0..10 {
            strategy.advance();
        }
        assert_eq!(strategy.call_count, CYCLE_LEN);

        strategy.advance();
        assert_eq!(strategy.call_count, 0);
    }

    #[test]
    fn session_overrides_win_over_percentage() {
        let mut strategy = percent_strategy(100.0);
        strategy
            .session_overrides
            .insert("session-1".to_string(), true);
        strategy
            .session_overrides
            .insert("session-2".to_string(), false);

        assert!(strategy.decide(Some("session-1")));
        assert!(!strategy.decide(Some("session-2")));
        // unknown sessions are strictly inactive, no percentage fallback
        assert!(!strategy.decide(Some("stranger")));
    }

    #[test]
    fn empty_overrides_fall_through_to_percentage() {
        let strategy = RolloutStrategy {
            enabled: true,
            percent: 100.0,
            ..Default::default()
        };

        assert!(strategy.decide(Some("anyone")));
    }

    #[test]
    fn config_eq_ignores_counter() {
        let a = percent_strategy(50.0);
        let mut b = percent_strategy(50.0);
        b.call_count = 7;

        assert!(a.config_eq(&b));

        b.percent = 60.0;
        assert!(!a.config_eq(&b));
    }
}
