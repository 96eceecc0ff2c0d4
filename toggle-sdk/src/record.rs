use common_types::{ContentEntity, Flag};
use serde::de::DeserializeOwned;

/// A record the sync engine can cache and reconcile.
///
/// `config_changed` is the semantic diff used by the polling refresh; it
/// must ignore rollout counters, which are local progress rather than
/// server-owned configuration.
pub trait SyncRecord: Clone + DeserializeOwned + Send + Sync + 'static {
    /// Cache key, unique within the record's domain.
    fn key(&self) -> &str;

    /// Whether the server copy differs from the cached copy in any
    /// counter-irrelevant field.
    fn config_changed(&self, other: &Self) -> bool;

    /// Whether in-flight rollout counters survive replacement by `server`.
    fn counters_survive(&self, server: &Self) -> bool;

    /// Copy live counters onto this (server-sourced) record.
    fn adopt_counters(&mut self, live: &Self);
}

impl SyncRecord for Flag {
    fn key(&self) -> &str {
        &self.name
    }

    fn config_changed(&self, other: &Flag) -> bool {
        self.active != other.active || !self.strategy.config_eq(&other.strategy)
    }

    fn counters_survive(&self, server: &Flag) -> bool {
        self.strategy.enabled && server.strategy.enabled
    }

    fn adopt_counters(&mut self, live: &Flag) {
        self.strategy.call_count = live.strategy.call_count;
    }
}

impl SyncRecord for ContentEntity {
    fn key(&self) -> &str {
        &self.key
    }

    fn config_changed(&self, other: &ContentEntity) -> bool {
        self.active != other.active
            || self.value != other.value
            || self.description != other.description
            || self.session_strategy != other.session_strategy
            || !self.balancer_strategy.config_eq(&other.balancer_strategy)
    }

    fn counters_survive(&self, server: &ContentEntity) -> bool {
        self.active && server.active
    }

    fn adopt_counters(&mut self, live: &ContentEntity) {
        self.balancer_strategy
            .adopt_counters(&live.balancer_strategy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::RolloutStrategy;

    fn flag(percent: f64, call_count: u32) -> Flag {
        Flag::new(
            "flag".to_string(),
            true,
            RolloutStrategy {
                enabled: true,
                percent,
                call_count,
                ..Default::default()
            },
        )
    }

    #[test]
    fn counter_differences_alone_are_not_config_changes() {
        let cached = flag(50.0, 7);
        let server = flag(50.0, 0);

        assert!(!cached.config_changed(&server));
    }

    #[test]
    fn percent_change_is_a_config_change() {
        let cached = flag(50.0, 7);
        let server = flag(60.0, 0);

        assert!(cached.config_changed(&server));
        assert!(cached.counters_survive(&server));
    }

    #[test]
    fn disabling_the_strategy_drops_the_counter() {
        let cached = flag(50.0, 7);
        let mut server = flag(50.0, 0);
        server.strategy.enabled = false;

        assert!(cached.config_changed(&server));
        assert!(!cached.counters_survive(&server));
    }

    #[test]
    fn adopt_counters_carries_rollout_progress() {
        let cached = flag(50.0, 7);
        let mut server = flag(60.0, 0);

        server.adopt_counters(&cached);
        assert_eq!(server.strategy.call_count, 7);
    }
}
