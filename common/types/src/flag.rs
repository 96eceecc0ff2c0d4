use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::strategy::RolloutStrategy;

/// A boolean feature toggle. Written as a whole record; evaluation never
/// observes a partially updated flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub strategy: RolloutStrategy,
    pub created_at: DateTime<Utc>,
}

impl Flag {
    pub fn new(name: String, active: bool, strategy: RolloutStrategy) -> Flag {
        Flag {
            name,
            active,
            strategy,
            created_at: Utc::now(),
        }
    }

    /// Whether evaluation should consult the rollout strategy instead of the
    /// plain `active` bit.
    pub fn uses_strategy(&self) -> bool {
        self.strategy.enabled
    }
}
