use std::collections::HashMap;

use serde::Deserialize;

use crate::balancer::BalancerStrategy;
use crate::content::ContentEntity;
use crate::error::ValidationError;
use crate::flag::Flag;
use crate::session::SessionStrategyList;
use crate::strategy::RolloutStrategy;

/// Rollout targeting as submitted on the write path: a list of session IDs
/// or a percentage, never both.
#[derive(Debug, Default, Deserialize)]
pub struct StrategyDraft {
    #[serde(default)]
    pub session_ids: Vec<String>,
    #[serde(default)]
    pub percent: f64,
}

impl StrategyDraft {
    pub fn into_strategy(self) -> Result<RolloutStrategy, ValidationError> {
        if self.percent > 0.0 && !self.session_ids.is_empty() {
            return Err(ValidationError::ConflictingTargeting);
        }
        if !(0.0..=100.0).contains(&self.percent) {
            return Err(ValidationError::PercentOutOfRange(self.percent));
        }

        if self.percent > 0.0 || !self.session_ids.is_empty() {
            let session_overrides: HashMap<String, bool> = self
                .session_ids
                .into_iter()
                .map(|id| (id, true))
                .collect();

            return Ok(RolloutStrategy {
                enabled: true,
                session_overrides,
                percent: self.percent,
                call_count: 0,
            });
        }

        Ok(RolloutStrategy::default())
    }
}

/// A flag write request. Conversion to the domain record is where all flag
/// validation happens.
#[derive(Debug, Deserialize)]
pub struct FlagDraft {
    pub flag_name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub strategy: StrategyDraft,
}

impl FlagDraft {
    pub fn into_flag(self) -> Result<Flag, ValidationError> {
        if self.flag_name.trim().is_empty() {
            return Err(ValidationError::MissingFlagName);
        }

        Ok(Flag::new(
            self.flag_name,
            self.active,
            self.strategy.into_strategy()?,
        ))
    }
}

/// A content-hub write request.
#[derive(Debug, Deserialize)]
pub struct ContentDraft {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub session_strategy: SessionStrategyList,
    #[serde(default)]
    pub balancer_strategy: BalancerStrategy,
}

impl ContentDraft {
    pub fn into_entity(self) -> Result<ContentEntity, ValidationError> {
        if self.key.trim().is_empty() {
            return Err(ValidationError::MissingContentKey);
        }

        let entity = ContentEntity::new(
            self.key,
            self.value,
            self.description,
            self.active,
            self.session_strategy,
            self.balancer_strategy,
        );
        entity.validate()?;

        Ok(entity)
    }
}
