use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::balancer::BalancerStrategy;
use crate::error::ValidationError;
use crate::session::SessionStrategyList;

/// A content-hub record: a keyed value with optional per-session overrides
/// and an optional weighted distribution across variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntity {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
}

impl ContentEntity {
    pub fn new(
        key: String,
        value: String,
        description: String,
        active: bool,
        session_strategy: SessionStrategyList,
        balancer_strategy: BalancerStrategy,
    ) -> ContentEntity {
        ContentEntity {
            id: Uuid::new_v4(),
            key,
            value,
            description,
            active,
            session_strategy,
            balancer_strategy,
            created_at: Utc::now(),
        }
    }

    /// Write-time validation of whichever strategies are configured.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.balancer_strategy.is_empty() {
            self.balancer_strategy.validate()?;
        }
        if !self.session_strategy.is_empty() {
            self.session_strategy.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancer::WeightedVariant;
    use crate::payload::Payload;
    use crate::session::SessionStrategyEntry;
    use serde_json::json;

    #[test]
    fn round_trips_through_json() {
        let entity = ContentEntity::new(
            "landing-banner".to_string(),
            "banner".to_string(),
            "hero banner experiment".to_string(),
            true,
            SessionStrategyList(vec![SessionStrategyEntry {
                session_id: "default".to_string(),
                response: Payload::from(json!({"variant": "control"})),
            }]),
            BalancerStrategy::default(),
        );

        let raw = serde_json::to_string(&entity).unwrap();
        let parsed: ContentEntity = serde_json::from_str(&raw).unwrap();

        assert_eq!(parsed, entity);
    }

    #[test]
    fn validate_skips_unconfigured_strategies() {
        let entity = ContentEntity::new(
            "plain".to_string(),
            "v".to_string(),
            String::new(),
            true,
            SessionStrategyList::default(),
            BalancerStrategy::default(),
        );

        assert!(entity.validate().is_ok());
    }

    #[test]
    fn validate_checks_configured_balancer() {
        let entity = ContentEntity::new(
            "split".to_string(),
            "v".to_string(),
            String::new(),
            true,
            SessionStrategyList::default(),
            BalancerStrategy(vec![WeightedVariant {
                weight: 80,
                response: Payload::from(json!("a")),
                call_count: 0,
            }]),
        );

        assert_eq!(
            entity.validate(),
            Err(ValidationError::InvalidWeightSum(80))
        );
    }
}
