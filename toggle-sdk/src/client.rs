use common_types::{ContentEntity, Flag, Payload};

use crate::error::FlagsError;
use crate::sync::SharedCache;

/// Evaluates boolean toggles against the synced cache.
///
/// Evaluation is a read-modify-write: deciding against the pre-increment
/// counter, then advancing it, both under the cache lock so concurrent
/// reconciliation never observes a half-evaluated record.
#[derive(Clone)]
pub struct FlagsClient {
    cache: SharedCache<Flag>,
}

impl FlagsClient {
    pub fn new(cache: SharedCache<Flag>) -> FlagsClient {
        FlagsClient { cache }
    }

    pub async fn is_enabled(
        &self,
        key: &str,
        session_id: Option<&str>,
    ) -> Result<bool, FlagsError> {
        let mut cache = self.cache.write().await;
        let flag = cache
            .get_mut(key)
            .ok_or_else(|| FlagsError::NotFound(key.to_string()))?;

        if !flag.uses_strategy() {
            return Ok(flag.active);
        }

        let active = flag.strategy.decide(session_id);
        flag.strategy.advance();

        Ok(active)
    }

    /// Evaluation with a caller-supplied default for unknown keys.
    pub async fn is_enabled_or(&self, key: &str, session_id: Option<&str>, default: bool) -> bool {
        self.is_enabled(key, session_id).await.unwrap_or(default)
    }
}

/// Resolves content-hub responses against the synced cache.
#[derive(Clone)]
pub struct ContentClient {
    cache: SharedCache<ContentEntity>,
}

impl ContentClient {
    pub fn new(cache: SharedCache<ContentEntity>) -> ContentClient {
        ContentClient { cache }
    }

    /// With a session ID the per-session overrides decide; without one the
    /// weighted balancer does. An unresolvable request yields a JSON-null
    /// payload; only an unknown key is an error.
    pub async fn content(
        &self,
        key: &str,
        session_id: Option<&str>,
    ) -> Result<Payload, FlagsError> {
        let mut cache = self.cache.write().await;
        let entity = cache
            .get_mut(key)
            .ok_or_else(|| FlagsError::NotFound(key.to_string()))?;

        let payload = match session_id {
            Some(id) => entity
                .session_strategy
                .resolve(id)
                .cloned()
                .unwrap_or_default(),
            None => entity.balancer_strategy.distribute().unwrap_or_default(),
        };

        Ok(payload)
    }
}
