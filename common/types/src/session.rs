use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::payload::Payload;

/// Sentinel session ID marking the fallback entry.
pub const DEFAULT_SESSION_ID: &str = "default";

/// A per-session response override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStrategyEntry {
    pub session_id: String,
    pub response: Payload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionStrategyList(pub Vec<SessionStrategyEntry>);

impl SessionStrategyList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Write-time check: exactly one `"default"` entry (resolution cannot
    /// fall back without one) and no duplicate session IDs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        let mut defaults = 0usize;

        for entry in &self.0 {
            if entry.session_id == DEFAULT_SESSION_ID {
                defaults += 1;
            } else if !seen.insert(entry.session_id.as_str()) {
                return Err(ValidationError::DuplicateSessionId(
                    entry.session_id.clone(),
                ));
            }
        }

        if defaults != 1 {
            return Err(ValidationError::DefaultEntryCount(defaults));
        }

        Ok(())
    }

    /// Single pass: an exact match wins immediately, otherwise the
    /// `"default"` entry's response, otherwise nothing.
    pub fn resolve(&self, session_id: &str) -> Option<&Payload> {
        let mut fallback = None;

        for entry in &self.0 {
            if entry.session_id == session_id {
                return Some(&entry.response);
            }
            if entry.session_id == DEFAULT_SESSION_ID {
                fallback = Some(&entry.response);
            }
        }

        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(session_id: &str, label: &str) -> SessionStrategyEntry {
        SessionStrategyEntry {
            session_id: session_id.to_string(),
            response: Payload::from(json!(label)),
        }
    }

    #[test]
    fn exact_match_wins() {
        let list = SessionStrategyList(vec![
            entry("default", "fallback"),
            entry("session-1", "special"),
        ]);

        assert_eq!(
            list.resolve("session-1"),
            Some(&Payload::from(json!("special")))
        );
    }

    #[test]
    fn unknown_session_gets_the_default_entry() {
        let list = SessionStrategyList(vec![
            entry("session-1", "special"),
            entry("default", "fallback"),
        ]);

        assert_eq!(
            list.resolve("stranger"),
            Some(&Payload::from(json!("fallback")))
        );
    }

    #[test]
    fn no_match_and_no_default_resolves_to_nothing() {
        let list = SessionStrategyList(vec![entry("session-1", "special")]);

        assert_eq!(list.resolve("stranger"), None);
    }

    #[test]
    fn validate_requires_exactly_one_default() {
        let none = SessionStrategyList(vec![entry("session-1", "a")]);
        assert_eq!(none.validate(), Err(ValidationError::DefaultEntryCount(0)));

        let one = SessionStrategyList(vec![entry("session-1", "a"), entry("default", "b")]);
        assert!(one.validate().is_ok());

        let two = SessionStrategyList(vec![
            entry("default", "a"),
            entry("default", "b"),
            entry("session-1", "c"),
        ]);
        assert_eq!(two.validate(), Err(ValidationError::DefaultEntryCount(2)));
    }

    #[test]
    fn validate_rejects_duplicate_session_ids() {
        let list = SessionStrategyList(vec![
            entry("default", "a"),
            entry("session-1", "b"),
            entry("session-1", "c"),
        ]);

        assert_eq!(
            list.validate(),
            Err(ValidationError::DuplicateSessionId("session-1".to_string()))
        );
    }
}
