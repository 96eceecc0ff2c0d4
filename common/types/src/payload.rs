use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Opaque response payload carried by content variants and session overrides.
///
/// The server never looks inside these values; clients decode them on demand
/// into whatever shape they expect. Equality is semantic (JSON value
/// equality), so reconciliation diffs are insensitive to key order and
/// whitespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(serde_json::Value);

impl Payload {
    pub fn null() -> Payload {
        Payload(serde_json::Value::Null)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Decode into a caller-supplied shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.0.clone())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Payload {
        Payload(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Banner {
        title: String,
        enabled: bool,
    }

    #[test]
    fn decodes_into_caller_shape() {
        let payload = Payload::from(json!({"title": "hello", "enabled": true}));

        let banner: Banner = payload.decode().unwrap();
        assert_eq!(
            banner,
            Banner {
                title: "hello".to_string(),
                enabled: true
            }
        );
    }

    #[test]
    fn decode_error_surfaces_on_shape_mismatch() {
        let payload = Payload::from(json!(["not", "a", "banner"]));

        assert!(payload.decode::<Banner>().is_err());
    }

    #[test]
    fn default_is_null() {
        assert!(Payload::default().is_null());
        assert_eq!(Payload::default(), Payload::null());
    }

    #[test]
    fn equality_ignores_key_order() {
        let a: Payload = serde_json::from_str(r#"{"x": 1, "y": 2}"#).unwrap();
        let b: Payload = serde_json::from_str(r#"{"y": 2, "x": 1}"#).unwrap();

        assert_eq!(a, b);
    }
}
