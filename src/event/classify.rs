//! Inbound event classification.
//!
//! # Design Decisions
//! - Edge events carry no version marker, so the record wrapper is checked first
//! - V1 is the fallback, but only for objects with neither discriminator
//! - Anything else is rejected rather than guessed at

use serde_json::Value;

use super::Protocol;
use crate::error::{AdapterError, AdapterResult};

/// Version marker carried by API Gateway payload format 2.0 events.
pub const V2_VERSION: &str = "2.0";

/// Determine which wire protocol produced `event`.
pub fn classify(event: &Value) -> AdapterResult<Protocol> {
    let object = event
        .as_object()
        .ok_or_else(|| AdapterError::UnsupportedEventKind("event is not a JSON object".into()))?;

    match object.get("Records") {
        Some(Value::Array(records)) if !records.is_empty() => return Ok(Protocol::EdgeFunction),
        Some(Value::Null) | None => {}
        Some(_) => {
            return Err(AdapterError::UnsupportedEventKind(
                "Records is present but holds no records".into(),
            ))
        }
    }

    match object.get("version") {
        Some(Value::String(version)) if version == V2_VERSION => Ok(Protocol::GatewayV2),
        Some(Value::Null) | None => Ok(Protocol::GatewayV1),
        Some(other) => Err(AdapterError::UnsupportedEventKind(format!(
            "unrecognized version marker {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edge_records_win() {
        // A version marker must not pull an edge event into the gateway paths.
        let event = json!({ "Records": [{ "cf": {} }], "version": "2.0" });
        assert_eq!(classify(&event).unwrap(), Protocol::EdgeFunction);
    }

    #[test]
    fn test_gateway_versions() {
        assert_eq!(classify(&json!({ "version": "2.0" })).unwrap(), Protocol::GatewayV2);
        assert_eq!(classify(&json!({ "httpMethod": "GET" })).unwrap(), Protocol::GatewayV1);
        assert_eq!(classify(&json!({ "version": null })).unwrap(), Protocol::GatewayV1);
    }

    #[test]
    fn test_unsupported_shapes() {
        for event in [
            json!({ "version": "3.0" }),
            json!({ "version": 2 }),
            json!({ "Records": [] }),
            json!("GET /"),
            json!([1, 2, 3]),
        ] {
            assert!(
                matches!(classify(&event), Err(AdapterError::UnsupportedEventKind(_))),
                "expected rejection for {event}"
            );
        }
    }
}
