//! Device shadow documents — the JSON records exchanged with the cloud.
//!
//! A zone's shadow holds a single `state` property whose value is the
//! literal string `"ON"` or `"OFF"`. Any other value is treated as absent.
//!
//! ```text
//! delta:          {"state": {"state": "ON"}, ...}
//! get/accepted:   {"state": {"desired": {"state": "ON"}, "reported": {...}}, ...}
//! update:         {"state": {"reported": {"state": "ON"}}}
//! ```

use serde_json::{Value, json};

use crate::zone::ZoneState;

/// Shadow property carrying the on/off value.
const PROPERTY: &str = "state";

/// Parse a shadow property value.
#[must_use]
pub fn parse_value(value: &str) -> Option<ZoneState> {
    match value {
        "ON" => Some(ZoneState::On),
        "OFF" => Some(ZoneState::Off),
        _ => None,
    }
}

/// Encode a state as a shadow property value.
#[must_use]
pub fn encode_value(state: ZoneState) -> &'static str {
    match state {
        ZoneState::On => "ON",
        ZoneState::Off => "OFF",
    }
}

/// Extract the requested state from a delta document.
#[must_use]
pub fn delta_state(document: &Value) -> Option<ZoneState> {
    document
        .get("state")
        .and_then(|state| state.get(PROPERTY))
        .and_then(Value::as_str)
        .and_then(parse_value)
}

/// Extract the desired state from a full shadow document (`get/accepted`).
#[must_use]
pub fn desired_state(document: &Value) -> Option<ZoneState> {
    document
        .pointer("/state/desired")
        .and_then(|desired| desired.get(PROPERTY))
        .and_then(Value::as_str)
        .and_then(parse_value)
}

/// Build the update document that reports `state`.
#[must_use]
pub fn reported_document(state: ZoneState) -> Value {
    json!({ "state": { "reported": { "state": encode_value(state) } } })
}
