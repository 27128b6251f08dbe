//! Typed identifier newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a [`Zone`](crate::zone::Zone).
///
/// Doubles as the name of the zone's device shadow ("thing name").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Wrap a zone identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ZoneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A physical pin number on the output driver (BCM numbering on a Raspberry Pi).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(u8);

impl PinId {
    #[must_use]
    pub const fn new(pin: u8) -> Self {
        Self(pin)
    }

    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u8> for PinId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_zone_id_verbatim() {
        let id = ZoneId::new("garden-lights");
        assert_eq!(id.to_string(), "garden-lights");
        assert_eq!(id.as_str(), "garden-lights");
    }

    #[test]
    fn should_serialize_zone_id_as_plain_string() {
        let json = serde_json::to_string(&ZoneId::from("summerhouse-lights")).unwrap();
        assert_eq!(json, "\"summerhouse-lights\"");
    }

    #[test]
    fn should_deserialize_pin_from_number() {
        let pin: PinId = serde_json::from_str("17").unwrap();
        assert_eq!(pin, PinId::new(17));
        assert_eq!(pin.number(), 17);
    }
}
