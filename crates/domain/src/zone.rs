//! Zone — a named group of relay outputs that are switched together.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LightshowError, ValidationError};
use crate::id::{PinId, ZoneId};

/// On/off state of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneState {
    On,
    #[default]
    Off,
}

impl ZoneState {
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// The opposite state.
    #[must_use]
    pub fn inverted(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

impl From<bool> for ZoneState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl fmt::Display for ZoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// Characters with a meaning in MQTT topic names.
const TOPIC_RESERVED: [char; 3] = ['/', '+', '#'];

/// Static description of a lighting zone.
///
/// The pin order is significant: pins are energised one after the other in
/// this order to spread the inrush current of the light transformers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub friendly_name: String,
    pub description: Option<String>,
    pub pins: Vec<PinId>,
}

impl Zone {
    /// Create a builder for constructing a [`Zone`].
    #[must_use]
    pub fn builder() -> ZoneBuilder {
        ZoneBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Validation`] when the id or friendly name is
    /// empty, when the id contains `/`, `+` or `#` (it names the zone's shadow
    /// topics), when there are no pins, or when a pin is listed twice.
    pub fn validate(&self) -> Result<(), LightshowError> {
        if self.id.as_str().is_empty() {
            return Err(ValidationError::Empty("zone id").into());
        }
        if let Some(character) = self.id.as_str().chars().find(|c| TOPIC_RESERVED.contains(c)) {
            return Err(ValidationError::InvalidZoneId {
                zone: self.id.to_string(),
                character,
            }
            .into());
        }
        if self.friendly_name.is_empty() {
            return Err(ValidationError::Empty("friendly name").into());
        }
        if self.pins.is_empty() {
            return Err(ValidationError::NoPins {
                zone: self.id.to_string(),
            }
            .into());
        }
        for (idx, pin) in self.pins.iter().enumerate() {
            if self.pins[..idx].contains(pin) {
                return Err(ValidationError::DuplicatePin {
                    zone: self.id.to_string(),
                    pin: pin.number(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Zone`].
#[derive(Debug, Default)]
pub struct ZoneBuilder {
    id: Option<ZoneId>,
    friendly_name: Option<String>,
    description: Option<String>,
    pins: Vec<PinId>,
}

impl ZoneBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<ZoneId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn pin(mut self, pin: impl Into<PinId>) -> Self {
        self.pins.push(pin.into());
        self
    }

    #[must_use]
    pub fn pins<I, P>(mut self, pins: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PinId>,
    {
        self.pins.extend(pins.into_iter().map(Into::into));
        self
    }

    /// Consume the builder, validate, and return a [`Zone`].
    ///
    /// A missing friendly name falls back to the zone id.
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Validation`] if the id is missing or the
    /// pin list is invalid.
    pub fn build(self) -> Result<Zone, LightshowError> {
        let id = self.id.unwrap_or_else(|| ZoneId::new(""));
        let friendly_name = self.friendly_name.unwrap_or_else(|| id.to_string());
        let zone = Zone {
            id,
            friendly_name,
            description: self.description,
            pins: self.pins,
        };
        zone.validate()?;
        Ok(zone)
    }
}
