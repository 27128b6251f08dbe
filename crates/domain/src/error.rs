//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`LightshowError`] at port boundaries.

/// Base error type shared by the domain, application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum LightshowError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced zone does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The output driver (GPIO) failed.
    #[error("output driver error")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Communication with the remote state source failed.
    #[error("remote state error")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A notification could not be delivered.
    #[error("notification error")]
    Notify(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A background task ended abnormally.
    #[error("background task failed")]
    Task(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// An identifier or name was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// A zone was declared without any output pin.
    #[error("zone {zone} has no output pins")]
    NoPins {
        /// Zone identifier.
        zone: String,
    },

    /// The same pin appears more than once in a zone.
    #[error("pin {pin} is listed twice in zone {zone}")]
    DuplicatePin {
        /// Zone identifier.
        zone: String,
        /// Offending pin.
        pin: u8,
    },

    /// A zone id contains a character that is not allowed in an MQTT topic
    /// segment.
    #[error("zone id {zone:?} must not contain {character:?}")]
    InvalidZoneId {
        /// Zone identifier.
        zone: String,
        /// Offending character.
        character: char,
    },

    /// Two zones share the same identifier.
    #[error("zone {0} is declared twice")]
    DuplicateZone(String),

    /// A pin is claimed by more than one zone or control line.
    #[error("pin {pin} is used by both {first} and {second}")]
    PinInUse {
        /// Offending pin.
        pin: u8,
        /// First owner (zone id, `"ready"` or `"switch"`).
        first: String,
        /// Second owner.
        second: String,
    },

    /// At least one zone must be configured.
    #[error("no zones configured")]
    NoZones,
}

/// A lookup by identifier failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of the missing thing (e.g. `"Zone"`).
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}
