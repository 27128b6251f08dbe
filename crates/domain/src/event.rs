//! Control events — the messages serialised through the controller queue.
//!
//! Events are produced by the shadow bridge, the periodic poller and the
//! daemon's shutdown path, and consumed exactly once by the controller loop.

use std::fmt;

use crate::id::ZoneId;
use crate::zone::ZoneState;

/// A request for the zone controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// Switch a zone on.
    On(ZoneId),
    /// Switch a zone off.
    Off(ZoneId),
    /// Re-read the manual override switch.
    Poll,
    /// Stop the controller loop.
    Exit,
}

impl ControlEvent {
    /// Build the event that drives `zone` towards `state`.
    #[must_use]
    pub fn for_state(zone: ZoneId, state: ZoneState) -> Self {
        match state {
            ZoneState::On => Self::On(zone),
            ZoneState::Off => Self::Off(zone),
        }
    }

    /// Short label used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::On(_) => "on",
            Self::Off(_) => "off",
            Self::Poll => "poll",
            Self::Exit => "exit",
        }
    }

    /// The zone targeted by this event, if any.
    #[must_use]
    pub fn zone(&self) -> Option<&ZoneId> {
        match self {
            Self::On(zone) | Self::Off(zone) => Some(zone),
            Self::Poll | Self::Exit => None,
        }
    }
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.zone() {
            Some(zone) => write!(f, "{}({zone})", self.kind()),
            None => f.write_str(self.kind()),
        }
    }
}
