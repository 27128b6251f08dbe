//! Virtual driver error types.

use lightshow_domain::error::LightshowError;
use lightshow_domain::id::PinId;

/// Errors raised by the simulated board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VirtualError {
    /// The board was marked unavailable.
    #[error("virtual board unavailable")]
    Unavailable,

    /// The driver was used before `acquire` or after `release`.
    #[error("virtual board not acquired")]
    NotAcquired,

    /// The pin was not configured in the direction it is used in.
    #[error("pin {pin} is not configured as {direction}")]
    WrongDirection {
        /// Offending pin.
        pin: PinId,
        /// Expected direction (`"output"` or `"input"`).
        direction: &'static str,
    },

    /// A fault injected through [`VirtualBoard::fail_pin`](crate::VirtualBoard::fail_pin).
    #[error("pin {0} is faulty")]
    Faulty(PinId),
}

impl VirtualError {
    /// Convert into a [`LightshowError::Driver`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> LightshowError {
        LightshowError::Driver(Box::new(self))
    }
}

impl From<VirtualError> for LightshowError {
    fn from(err: VirtualError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_wrong_direction_error() {
        let err = VirtualError::WrongDirection {
            pin: PinId::new(17),
            direction: "output",
        };
        assert_eq!(err.to_string(), "pin 17 is not configured as output");
    }

    #[test]
    fn should_convert_into_driver_error() {
        let err: LightshowError = VirtualError::NotAcquired.into();
        assert!(matches!(err, LightshowError::Driver(_)));
    }
}
