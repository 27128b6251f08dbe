//! Output driver port — relay outputs and the manual override input.

use lightshow_domain::error::LightshowError;
use lightshow_domain::id::PinId;

/// Drives physical binary outputs and reads binary inputs by pin number.
///
/// The driver is owned by the controller loop once the controller starts, so
/// implementations never see concurrent calls.
///
/// Lifecycle:
///
/// 1. [`acquire`](Self::acquire) — claim the hardware, fatal on failure
/// 2. [`configure_output`](Self::configure_output) /
///    [`configure_input`](Self::configure_input) for every pin in use
/// 3. [`set_output`](Self::set_output) / [`read_input`](Self::read_input)
/// 4. [`release`](Self::release) — hand the pins back
pub trait OutputDriver: Send {
    /// Claim the underlying hardware.
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Driver`] when the hardware is unavailable.
    fn acquire(&mut self) -> Result<(), LightshowError>;

    /// Configure `pin` as an output.
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Driver`] when the pin cannot be claimed.
    fn configure_output(&mut self, pin: PinId) -> Result<(), LightshowError>;

    /// Configure `pin` as an input with its pull-up enabled.
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Driver`] when the pin cannot be claimed.
    fn configure_input(&mut self, pin: PinId) -> Result<(), LightshowError>;

    /// Drive `pin` high (`true`) or low (`false`).
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Driver`] when the write fails.
    fn set_output(&mut self, pin: PinId, active: bool) -> Result<(), LightshowError>;

    /// Read the level of an input pin.
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Driver`] when the read fails.
    fn read_input(&self, pin: PinId) -> Result<bool, LightshowError>;

    /// Release every pin claimed since [`acquire`](Self::acquire).
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Driver`] when the hardware refuses the release.
    fn release(&mut self) -> Result<(), LightshowError>;
}

impl<T: OutputDriver + ?Sized> OutputDriver for Box<T> {
    fn acquire(&mut self) -> Result<(), LightshowError> {
        (**self).acquire()
    }

    fn configure_output(&mut self, pin: PinId) -> Result<(), LightshowError> {
        (**self).configure_output(pin)
    }

    fn configure_input(&mut self, pin: PinId) -> Result<(), LightshowError> {
        (**self).configure_input(pin)
    }

    fn set_output(&mut self, pin: PinId, active: bool) -> Result<(), LightshowError> {
        (**self).set_output(pin, active)
    }

    fn read_input(&self, pin: PinId) -> Result<bool, LightshowError> {
        (**self).read_input(pin)
    }

    fn release(&mut self) -> Result<(), LightshowError> {
        (**self).release()
    }
}
