//! Sysfs GPIO adapter error types.

use std::path::PathBuf;

use lightshow_domain::error::LightshowError;
use lightshow_domain::id::PinId;

/// Errors specific to the sysfs GPIO adapter.
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    /// The GPIO class directory does not exist (no sysfs GPIO support).
    #[error("GPIO sysfs interface not found at {}", .0.display())]
    Unavailable(PathBuf),

    /// The driver was used before `acquire`.
    #[error("GPIO driver not acquired")]
    NotAcquired,

    /// The pin directory did not appear after export.
    #[error("pin {0} did not appear after export")]
    ExportTimeout(PinId),

    /// Reading or writing a sysfs attribute failed.
    #[error("failed to access {}", path.display())]
    Io {
        /// Attribute path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `value` attribute held something other than `0` or `1`.
    #[error("unexpected value {value:?} read from pin {pin}")]
    UnexpectedValue {
        /// Pin that was read.
        pin: PinId,
        /// Raw attribute content.
        value: String,
    },
}

impl GpioError {
    /// Convert into a [`LightshowError::Driver`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> LightshowError {
        LightshowError::Driver(Box::new(self))
    }
}

impl From<GpioError> for LightshowError {
    fn from(err: GpioError) -> Self {
        err.into_domain()
    }
}
