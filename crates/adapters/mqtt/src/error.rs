//! Shadow adapter error types.

use std::path::PathBuf;

use lightshow_domain::error::LightshowError;

/// Errors specific to the device shadow adapter.
#[derive(Debug, thiserror::Error)]
pub enum ShadowError {
    /// The rumqttc client rejected a request.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// A publish did not complete within the operation timeout.
    #[error("MQTT operation timed out")]
    Timeout,

    /// The connection was abandoned after too many failed attempts.
    #[error("MQTT connection abandoned after {0} attempts")]
    Connection(u32),

    /// Failed to parse an incoming shadow payload as JSON.
    #[error("failed to parse shadow payload")]
    PayloadParse(#[source] serde_json::Error),

    /// A TLS credential file could not be read.
    #[error("unable to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ShadowError {
    /// Convert into a [`LightshowError::Remote`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> LightshowError {
        LightshowError::Remote(Box::new(self))
    }
}

impl From<ShadowError> for LightshowError {
    fn from(err: ShadowError) -> Self {
        err.into_domain()
    }
}
