//! Pushover adapter error types.

use lightshow_domain::error::LightshowError;

/// Errors specific to the Pushover adapter.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The HTTP client could not be built.
    #[error("unable to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request failed or timed out.
    #[error("request to Pushover failed")]
    Request(#[source] reqwest::Error),

    /// Pushover answered with a non-success status.
    #[error("Pushover rejected the message with status {0}")]
    Rejected(u16),
}

impl NotifyError {
    /// Convert into a [`LightshowError::Notify`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> LightshowError {
        LightshowError::Notify(Box::new(self))
    }
}

impl From<NotifyError> for LightshowError {
    fn from(err: NotifyError) -> Self {
        err.into_domain()
    }
}
