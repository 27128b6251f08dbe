//! Notification — a short human-readable alert.

use crate::zone::ZoneState;

/// A best-effort alert sent to the household's phones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub url: Option<String>,
}

impl Notification {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            url: None,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// The alert sent after a zone changed state.
    #[must_use]
    pub fn zone_changed(friendly_name: &str, state: ZoneState) -> Self {
        Self::new(friendly_name, format!("Lights {state}!"))
    }
}
