//! Pushover credentials and endpoint.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the Pushover notifier.
///
/// Notifications are disabled unless both `user_key` and `api_token` are set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PushoverConfig {
    /// Recipient user (or group) key.
    pub user_key: Option<String>,
    /// Application API token.
    pub api_token: Option<String>,
    /// Messages endpoint.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl PushoverConfig {
    /// Both credentials, when configured and non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let user = self.user_key.as_deref().filter(|v| !v.is_empty())?;
        let token = self.api_token.as_deref().filter(|v| !v.is_empty())?;
        Some((user, token))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PushoverConfig {
    fn default() -> Self {
        Self {
            user_key: None,
            api_token: None,
            endpoint: "https://api.pushover.net/1/messages.json".to_string(),
            timeout_secs: 10,
        }
    }
}
