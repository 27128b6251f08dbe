//! # lightshow-adapter-pushover
//!
//! [`Notifier`] that posts messages to the Pushover API.
//!
//! Messages are sent silently (`sound=none`): they are informational, the
//! lights have already switched. Without credentials the notifier does
//! nothing and reports success.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `lightshow-app` and `lightshow-domain`.

mod config;
mod error;

pub use config::PushoverConfig;
pub use error::NotifyError;

use std::future::Future;

use reqwest::Client;
use serde::Serialize;

use lightshow_app::ports::Notifier;
use lightshow_domain::error::LightshowError;
use lightshow_domain::notification::Notification;

/// Form body of a Pushover message.
#[derive(Debug, Serialize)]
struct Message<'a> {
    token: &'a str,
    user: &'a str,
    title: &'a str,
    message: &'a str,
    sound: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

#[derive(Debug, Clone)]
struct Credentials {
    user_key: String,
    api_token: String,
}

/// Pushover-backed [`Notifier`].
#[derive(Debug, Clone)]
pub struct PushoverNotifier {
    client: Client,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl PushoverNotifier {
    /// Build the notifier.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &PushoverConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(NotifyError::Client)?;

        let credentials = config
            .credentials()
            .map(|(user_key, api_token)| Credentials {
                user_key: user_key.to_string(),
                api_token: api_token.to_string(),
            });
        if credentials.is_none() {
            tracing::info!("pushover credentials not set, notifications disabled");
        }

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            credentials,
        })
    }

    /// Whether messages are actually sent.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    async fn post(
        &self,
        credentials: &Credentials,
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        let message = Message {
            token: &credentials.api_token,
            user: &credentials.user_key,
            title: &notification.title,
            message: &notification.message,
            sound: "none",
            url: notification.url.as_deref(),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .form(&message)
            .send()
            .await
            .map_err(NotifyError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

impl Notifier for PushoverNotifier {
    fn send(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send {
        async move {
            let Some(credentials) = &self.credentials else {
                tracing::debug!(title = %notification.title, "notification skipped");
                return Ok(());
            };
            self.post(credentials, &notification).await?;
            tracing::debug!(title = %notification.title, "notification sent");
            Ok(())
        }
    }
}
