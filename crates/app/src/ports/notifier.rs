//! Notifier port — push notifications.

use std::future::Future;

use lightshow_domain::error::LightshowError;
use lightshow_domain::notification::Notification;

/// Sends best-effort alerts.
///
/// Implementations without credentials return `Ok(())` without doing anything.
pub trait Notifier: Send + Sync {
    /// Deliver `notification`.
    fn send(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send;
}

impl<T: Notifier> Notifier for std::sync::Arc<T> {
    fn send(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send {
        (**self).send(notification)
    }
}
