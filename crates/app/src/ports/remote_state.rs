//! Remote state ports — the device shadow of each zone.

use std::future::Future;

use lightshow_domain::error::LightshowError;
use lightshow_domain::id::ZoneId;
use lightshow_domain::zone::ZoneState;

/// Publishes a zone's *reported* state to its shadow.
pub trait StateReporter: Send + Sync {
    /// Report that `zone` is now in `state`. Best effort: callers log
    /// failures and carry on.
    fn report(
        &self,
        zone: &ZoneId,
        state: ZoneState,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send;
}

impl<T: StateReporter> StateReporter for std::sync::Arc<T> {
    fn report(
        &self,
        zone: &ZoneId,
        state: ZoneState,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send {
        (**self).report(zone, state)
    }
}

/// Requests the current *desired* state of a zone's shadow.
///
/// The answer arrives asynchronously and is fed to
/// [`ShadowBridge::on_get_accepted`](crate::shadow_bridge::ShadowBridge::on_get_accepted).
pub trait DesiredStateSource: Send + Sync {
    /// Ask the remote side for the desired state of `zone`.
    fn fetch_desired(
        &self,
        zone: &ZoneId,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send;
}
