//! Shadow bridge — turns device shadow documents into control events.
//!
//! Every accepted desired value is echoed back as the reported value
//! *before* the controller has switched anything. The shadow can therefore
//! claim a state the relays never reached if the actuation later fails; the
//! controller reports again once the transition completes.

use serde_json::Value;

use lightshow_domain::event::ControlEvent;
use lightshow_domain::id::ZoneId;
use lightshow_domain::shadow;
use lightshow_domain::zone::ZoneState;

use crate::event_queue::EventSender;
use crate::ports::StateReporter;

/// Glue between the remote state source and the controller queue.
pub struct ShadowBridge<R> {
    reporter: R,
    queue: EventSender,
}

impl<R: StateReporter> ShadowBridge<R> {
    pub fn new(reporter: R, queue: EventSender) -> Self {
        Self { reporter, queue }
    }

    /// Handle a `update/delta` document for `zone`.
    ///
    /// Returns the event pushed to the queue, or `None` when the document
    /// carries no valid `"ON"`/`"OFF"` value.
    pub async fn on_delta(&self, zone: &ZoneId, document: &Value) -> Option<ControlEvent> {
        let state = shadow::delta_state(document);
        self.accept(zone, state, "delta").await
    }

    /// Handle a `get/accepted` document for `zone`, the answer to the initial
    /// desired-state fetch.
    ///
    /// Returns the event pushed to the queue, or `None` when the document has
    /// no valid desired value.
    pub async fn on_get_accepted(&self, zone: &ZoneId, document: &Value) -> Option<ControlEvent> {
        let state = shadow::desired_state(document);
        self.accept(zone, state, "get").await
    }

    async fn accept(
        &self,
        zone: &ZoneId,
        state: Option<ZoneState>,
        source: &'static str,
    ) -> Option<ControlEvent> {
        let Some(state) = state else {
            tracing::debug!(%zone, source, "ignoring shadow document without on/off state");
            return None;
        };

        if let Err(err) = self.reporter.report(zone, state).await {
            tracing::warn!(%zone, %state, error = ?err, "unable to echo reported state");
        }

        let event = ControlEvent::for_state(zone.clone(), state);
        tracing::debug!(%event, source, "desired state received");
        self.queue.push(event.clone());
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use lightshow_domain::error::LightshowError;
    use serde_json::json;

    use crate::event_queue::EventQueue;

    #[derive(Default)]
    struct RecordingReporter {
        reports: Mutex<Vec<(ZoneId, ZoneState)>>,
        fail: bool,
    }

    impl StateReporter for RecordingReporter {
        fn report(
            &self,
            zone: &ZoneId,
            state: ZoneState,
        ) -> impl Future<Output = Result<(), LightshowError>> + Send {
            self.reports.lock().unwrap().push((zone.clone(), state));
            let fail = self.fail;
            async move {
                if fail {
                    Err(LightshowError::Remote("timeout".into()))
                } else {
                    Ok(())
                }
            }
        }
    }

    #[tokio::test]
    async fn should_echo_and_enqueue_on_delta() {
        let (tx, mut rx) = EventQueue::new().split();
        let bridge = ShadowBridge::new(RecordingReporter::default(), tx);
        let zone = ZoneId::new("garden-lights");

        let event = bridge
            .on_delta(&zone, &json!({"state": {"state": "ON"}}))
            .await;

        assert_eq!(event, Some(ControlEvent::On(zone.clone())));
        assert_eq!(rx.pop().await, Some(ControlEvent::On(zone.clone())));
        assert_eq!(
            *bridge.reporter.reports.lock().unwrap(),
            vec![(zone, ZoneState::On)]
        );
    }

    #[tokio::test]
    async fn should_ignore_delta_with_unsupported_value() {
        let (tx, mut rx) = EventQueue::new().split();
        let bridge = ShadowBridge::new(RecordingReporter::default(), tx);
        let zone = ZoneId::new("garden-lights");

        let event = bridge
            .on_delta(&zone, &json!({"state": {"state": "BLINK"}}))
            .await;

        assert!(event.is_none());
        assert!(bridge.reporter.reports.lock().unwrap().is_empty());
        drop(bridge);
        assert_eq!(rx.pop().await, None);
    }

    #[tokio::test]
    async fn should_enqueue_off_from_initial_get() {
        let (tx, mut rx) = EventQueue::new().split();
        let bridge = ShadowBridge::new(RecordingReporter::default(), tx);
        let zone = ZoneId::new("summerhouse-lights");
        let document = json!({"state": {"desired": {"state": "OFF"}, "reported": {"state": "ON"}}});

        let event = bridge.on_get_accepted(&zone, &document).await;

        assert_eq!(event, Some(ControlEvent::Off(zone.clone())));
        assert_eq!(rx.pop().await, Some(ControlEvent::Off(zone)));
    }

    #[tokio::test]
    async fn should_ignore_initial_get_without_desired_state() {
        let (tx, _rx) = EventQueue::new().split();
        let bridge = ShadowBridge::new(RecordingReporter::default(), tx);

        let event = bridge
            .on_get_accepted(&ZoneId::new("a"), &json!({"state": {}}))
            .await;

        assert!(event.is_none());
    }

    #[tokio::test]
    async fn should_enqueue_even_when_echo_fails() {
        let (tx, mut rx) = EventQueue::new().split();
        let reporter = RecordingReporter {
            fail: true,
            ..RecordingReporter::default()
        };
        let bridge = ShadowBridge::new(reporter, tx);
        let zone = ZoneId::new("a");

        bridge
            .on_delta(&zone, &json!({"state": {"state": "OFF"}}))
            .await;

        assert_eq!(rx.pop().await, Some(ControlEvent::Off(zone)));
    }
}
