//! # lightshow-adapter-mqtt
//!
//! AWS IoT device shadows over MQTT, one thing per zone.
//!
//! ## Tasks
//!
//! ```text
//! broker ──► [event loop task] ──publish──► [dispatch task] ──► ShadowBridge ──► EventQueue
//!                   ▲                              │
//!                   └──────── ShadowClient ◄───────┘ (echo report)
//! ```
//!
//! The event loop task only drives the connection. Inbound publishes are
//! handed to a separate dispatch task because the bridge publishes the
//! echoed report, which needs the event loop to keep polling.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `lightshow-app` and `lightshow-domain`.

mod backoff;
mod config;
mod error;
pub mod topics;

pub use config::{MqttConfig, ReconnectConfig};
pub use error::ShadowError;

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, Publish, QoS, Transport};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use lightshow_app::event_queue::EventSender;
use lightshow_app::ports::{DesiredStateSource, StateReporter};
use lightshow_app::shadow_bridge::ShadowBridge;
use lightshow_domain::error::LightshowError;
use lightshow_domain::id::ZoneId;
use lightshow_domain::shadow;
use lightshow_domain::zone::ZoneState;

use crate::backoff::Backoff;
use crate::topics::ShadowMessage;

/// Minimum capacity of the rumqttc request channel.
const REQUEST_CAPACITY: usize = 16;

/// Publishing half of the shadow connection.
#[derive(Clone)]
pub struct ShadowClient {
    client: AsyncClient,
    operation_timeout: Duration,
}

impl ShadowClient {
    async fn publish(&self, topic: String, payload: Vec<u8>) -> Result<(), ShadowError> {
        tokio::time::timeout(
            self.operation_timeout,
            self.client.publish(topic, QoS::AtLeastOnce, false, payload),
        )
        .await
        .map_err(|_| ShadowError::Timeout)?
        .map_err(ShadowError::Client)
    }
}

impl StateReporter for ShadowClient {
    fn report(
        &self,
        zone: &ZoneId,
        state: ZoneState,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send {
        let topic = topics::update(zone.as_str());
        let payload = shadow::reported_document(state).to_string();
        async move {
            self.publish(topic, payload.into_bytes()).await?;
            tracing::debug!(%state, "reported state published");
            Ok(())
        }
    }
}

impl DesiredStateSource for ShadowClient {
    fn fetch_desired(
        &self,
        zone: &ZoneId,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send {
        let topic = topics::get(zone.as_str());
        async move { Ok(self.publish(topic, Vec::new()).await?) }
    }
}

/// Background tasks owning the connection.
pub struct ShadowConnection {
    client: AsyncClient,
    event_loop: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl ShadowConnection {
    /// Disconnect from the broker and stop both tasks.
    pub async fn shutdown(mut self) {
        if let Err(err) = self.client.try_disconnect() {
            tracing::debug!(error = ?err, "disconnect request not delivered");
        }
        // Leave the event loop a moment to flush the disconnect packet.
        let _ = tokio::time::timeout(Duration::from_secs(1), &mut self.event_loop).await;
        self.event_loop.abort();
        self.dispatcher.abort();
        tracing::info!("shadow connection closed");
    }
}

/// Open the shadow connection for `zones`.
///
/// Subscriptions are queued before the event loop starts so that they reach
/// the broker ahead of any `get` published by the caller.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns [`ShadowError::Io`] if a TLS credential cannot be read, or
/// [`ShadowError::Client`] if a subscription cannot be queued.
pub fn connect(
    config: &MqttConfig,
    zones: Vec<ZoneId>,
    queue: EventSender,
) -> Result<(ShadowClient, ShadowConnection), ShadowError> {
    let options = build_options(config)?;
    let capacity = REQUEST_CAPACITY.max(zones.len() * 4);
    let (client, event_loop) = AsyncClient::new(options, capacity);

    let subscriptions: Vec<String> = zones
        .iter()
        .flat_map(|zone| topics::subscriptions(zone.as_str()))
        .collect();
    for topic in &subscriptions {
        client
            .try_subscribe(topic.as_str(), QoS::AtLeastOnce)
            .map_err(ShadowError::Client)?;
    }

    let shadow_client = ShadowClient {
        client: client.clone(),
        operation_timeout: config.operation_timeout(),
    };

    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let event_loop = tokio::spawn(drive(
        event_loop,
        client.clone(),
        subscriptions,
        Backoff::new(&config.reconnect),
        inbound_tx,
    ));
    let bridge = ShadowBridge::new(shadow_client.clone(), queue);
    let dispatcher = tokio::spawn(dispatch(inbound_rx, bridge, zones));

    tracing::info!(host = %config.host, port = config.port, "shadow connection started");
    Ok((
        shadow_client,
        ShadowConnection {
            client,
            event_loop,
            dispatcher,
        },
    ))
}

fn build_options(config: &MqttConfig) -> Result<MqttOptions, ShadowError> {
    let mut options = MqttOptions::new(config.client_id.as_str(), config.host.as_str(), config.port);
    options.set_keep_alive(config.keep_alive());

    if let Some(ca_path) = &config.ca_path {
        let ca = read_file(ca_path)?;
        let client_auth = match (&config.cert_path, &config.key_path) {
            (Some(cert), Some(key)) => Some((read_file(cert)?, read_file(key)?)),
            _ => None,
        };
        let alpn = config
            .alpn
            .as_ref()
            .map(|protocol| vec![protocol.as_bytes().to_vec()]);
        options.set_transport(Transport::tls(ca, client_auth, alpn));
    }
    Ok(options)
}

fn read_file(path: &Path) -> Result<Vec<u8>, ShadowError> {
    std::fs::read(path).map_err(|source| ShadowError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn drive(
    mut event_loop: EventLoop,
    client: AsyncClient,
    subscriptions: Vec<String>,
    mut backoff: Backoff,
    inbound: mpsc::UnboundedSender<Publish>,
) {
    let mut connected_once = false;
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                if connected_once {
                    // Clean sessions drop subscriptions on reconnect.
                    resubscribe(&client, &subscriptions);
                }
                connected_once = true;
                backoff.reset();
                tracing::info!("connected to shadow broker");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if inbound.send(publish).is_err() {
                    break;
                }
            }
            Ok(Event::Outgoing(rumqttc::Outgoing::Disconnect)) => {
                tracing::debug!("disconnect sent");
                break;
            }
            Ok(_) => {}
            Err(err) => match backoff.next_delay() {
                Some(delay) => {
                    tracing::warn!(
                        error = %err,
                        attempt = backoff.failures(),
                        retry_in_secs = delay.as_secs(),
                        "shadow connection failed"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    let err = ShadowError::Connection(backoff.failures());
                    tracing::error!(error = %err, "giving up on shadow connection");
                    break;
                }
            },
        }
    }
}

fn resubscribe(client: &AsyncClient, subscriptions: &[String]) {
    for topic in subscriptions {
        if let Err(err) = client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
            tracing::warn!(%topic, error = ?err, "re-subscribe failed");
        }
    }
}

async fn dispatch<R: StateReporter>(
    mut inbound: mpsc::UnboundedReceiver<Publish>,
    bridge: ShadowBridge<R>,
    zones: Vec<ZoneId>,
) {
    while let Some(publish) = inbound.recv().await {
        handle_publish(&bridge, &zones, &publish.topic, &publish.payload).await;
    }
}

/// Route one inbound shadow message to the bridge.
async fn handle_publish<R: StateReporter>(
    bridge: &ShadowBridge<R>,
    zones: &[ZoneId],
    topic: &str,
    payload: &[u8],
) {
    let Some((thing, kind)) = topics::parse(topic) else {
        tracing::debug!(%topic, "ignoring message on unexpected topic");
        return;
    };
    let Some(zone) = zones.iter().find(|zone| zone.as_str() == thing) else {
        tracing::debug!(%topic, "ignoring message for unknown zone");
        return;
    };
    let document: serde_json::Value = match serde_json::from_slice(payload) {
        Ok(document) => document,
        Err(err) => {
            let err = ShadowError::PayloadParse(err);
            tracing::debug!(%topic, error = ?err, "ignoring malformed shadow payload");
            return;
        }
    };
    match kind {
        ShadowMessage::Delta => bridge.on_delta(zone, &document).await,
        ShadowMessage::GetAccepted => bridge.on_get_accepted(zone, &document).await,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use lightshow_app::event_queue::EventQueue;
    use lightshow_domain::event::ControlEvent;

    #[derive(Default)]
    struct RecordingReporter {
        reports: Mutex<Vec<(ZoneId, ZoneState)>>,
    }

    impl StateReporter for RecordingReporter {
        fn report(
            &self,
            zone: &ZoneId,
            state: ZoneState,
        ) -> impl Future<Output = Result<(), LightshowError>> + Send {
            self.reports.lock().unwrap().push((zone.clone(), state));
            async { Ok(()) }
        }
    }

    fn zones() -> Vec<ZoneId> {
        vec![
            ZoneId::new("garden-lights"),
            ZoneId::new("summerhouse-lights"),
        ]
    }

    #[tokio::test]
    async fn should_route_delta_to_zone() {
        let (tx, mut rx) = EventQueue::new().split();
        let bridge = ShadowBridge::new(RecordingReporter::default(), tx);

        handle_publish(
            &bridge,
            &zones(),
            "$aws/things/summerhouse-lights/shadow/update/delta",
            br#"{"version":3,"state":{"state":"ON"}}"#,
        )
        .await;

        assert_eq!(
            rx.pop().await,
            Some(ControlEvent::On(ZoneId::new("summerhouse-lights")))
        );
    }

    #[tokio::test]
    async fn should_route_get_accepted_to_zone() {
        let (tx, mut rx) = EventQueue::new().split();
        let bridge = ShadowBridge::new(RecordingReporter::default(), tx);

        handle_publish(
            &bridge,
            &zones(),
            "$aws/things/garden-lights/shadow/get/accepted",
            br#"{"state":{"desired":{"state":"OFF"}}}"#,
        )
        .await;

        assert_eq!(
            rx.pop().await,
            Some(ControlEvent::Off(ZoneId::new("garden-lights")))
        );
    }

    #[tokio::test]
    async fn should_ignore_unknown_zone_and_malformed_payload() {
        let (tx, mut rx) = EventQueue::new().split();
        let bridge = ShadowBridge::new(RecordingReporter::default(), tx);

        handle_publish(
            &bridge,
            &zones(),
            "$aws/things/pond-pump/shadow/update/delta",
            br#"{"state":{"state":"ON"}}"#,
        )
        .await;
        handle_publish(
            &bridge,
            &zones(),
            "$aws/things/garden-lights/shadow/update/delta",
            b"not json",
        )
        .await;

        drop(bridge);
        assert_eq!(rx.pop().await, None);
    }

    fn unpolled_client(capacity: usize) -> (ShadowClient, EventLoop) {
        let options = MqttOptions::new("test", "localhost", 1883);
        let (client, event_loop) = AsyncClient::new(options, capacity);
        let client = ShadowClient {
            client,
            operation_timeout: Duration::from_secs(5),
        };
        (client, event_loop)
    }

    fn queued(event_loop: &mut EventLoop) -> Vec<rumqttc::Request> {
        event_loop.clean();
        event_loop.pending.drain(..).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn should_publish_report_and_get_on_shadow_topics() {
        let (client, mut event_loop) = unpolled_client(4);
        let zone = ZoneId::new("garden-lights");

        client.report(&zone, ZoneState::On).await.unwrap();
        client.fetch_desired(&zone).await.unwrap();

        let published: Vec<(String, Vec<u8>)> = queued(&mut event_loop)
            .into_iter()
            .filter_map(|request| match request {
                rumqttc::Request::Publish(publish) => {
                    assert_eq!(publish.qos, QoS::AtLeastOnce);
                    assert!(!publish.retain);
                    Some((publish.topic, publish.payload.to_vec()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            published,
            vec![
                (
                    "$aws/things/garden-lights/shadow/update".to_string(),
                    br#"{"state":{"reported":{"state":"ON"}}}"#.to_vec()
                ),
                ("$aws/things/garden-lights/shadow/get".to_string(), Vec::new()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_time_out_report_when_request_channel_is_full() {
        let (client, _event_loop) = unpolled_client(1);
        let zone = ZoneId::new("garden-lights");
        client.report(&zone, ZoneState::On).await.unwrap();

        let started = tokio::time::Instant::now();
        let result = client.report(&zone, ZoneState::Off).await;

        assert_eq!(started.elapsed(), Duration::from_secs(5));
        match result {
            Err(LightshowError::Remote(source)) => assert!(matches!(
                source.downcast_ref::<ShadowError>(),
                Some(ShadowError::Timeout)
            )),
            other => panic!("expected remote timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_queue_every_subscription_again_on_resubscribe() {
        let (client, mut event_loop) = unpolled_client(8);
        let subscriptions: Vec<String> = topics::subscriptions("garden-lights").to_vec();

        resubscribe(&client.client, &subscriptions);

        let filters: Vec<String> = queued(&mut event_loop)
            .into_iter()
            .filter_map(|request| match request {
                rumqttc::Request::Subscribe(subscribe) => Some(subscribe.filters),
                _ => None,
            })
            .flatten()
            .map(|filter| filter.path)
            .collect();
        assert_eq!(filters, subscriptions);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_driving_once_retries_are_spent() {
        let mut options = MqttOptions::new("test", "127.0.0.1", 1);
        options.set_keep_alive(Duration::from_secs(5));
        let (client, event_loop) = AsyncClient::new(options, 4);
        let (inbound, _inbound_rx) = mpsc::unbounded_channel();
        let backoff = Backoff::new(&ReconnectConfig {
            initial_backoff_secs: 1,
            max_backoff_secs: 2,
            max_retries: 2,
        });

        let finished = tokio::time::timeout(
            Duration::from_secs(120),
            drive(event_loop, client, Vec::new(), backoff, inbound),
        )
        .await;

        assert!(finished.is_ok());
    }

    #[test]
    fn should_build_plain_options_without_ca() {
        let options = build_options(&MqttConfig::default()).unwrap();
        assert_eq!(options.keep_alive(), Duration::from_secs(60));
        assert_eq!(options.client_id(), "lightshow");
    }

    #[test]
    fn should_fail_on_missing_ca_file() {
        let config = MqttConfig {
            ca_path: Some("/nonexistent/lightshow/ca.pem".into()),
            ..MqttConfig::default()
        };
        assert!(matches!(
            build_options(&config),
            Err(ShadowError::Io { .. })
        ));
    }
}
