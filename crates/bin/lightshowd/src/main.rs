//! # lightshowd — lightshow daemon
//!
//! Composition root that wires the zone controller to its adapters and runs
//! until SIGINT/SIGTERM.
//!
//! ## Responsibilities
//! - Load configuration (file, env vars) and initialise logging
//! - Pick the output driver (`virtual` or `sysfs`)
//! - Open the device shadow connection, when configured
//! - Start the controller, fetch each zone's desired state, start the poller
//! - Shut down deterministically: poller, controller, then the connection
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::future::Future;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use lightshow_adapter_gpio_sysfs::SysfsOutputDriver;
use lightshow_adapter_mqtt::{ShadowClient, ShadowConnection};
use lightshow_adapter_pushover::PushoverNotifier;
use lightshow_adapter_virtual::VirtualOutputDriver;
use lightshow_app::controller::ZoneController;
use lightshow_app::event_queue::EventQueue;
use lightshow_app::poller::Poller;
use lightshow_app::ports::{DesiredStateSource, Notifier, OutputDriver, StateReporter};
use lightshow_domain::error::LightshowError;
use lightshow_domain::id::ZoneId;
use lightshow_domain::notification::Notification;
use lightshow_domain::zone::ZoneState;

use crate::config::{Config, DriverKind};

/// Shadow connection, or nothing when `[mqtt]` is not configured.
#[derive(Clone)]
enum Remote {
    Shadow(ShadowClient),
    Offline,
}

impl StateReporter for Remote {
    fn report(
        &self,
        zone: &ZoneId,
        state: ZoneState,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send {
        async move {
            match self {
                Self::Shadow(client) => client.report(zone, state).await,
                Self::Offline => Ok(()),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    match config.gpio.driver {
        DriverKind::Virtual => run(&config, VirtualOutputDriver::new()).await?,
        DriverKind::Sysfs => {
            run(&config, SysfsOutputDriver::new(config.gpio.sysfs.clone())).await?;
        }
    }
    Ok(())
}

async fn run<D>(config: &Config, driver: D) -> Result<(), Box<dyn std::error::Error>>
where
    D: OutputDriver + 'static,
{
    let notifier = Arc::new(PushoverNotifier::new(&config.pushover)?);
    let queue = EventQueue::new();

    let (remote, connection) = match &config.mqtt {
        Some(mqtt) => {
            let (client, connection) =
                lightshow_adapter_mqtt::connect(mqtt, config.zone_ids(), queue.sender())?;
            (Remote::Shadow(client), Some(connection))
        }
        None => {
            tracing::warn!("no [mqtt] section, running without device shadows");
            (Remote::Offline, None)
        }
    };

    let controller = ZoneController::new(
        config.zones()?,
        config.controller_settings(),
        driver,
        remote.clone(),
        Arc::clone(&notifier),
    )?;
    // Exporting sysfs pins blocks until udev catches up.
    let handle = match tokio::task::block_in_place(|| controller.start(queue)) {
        Ok(handle) => handle,
        Err(err) => {
            close(connection).await;
            return Err(err.into());
        }
    };

    if let Remote::Shadow(client) = &remote {
        fetch_initial_desired_state(client, &config.zone_ids()).await;
    }

    let poller = Poller::start(handle.sender(), config.poll_interval());
    if let Err(err) = notifier
        .send(Notification::new("Lightshow", "Listener started"))
        .await
    {
        tracing::warn!(error = ?err, "unable to send notification");
    }
    tracing::info!(zones = config.zones.len(), "lightshowd running");

    shutdown_signal().await;
    tracing::info!("shutting down");

    poller.stop();
    if let Err(err) = handle.stop().await {
        tracing::error!(error = ?err, "controller loop ended abnormally");
    }
    close(connection).await;
    Ok(())
}

/// Ask every zone's shadow for its desired state; answers arrive as
/// `get/accepted` messages.
async fn fetch_initial_desired_state(client: &ShadowClient, zones: &[ZoneId]) {
    for zone in zones {
        if let Err(err) = client.fetch_desired(zone).await {
            tracing::warn!(%zone, error = ?err, "unable to fetch desired state");
        }
    }
}

async fn close(connection: Option<ShadowConnection>) {
    if let Some(connection) = connection {
        connection.shutdown().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = ?err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
