//! Zone controller — the single consumer of the control event queue.
//!
//! The controller owns every zone's on/off state and the output driver.
//! Producers never touch either: they push [`ControlEvent`]s and the loop
//! handles them one at a time, to completion, in arrival order. That is the
//! only synchronisation the zone state needs.
//!
//! For each transition the side effects are strictly ordered:
//!
//! 1. the relay outputs are switched,
//! 2. the new state is reported to the zone's shadow,
//! 3. a notification is sent.
//!
//! Steps 2 and 3 are best effort and never undo step 1.

use std::time::Duration;

use tokio::task::JoinHandle;

use lightshow_domain::error::{LightshowError, NotFoundError, ValidationError};
use lightshow_domain::event::ControlEvent;
use lightshow_domain::id::{PinId, ZoneId};
use lightshow_domain::notification::Notification;
use lightshow_domain::zone::{Zone, ZoneState};

use crate::event_queue::{EventQueue, EventReceiver, EventSender};
use crate::ports::{Notifier, OutputDriver, StateReporter};

/// Pin wired to the "controller ready" indicator.
pub const DEFAULT_READY_PIN: u8 = 23;
/// Pin wired to the manual override switch.
pub const DEFAULT_SWITCH_PIN: u8 = 17;
/// Pause after energising each pin of a zone.
pub const DEFAULT_ON_DELAY: Duration = Duration::from_secs(1);

/// Title used for controller lifecycle notifications.
const NOTIFICATION_TITLE: &str = "Lightshow";

/// Control lines and timings shared by all zones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Output held high while the controller runs.
    pub ready_pin: Option<PinId>,
    /// Manual override input; `None` disables switch polling.
    pub switch_pin: Option<PinId>,
    /// Sleep after each pin is switched on.
    pub on_delay: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            ready_pin: Some(PinId::new(DEFAULT_READY_PIN)),
            switch_pin: Some(PinId::new(DEFAULT_SWITCH_PIN)),
            on_delay: DEFAULT_ON_DELAY,
        }
    }
}

/// Check that `zones` and `settings` describe a usable wiring.
///
/// # Errors
///
/// Returns [`LightshowError::Validation`] when there are no zones, a zone is
/// invalid, two zones share an id, or a pin is claimed twice (by two zones,
/// or by a zone and the ready/switch line).
pub fn validate_layout(zones: &[Zone], settings: &ControllerSettings) -> Result<(), LightshowError> {
    if zones.is_empty() {
        return Err(ValidationError::NoZones.into());
    }

    let mut owners: Vec<(PinId, String)> = Vec::new();
    if let Some(pin) = settings.ready_pin {
        claim_pin(&mut owners, pin, "ready")?;
    }
    if let Some(pin) = settings.switch_pin {
        claim_pin(&mut owners, pin, "switch")?;
    }

    for (idx, zone) in zones.iter().enumerate() {
        zone.validate()?;
        if zones[..idx].iter().any(|other| other.id == zone.id) {
            return Err(ValidationError::DuplicateZone(zone.id.to_string()).into());
        }
        for &pin in &zone.pins {
            claim_pin(&mut owners, pin, zone.id.as_str())?;
        }
    }
    Ok(())
}

fn claim_pin(
    owners: &mut Vec<(PinId, String)>,
    pin: PinId,
    owner: &str,
) -> Result<(), LightshowError> {
    if let Some((_, first)) = owners.iter().find(|(claimed, _)| *claimed == pin) {
        return Err(ValidationError::PinInUse {
            pin: pin.number(),
            first: first.clone(),
            second: owner.to_string(),
        }
        .into());
    }
    owners.push((pin, owner.to_string()));
    Ok(())
}

struct ZoneSlot {
    zone: Zone,
    state: ZoneState,
}

/// Reactive two-state controller for every configured zone.
pub struct ZoneController<D: OutputDriver, R, N> {
    zones: Vec<ZoneSlot>,
    settings: ControllerSettings,
    driver: D,
    reporter: R,
    notifier: N,
    switch_state: bool,
    acquired: bool,
}

impl<D, R, N> ZoneController<D, R, N>
where
    D: OutputDriver,
    R: StateReporter,
    N: Notifier,
{
    /// Create a controller. Every zone starts [`ZoneState::Off`].
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Validation`] if the layout is invalid
    /// (see [`validate_layout`]).
    pub fn new(
        zones: Vec<Zone>,
        settings: ControllerSettings,
        driver: D,
        reporter: R,
        notifier: N,
    ) -> Result<Self, LightshowError> {
        validate_layout(&zones, &settings)?;
        Ok(Self {
            zones: zones
                .into_iter()
                .map(|zone| ZoneSlot {
                    zone,
                    state: ZoneState::Off,
                })
                .collect(),
            settings,
            driver,
            reporter,
            notifier,
            switch_state: false,
            acquired: false,
        })
    }

    /// Current state of a zone.
    #[must_use]
    pub fn zone_state(&self, id: &ZoneId) -> Option<ZoneState> {
        self.zones
            .iter()
            .find(|slot| slot.zone.id == *id)
            .map(|slot| slot.state)
    }

    /// Last observed level of the manual switch.
    #[must_use]
    pub fn switch_state(&self) -> bool {
        self.switch_state
    }

    /// Acquire the driver, raise the ready line, drive every zone pin low and
    /// sample the manual switch.
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Driver`] if the driver cannot be acquired or
    /// a pin cannot be configured. On a configuration failure the driver is
    /// released again before returning.
    pub fn setup(&mut self) -> Result<(), LightshowError> {
        self.driver.acquire()?;
        self.acquired = true;

        if let Err(err) = self.configure_pins() {
            self.shutdown();
            return Err(err);
        }

        tracing::info!(
            zones = self.zones.len(),
            switch = self.switch_state,
            "outputs configured"
        );
        Ok(())
    }

    fn configure_pins(&mut self) -> Result<(), LightshowError> {
        if let Some(pin) = self.settings.ready_pin {
            self.driver.configure_output(pin)?;
            self.driver.set_output(pin, true)?;
        }
        if let Some(pin) = self.settings.switch_pin {
            self.driver.configure_input(pin)?;
            self.switch_state = self.driver.read_input(pin)?;
        }
        for slot in &self.zones {
            for &pin in &slot.zone.pins {
                self.driver.configure_output(pin)?;
                self.driver.set_output(pin, false)?;
            }
        }
        Ok(())
    }

    /// Set up the outputs and spawn the consumer loop on the current tokio
    /// runtime.
    ///
    /// Producers obtained from `queue` before this call keep working; events
    /// they pushed earlier are handled first.
    ///
    /// [`setup`](Self::setup) runs on the calling thread and a driver may
    /// block there (the sysfs driver waits for each exported pin to appear).
    /// On a multi-threaded runtime wrap the call in
    /// `tokio::task::block_in_place`.
    ///
    /// # Errors
    ///
    /// Returns the [`setup`](Self::setup) error; nothing is spawned then.
    pub fn start(mut self, queue: EventQueue) -> Result<ControllerHandle, LightshowError>
    where
        D: 'static,
        R: 'static,
        N: 'static,
    {
        self.setup()?;
        let (sender, receiver) = queue.split();
        let task = tokio::spawn(self.run(receiver));
        Ok(ControllerHandle { sender, task })
    }

    /// Consume events until [`ControlEvent::Exit`] or until every producer is
    /// gone, then shut the outputs down.
    ///
    /// A failure while handling one event is logged and the loop moves on.
    pub async fn run(mut self, mut events: EventReceiver) {
        tracing::debug!("starting control loop");
        notify(
            &self.notifier,
            Notification::new(NOTIFICATION_TITLE, "Controller started"),
        )
        .await;

        loop {
            let Some(event) = events.pop().await else {
                tracing::warn!("event queue closed");
                break;
            };
            if event == ControlEvent::Exit {
                tracing::info!("exit requested");
                break;
            }

            tracing::debug!(%event, "handling event");
            if let Err(err) = self.dispatch(&event).await {
                tracing::error!(%event, error = ?err, "unable to process event");
            }
        }

        self.shutdown();
    }

    /// Handle a single event to completion.
    ///
    /// [`ControlEvent::Exit`] is a no-op here; the loop in [`run`](Self::run)
    /// stops on it.
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::NotFound`] for an unknown zone and
    /// [`LightshowError::Driver`] when an output cannot be switched or the
    /// switch cannot be read.
    pub async fn dispatch(&mut self, event: &ControlEvent) -> Result<(), LightshowError> {
        match event {
            ControlEvent::On(zone) => {
                let idx = self.index_of(zone)?;
                self.transition(idx, ZoneState::On).await.map(|_| ())
            }
            ControlEvent::Off(zone) => {
                let idx = self.index_of(zone)?;
                self.transition(idx, ZoneState::Off).await.map(|_| ())
            }
            ControlEvent::Poll => self.poll_switch().await,
            ControlEvent::Exit => Ok(()),
        }
    }

    fn index_of(&self, id: &ZoneId) -> Result<usize, LightshowError> {
        self.zones
            .iter()
            .position(|slot| slot.zone.id == *id)
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Zone",
                    id: id.to_string(),
                }
                .into()
            })
    }

    /// The manual switch is a global toggle: any change of level inverts
    /// every zone.
    async fn poll_switch(&mut self) -> Result<(), LightshowError> {
        let Some(pin) = self.settings.switch_pin else {
            return Ok(());
        };
        let switch = self.driver.read_input(pin)?;
        if switch == self.switch_state {
            return Ok(());
        }

        tracing::info!(switch, "manual switch flipped");
        self.switch_state = switch;

        for idx in 0..self.zones.len() {
            let target = self.zones[idx].state.inverted();
            if let Err(err) = self.transition(idx, target).await {
                tracing::error!(
                    zone = %self.zones[idx].zone.id,
                    error = ?err,
                    "unable to toggle zone"
                );
            }
        }
        Ok(())
    }

    /// Move zone `idx` to `target`. Returns `false` when it already was there.
    ///
    /// The zone is marked as `target` before any pin is touched, so a failing
    /// pin leaves the earlier pins switched and the zone in its new state.
    async fn transition(&mut self, idx: usize, target: ZoneState) -> Result<bool, LightshowError> {
        let slot = &mut self.zones[idx];
        if slot.state == target {
            tracing::debug!(zone = %slot.zone.id, state = %target, "zone unchanged");
            return Ok(false);
        }
        slot.state = target;

        match target {
            ZoneState::On => {
                for &pin in &self.zones[idx].zone.pins {
                    tracing::debug!(%pin, "pin on");
                    self.driver.set_output(pin, true)?;
                    tokio::time::sleep(self.settings.on_delay).await;
                }
            }
            ZoneState::Off => {
                for &pin in &self.zones[idx].zone.pins {
                    tracing::debug!(%pin, "pin off");
                    self.driver.set_output(pin, false)?;
                }
            }
        }

        let zone = &self.zones[idx].zone;
        tracing::info!(zone = %zone.id, state = %target, "zone switched");

        if let Err(err) = self.reporter.report(&zone.id, target).await {
            tracing::warn!(zone = %zone.id, error = ?err, "unable to report zone state");
        }
        notify(
            &self.notifier,
            Notification::zone_changed(&zone.friendly_name, target),
        )
        .await;

        Ok(true)
    }
}

async fn notify<N: Notifier>(notifier: &N, notification: Notification) {
    if let Err(err) = notifier.send(notification).await {
        tracing::warn!(error = ?err, "unable to send notification");
    }
}

impl<D: OutputDriver, R, N> ZoneController<D, R, N> {
    /// Force every zone pin low, drop the ready line and release the driver.
    ///
    /// Runs at most once per successful [`setup`](ZoneController::setup);
    /// later calls do nothing. Errors are logged, not returned, so that every
    /// pin gets its chance to be switched off.
    pub fn shutdown(&mut self) {
        if !self.acquired {
            return;
        }
        self.acquired = false;

        for slot in &mut self.zones {
            for &pin in &slot.zone.pins {
                if let Err(err) = self.driver.set_output(pin, false) {
                    tracing::error!(%pin, error = ?err, "unable to switch pin off");
                }
            }
            slot.state = ZoneState::Off;
        }
        if let Some(pin) = self.settings.ready_pin
            && let Err(err) = self.driver.set_output(pin, false)
        {
            tracing::error!(%pin, error = ?err, "unable to lower ready line");
        }
        if let Err(err) = self.driver.release() {
            tracing::error!(error = ?err, "unable to release output driver");
        }
        tracing::info!("outputs released");
    }
}

impl<D: OutputDriver, R, N> Drop for ZoneController<D, R, N> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Handle on a running controller loop.
pub struct ControllerHandle {
    sender: EventSender,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// A producer for the controller's queue.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Push [`ControlEvent::Exit`] and wait for the loop to drain the events
    /// queued before it and shut the outputs down.
    ///
    /// # Errors
    ///
    /// Returns [`LightshowError::Task`] if the loop panicked. The outputs are
    /// released in that case too, when the controller is dropped.
    pub async fn stop(self) -> Result<(), LightshowError> {
        self.sender.push(ControlEvent::Exit);
        self.task
            .await
            .map_err(|err| LightshowError::Task(Box::new(err)))
    }
}
