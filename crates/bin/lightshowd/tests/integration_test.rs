//! End-to-end tests for the wired controller stack.
//!
//! Each test runs the real controller loop on the virtual output driver,
//! with in-memory reporter and notifier, under paused tokio time.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use lightshow_adapter_virtual::{VirtualBoard, VirtualOutputDriver};
use lightshow_app::controller::{ControllerHandle, ControllerSettings, ZoneController};
use lightshow_app::event_queue::{EventQueue, EventSender};
use lightshow_app::poller::Poller;
use lightshow_app::ports::{Notifier, StateReporter};
use lightshow_app::shadow_bridge::ShadowBridge;
use lightshow_domain::error::LightshowError;
use lightshow_domain::event::ControlEvent;
use lightshow_domain::id::{PinId, ZoneId};
use lightshow_domain::notification::Notification;
use lightshow_domain::zone::{Zone, ZoneState};

const SWITCH: PinId = PinId::new(17);
const READY: PinId = PinId::new(23);

#[derive(Default)]
struct RecordingReporter(Mutex<Vec<(ZoneId, ZoneState)>>);

impl RecordingReporter {
    fn reports(&self) -> Vec<(ZoneId, ZoneState)> {
        self.0.lock().unwrap().clone()
    }
}

impl StateReporter for RecordingReporter {
    fn report(
        &self,
        zone: &ZoneId,
        state: ZoneState,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send {
        self.0.lock().unwrap().push((zone.clone(), state));
        async { Ok(()) }
    }
}

#[derive(Default)]
struct RecordingNotifier(Mutex<Vec<Notification>>);

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|n| format!("{}: {}", n.title, n.message))
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn send(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), LightshowError>> + Send {
        self.0.lock().unwrap().push(notification);
        async { Ok(()) }
    }
}

struct Stack {
    board: VirtualBoard,
    reporter: Arc<RecordingReporter>,
    notifier: Arc<RecordingNotifier>,
    sender: EventSender,
    handle: ControllerHandle,
}

fn zone(id: &str, name: &str, pins: &[u8]) -> Zone {
    Zone::builder()
        .id(id)
        .friendly_name(name)
        .pins(pins.iter().copied())
        .build()
        .unwrap()
}

/// Zones `a` on pin 1 and `b` on pins 2 and 3; setup writes are cleared.
fn start() -> Stack {
    let driver = VirtualOutputDriver::new();
    let board = driver.board();
    let reporter = Arc::new(RecordingReporter::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let settings = ControllerSettings {
        ready_pin: Some(READY),
        switch_pin: Some(SWITCH),
        on_delay: Duration::from_secs(1),
    };

    let controller = ZoneController::new(
        vec![zone("a", "Zone A", &[1]), zone("b", "Zone B", &[2, 3])],
        settings,
        driver,
        Arc::clone(&reporter),
        Arc::clone(&notifier),
    )
    .unwrap();
    let queue = EventQueue::new();
    let sender = queue.sender();
    let handle = controller.start(queue).unwrap();
    board.clear_writes();

    Stack {
        board,
        reporter,
        notifier,
        sender,
        handle,
    }
}

fn writes(board: &VirtualBoard) -> Vec<(u8, bool)> {
    board
        .writes()
        .iter()
        .map(|w| (w.pin.number(), w.active))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn should_switch_zone_on_and_off_then_release_outputs() {
    let stack = start();
    let a = ZoneId::new("a");

    stack.sender.push(ControlEvent::On(a.clone()));
    stack.sender.push(ControlEvent::Poll);
    stack.sender.push(ControlEvent::Off(a.clone()));
    stack.handle.stop().await.unwrap();

    assert_eq!(
        writes(&stack.board),
        vec![
            (1, true),
            (1, false),
            // exit
            (1, false),
            (2, false),
            (3, false),
            (23, false),
        ]
    );
    assert_eq!(
        stack.reporter.reports(),
        vec![(a.clone(), ZoneState::On), (a, ZoneState::Off)]
    );
    assert_eq!(
        stack.notifier.messages(),
        vec![
            "Lightshow: Controller started",
            "Zone A: Lights on!",
            "Zone A: Lights off!",
        ]
    );
    assert!(!stack.board.is_acquired());
    assert_eq!(stack.board.release_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn should_echo_delta_then_toggle_every_zone_on_switch_flip() {
    let stack = start();
    let a = ZoneId::new("a");
    let b = ZoneId::new("b");
    let bridge = ShadowBridge::new(Arc::clone(&stack.reporter), stack.sender.clone());

    let event = bridge
        .on_delta(&a, &json!({"version": 7, "state": {"state": "ON"}}))
        .await;
    assert_eq!(event, Some(ControlEvent::On(a.clone())));

    stack.board.set_input(SWITCH, true);
    stack.sender.push(ControlEvent::Poll);
    stack.handle.stop().await.unwrap();

    assert_eq!(
        stack.reporter.reports(),
        vec![
            (a.clone(), ZoneState::On), // echo
            (a.clone(), ZoneState::On),
            (a, ZoneState::Off),
            (b, ZoneState::On),
        ]
    );

    let writes = stack.board.writes();
    let pin2 = writes.iter().find(|w| w.pin == PinId::new(2) && w.active).unwrap();
    let pin3 = writes.iter().find(|w| w.pin == PinId::new(3) && w.active).unwrap();
    assert_eq!(pin3.at - pin2.at, Duration::from_secs(1));
    for pin in [1, 2, 3, 23] {
        assert_eq!(stack.board.level(PinId::new(pin)), Some(false));
    }
}

#[tokio::test(start_paused = true)]
async fn should_follow_switch_through_poller() {
    let stack = start();
    let started = Instant::now();
    let poller = Poller::start(stack.sender.clone(), Duration::from_secs(1));

    stack.board.set_input(SWITCH, true);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    poller.stop();
    stack.handle.stop().await.unwrap();

    assert_eq!(
        stack.reporter.reports(),
        vec![
            (ZoneId::new("a"), ZoneState::On),
            (ZoneId::new("b"), ZoneState::On),
        ]
    );
    let first_write = stack.board.writes()[0];
    assert_eq!(first_write.pin, PinId::new(1));
    assert_eq!(first_write.at - started, Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn should_keep_running_after_unknown_zone() {
    let stack = start();

    stack.sender.push(ControlEvent::On(ZoneId::new("pond")));
    stack.sender.push(ControlEvent::On(ZoneId::new("a")));
    stack.handle.stop().await.unwrap();

    assert_eq!(
        stack.reporter.reports(),
        vec![(ZoneId::new("a"), ZoneState::On)]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn should_start_from_blocking_section_on_multi_thread_runtime() {
    let driver = VirtualOutputDriver::new();
    let board = driver.board();
    let reporter = Arc::new(RecordingReporter::default());
    let controller = ZoneController::new(
        vec![zone("a", "Zone A", &[1])],
        ControllerSettings {
            ready_pin: Some(READY),
            switch_pin: None,
            on_delay: Duration::ZERO,
        },
        driver,
        Arc::clone(&reporter),
        Arc::new(RecordingNotifier::default()),
    )
    .unwrap();

    let handle = tokio::task::block_in_place(|| controller.start(EventQueue::new())).unwrap();
    assert_eq!(board.level(READY), Some(true));

    handle.sender().push(ControlEvent::On(ZoneId::new("a")));
    handle.stop().await.unwrap();

    assert_eq!(
        reporter.reports(),
        vec![(ZoneId::new("a"), ZoneState::On)]
    );
    assert_eq!(board.level(READY), Some(false));
}
