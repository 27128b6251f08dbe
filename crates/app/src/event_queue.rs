//! In-process control event queue backed by a tokio unbounded mpsc channel.
//!
//! Many producers (shadow callbacks, the poller, the shutdown path) push;
//! exactly one consumer (the zone controller loop) pops. Insertion order is
//! processing order: no priorities, no coalescing, no bound.

use tokio::sync::mpsc;

use lightshow_domain::event::ControlEvent;

/// The queue before it is handed to the controller.
///
/// Producers can be cloned off with [`sender`](Self::sender) at any time;
/// the receiving half is taken by [`ZoneController::start`](crate::controller::ZoneController::start).
pub struct EventQueue {
    sender: EventSender,
    receiver: EventReceiver,
}

impl Default for EventQueue {
    fn default() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sender: EventSender(tx),
            receiver: EventReceiver(rx),
        }
    }
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A producer handle for this queue.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Split into the producer and consumer halves.
    #[must_use]
    pub fn split(self) -> (EventSender, EventReceiver) {
        (self.sender, self.receiver)
    }
}

/// Producer half. Cheap to clone, usable from any task or thread.
#[derive(Clone)]
pub struct EventSender(mpsc::UnboundedSender<ControlEvent>);

impl EventSender {
    /// Append `event` to the tail of the queue.
    ///
    /// Never blocks and never fails: once the consumer is gone the event is
    /// dropped.
    pub fn push(&self, event: ControlEvent) {
        if let Err(mpsc::error::SendError(event)) = self.0.send(event) {
            tracing::trace!(%event, "controller stopped, event dropped");
        }
    }
}

/// Consumer half, owned by the controller loop.
pub struct EventReceiver(mpsc::UnboundedReceiver<ControlEvent>);

impl EventReceiver {
    /// Wait for the next event.
    ///
    /// Returns `None` once every producer has been dropped and the queue is
    /// drained.
    pub async fn pop(&mut self) -> Option<ControlEvent> {
        self.0.recv().await
    }
}
