//! Periodic poller — pushes one [`ControlEvent::Poll`] per tick.
//!
//! Ticks are queued like any other event: there is no catch-up and no
//! coalescing when the controller falls behind.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use lightshow_domain::event::ControlEvent;

use crate::event_queue::EventSender;

/// Default poll period for the manual switch.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A running poll timer.
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the timer. The first poll is pushed one `period` from now.
    #[must_use]
    pub fn start(sender: EventSender, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                sender.push(ControlEvent::Poll);
            }
        });
        tracing::debug!(period_ms = period.as_millis(), "poller started");
        Self { handle }
    }

    /// Stop pushing polls.
    pub fn stop(self) {
        self.handle.abort();
        tracing::debug!("poller stopped");
    }
}
