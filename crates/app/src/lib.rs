//! # lightshow-app
//!
//! Application layer — the zone controller and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `OutputDriver` — drive relay outputs and read the manual switch
//!   - `StateReporter` — publish a zone's reported state to its shadow
//!   - `DesiredStateSource` — request a zone's current desired state
//!   - `Notifier` — best-effort push notifications
//! - Provide the **event queue** every producer pushes into
//! - Run the **zone controller**: the single consumer that owns zone state
//! - Translate shadow documents into control events (`ShadowBridge`)
//! - Drive the manual switch poll (`Poller`)
//!
//! ## Dependency rule
//! Depends on `lightshow-domain` only (plus `tokio` for channels, tasks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod controller;
pub mod event_queue;
pub mod poller;
pub mod ports;
pub mod shadow_bridge;
