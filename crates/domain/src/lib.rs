//! # lightshow-domain
//!
//! Pure domain model for the lightshow garden light controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers and error conventions
//! - Define **Zones** (named groups of relay outputs switched together)
//! - Define **Control events** (the messages serialised through the controller queue)
//! - Define **Shadow states** (desired/reported on-off values exchanged with the cloud)
//! - Define **Notifications** (best-effort human-readable alerts)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod event;
pub mod notification;
pub mod shadow;
pub mod zone;
