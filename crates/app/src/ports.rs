//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the controller and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod notifier;
pub mod output;
pub mod remote_state;

pub use notifier::Notifier;
pub use output::OutputDriver;
pub use remote_state::{DesiredStateSource, StateReporter};
