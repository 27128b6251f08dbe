//! # lightshow-adapter-virtual
//!
//! Virtual output driver that keeps relay levels in memory.
//!
//! Used when the daemon runs without GPIO hardware (`gpio.driver = "virtual"`)
//! and by tests, which inspect the shared [`VirtualBoard`] after the driver
//! has been moved into the controller.
//!
//! | Pin kind | Behaviour |
//! |----------|-----------|
//! | Output | Every write is recorded with a timestamp |
//! | Input | Reads `false` until [`VirtualBoard::set_input`] says otherwise |
//!
//! ## Dependency rule
//!
//! Depends on `lightshow-app` (port traits) and `lightshow-domain` only.

mod board;
mod error;

pub use board::{PinWrite, VirtualBoard};
pub use error::VirtualError;

use lightshow_app::ports::OutputDriver;
use lightshow_domain::error::LightshowError;
use lightshow_domain::id::PinId;

/// In-memory [`OutputDriver`].
#[derive(Default)]
pub struct VirtualOutputDriver {
    board: VirtualBoard,
}

impl VirtualOutputDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle on the simulated board, shared with this driver.
    #[must_use]
    pub fn board(&self) -> VirtualBoard {
        self.board.clone()
    }
}

impl OutputDriver for VirtualOutputDriver {
    fn acquire(&mut self) -> Result<(), LightshowError> {
        self.board.acquire()?;
        tracing::info!("virtual output driver acquired");
        Ok(())
    }

    fn configure_output(&mut self, pin: PinId) -> Result<(), LightshowError> {
        Ok(self.board.configure(pin, true)?)
    }

    fn configure_input(&mut self, pin: PinId) -> Result<(), LightshowError> {
        Ok(self.board.configure(pin, false)?)
    }

    fn set_output(&mut self, pin: PinId, active: bool) -> Result<(), LightshowError> {
        self.board.write(pin, active)?;
        tracing::debug!(%pin, active, "virtual pin written");
        Ok(())
    }

    fn read_input(&self, pin: PinId) -> Result<bool, LightshowError> {
        Ok(self.board.read(pin)?)
    }

    fn release(&mut self) -> Result<(), LightshowError> {
        self.board.release();
        tracing::info!("virtual output driver released");
        Ok(())
    }
}
