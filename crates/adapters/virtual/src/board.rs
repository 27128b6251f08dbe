//! Simulated GPIO board shared between the driver and its observers.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use lightshow_domain::id::PinId;

use crate::error::VirtualError;

/// One recorded output write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    pub pin: PinId,
    pub active: bool,
    /// Time of the write on the tokio clock (honours paused test time).
    pub at: Instant,
}

#[derive(Default)]
struct BoardState {
    unavailable: bool,
    acquired: bool,
    outputs: HashSet<PinId>,
    inputs: HashSet<PinId>,
    levels: HashMap<PinId, bool>,
    input_levels: HashMap<PinId, bool>,
    faulty: HashSet<PinId>,
    writes: Vec<PinWrite>,
    releases: usize,
}

/// Cloneable handle on the simulated board.
#[derive(Clone, Default)]
pub struct VirtualBoard {
    state: Arc<Mutex<BoardState>>,
}

impl VirtualBoard {
    /// Every output write since creation (or the last [`clear_writes`](Self::clear_writes)).
    #[must_use]
    pub fn writes(&self) -> Vec<PinWrite> {
        self.lock().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    /// Current level of an output pin, `None` if it was never written.
    #[must_use]
    pub fn level(&self, pin: PinId) -> Option<bool> {
        self.lock().levels.get(&pin).copied()
    }

    /// Simulate an input level, e.g. flipping the manual switch.
    pub fn set_input(&self, pin: PinId, level: bool) {
        self.lock().input_levels.insert(pin, level);
    }

    /// Make every later write to `pin` fail.
    pub fn fail_pin(&self, pin: PinId) {
        self.lock().faulty.insert(pin);
    }

    /// Make the next `acquire` fail.
    pub fn set_unavailable(&self) {
        self.lock().unavailable = true;
    }

    #[must_use]
    pub fn is_acquired(&self) -> bool {
        self.lock().acquired
    }

    /// How many times the board was released.
    #[must_use]
    pub fn release_count(&self) -> usize {
        self.lock().releases
    }

    pub(crate) fn acquire(&self) -> Result<(), VirtualError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(VirtualError::Unavailable);
        }
        state.acquired = true;
        Ok(())
    }

    pub(crate) fn configure(&self, pin: PinId, output: bool) -> Result<(), VirtualError> {
        let mut state = self.lock();
        if !state.acquired {
            return Err(VirtualError::NotAcquired);
        }
        if output {
            state.inputs.remove(&pin);
            state.outputs.insert(pin);
        } else {
            state.outputs.remove(&pin);
            state.inputs.insert(pin);
        }
        Ok(())
    }

    pub(crate) fn write(&self, pin: PinId, active: bool) -> Result<(), VirtualError> {
        let mut state = self.lock();
        if !state.acquired {
            return Err(VirtualError::NotAcquired);
        }
        if !state.outputs.contains(&pin) {
            return Err(VirtualError::WrongDirection {
                pin,
                direction: "output",
            });
        }
        if state.faulty.contains(&pin) {
            return Err(VirtualError::Faulty(pin));
        }
        state.levels.insert(pin, active);
        state.writes.push(PinWrite {
            pin,
            active,
            at: Instant::now(),
        });
        Ok(())
    }

    pub(crate) fn read(&self, pin: PinId) -> Result<bool, VirtualError> {
        let state = self.lock();
        if !state.acquired {
            return Err(VirtualError::NotAcquired);
        }
        if !state.inputs.contains(&pin) {
            return Err(VirtualError::WrongDirection {
                pin,
                direction: "input",
            });
        }
        Ok(state.input_levels.get(&pin).copied().unwrap_or(false))
    }

    pub(crate) fn release(&self) {
        let mut state = self.lock();
        state.acquired = false;
        state.outputs.clear();
        state.inputs.clear();
        state.releases += 1;
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
