//! Runtime toggles for the optional loops.
//!
//! Recycling, evolution and transfer can each be switched off (or back on
//! before the loop exits) while the bot runs. Farming and catching are
//! always active. Flags are read only at the top of each loop iteration:
//! work already in flight is never interrupted, and a loop that has seen
//! its flag cleared exits for good.
//!
//! All flags are atomics shared through an [`Arc`](std::sync::Arc), so
//! the loops and any controlling task read them without locks.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::settings::Settings;

/// Per-loop enabled flags.
#[derive(Debug, Default)]
pub struct LoopControls {
    recycle: AtomicBool,
    evolve: AtomicBool,
    transfer: AtomicBool,
}

impl LoopControls {
    /// Create controls with explicit initial values.
    pub const fn new(recycle: bool, evolve: bool, transfer: bool) -> Self {
        Self {
            recycle: AtomicBool::new(recycle),
            evolve: AtomicBool::new(evolve),
            transfer: AtomicBool::new(transfer),
        }
    }

    /// Create controls initialized from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.recycle_initially_enabled(),
            settings.evolve_initially_enabled(),
            settings.transfer_initially_enabled(),
        )
    }

    /// Whether the recycling loop should run another pass.
    pub fn recycle_enabled(&self) -> bool {
        self.recycle.load(Ordering::Acquire)
    }

    /// Enable or disable the recycling loop.
    pub fn set_recycle_enabled(&self, enabled: bool) {
        self.recycle.store(enabled, Ordering::Release);
    }

    /// Whether the evolution loop should run another pass.
    pub fn evolve_enabled(&self) -> bool {
        self.evolve.load(Ordering::Acquire)
    }

    /// Enable or disable the evolution loop.
    pub fn set_evolve_enabled(&self, enabled: bool) {
        self.evolve.store(enabled, Ordering::Release);
    }

    /// Whether the transfer loop should run another pass.
    pub fn transfer_enabled(&self) -> bool {
        self.transfer.load(Ordering::Acquire)
    }

    /// Enable or disable the transfer loop.
    pub fn set_transfer_enabled(&self, enabled: bool) {
        self.transfer.store(enabled, Ordering::Release);
    }
}
