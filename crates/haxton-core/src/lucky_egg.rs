//! Lucky egg (experience boost) activation.
//!
//! An egg stays active for a fixed window after use. Before each
//! evolution pass the bot may try to activate one; the attempt is gated on
//! the window having elapsed since the last recorded activation and on at
//! least one egg being held.
//!
//! The activation time is only written when
//! [`LuckyEggSettings::record_activation`] is set. Without it the gate
//! never closes and the held count is the only thing stopping a new egg
//! every pass. That historical behavior is kept as the default and logged
//! as a known defect on first use.
//!
//! [`LuckyEggSettings::record_activation`]: crate::settings::LuckyEggSettings::record_activation

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use haxton_types::ItemKind;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::client::Inventory;
use crate::error::BotError;
use crate::settings::Settings;

/// What an activation attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuckyEggOutcome {
    /// An egg was consumed. `held` is the count before use.
    Activated {
        /// Eggs held before this one was used.
        held: u32,
    },
    /// The window passed but no egg is held.
    NoneHeld,
    /// A previously activated egg is still in effect.
    StillActive,
}

/// Gate and state for lucky egg activation.
#[derive(Debug)]
pub struct LuckyEgg {
    /// Last recorded activation; `None` means never used.
    last_used: Mutex<Option<Instant>>,
    window: Duration,
    settle: Duration,
    record_activation: bool,
    defect_logged: AtomicBool,
}

impl LuckyEgg {
    /// Create a gate that has never been used.
    pub fn new(window: Duration, settle: Duration, record_activation: bool) -> Self {
        Self {
            last_used: Mutex::new(None),
            window,
            settle,
            record_activation,
            defect_logged: AtomicBool::new(false),
        }
    }

    /// Create a gate from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.timings.lucky_egg_window(),
            settings.timings.lucky_egg_settle(),
            settings.lucky_egg.record_activation,
        )
    }

    /// When an egg was last recorded as activated.
    pub async fn last_used(&self) -> Option<Instant> {
        *self.last_used.lock().await
    }

    /// Activate an egg if the window has elapsed and one is held.
    ///
    /// On activation this waits the settle delay before returning.
    pub async fn try_activate<I: Inventory>(
        &self,
        inventory: &I,
    ) -> Result<LuckyEggOutcome, BotError> {
        let mut last_used = self.last_used.lock().await;
        let window_elapsed = last_used.is_none_or(|at| at.elapsed() > self.window);
        if !window_elapsed {
            info!("Lucky egg not used. Still have one in effect.");
            return Ok(LuckyEggOutcome::StillActive);
        }

        let items = inventory.items().await?;
        let held = items
            .iter()
            .find(|stack| stack.kind == ItemKind::LuckyEgg)
            .map_or(0, |stack| stack.count);
        if held == 0 {
            return Ok(LuckyEggOutcome::NoneHeld);
        }

        info!(remaining = held, "Lucky egg used.");
        inventory.use_lucky_egg().await?;

        if self.record_activation {
            *last_used = Some(Instant::now());
        } else if !self.defect_logged.swap(true, Ordering::AcqRel) {
            warn!(
                "lucky egg activation time is not recorded (lucky_egg.record_activation = false); \
                 eggs are gated only by the held count"
            );
        }
        drop(last_used);

        tokio::time::sleep(self.settle).await;
        Ok(LuckyEggOutcome::Activated { held })
    }
}
