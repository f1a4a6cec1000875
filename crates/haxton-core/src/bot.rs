//! The bot orchestrator.
//!
//! [`Bot`] owns the shared client, settings, loop toggles, lucky egg gate
//! and supervisor, and starts the four independent loops: recycling,
//! evolution, transfer and fort farming (which catches as it walks).
//! Loops never coordinate with each other beyond sharing the client; any
//! ordering between, say, a transfer and an evolve of the same creature
//! is up to the client.

use std::sync::Arc;

use tracing::info;

use crate::capture::CaptureRoutine;
use crate::client::GameClient;
use crate::control::LoopControls;
use crate::evolve::run_evolve_loop;
use crate::farm::run_farm_loop;
use crate::lucky_egg::LuckyEgg;
use crate::recycle::run_recycle_loop;
use crate::settings::Settings;
use crate::supervisor::{TaskHandle, TaskKind, TaskSupervisor};
use crate::transfer::run_transfer_loop;

/// Handles to the four loops started by [`Bot::start`].
///
/// Dropping this does not stop anything.
#[derive(Debug)]
pub struct BotTasks {
    /// Item recycling loop.
    pub recycle: TaskHandle,
    /// Evolution loop.
    pub evolve: TaskHandle,
    /// Duplicate transfer loop.
    pub transfer: TaskHandle,
    /// Fort farming loop.
    pub farm: TaskHandle,
}

impl BotTasks {
    /// Abort every loop. Units already spawned by the loops keep running.
    pub fn abort_all(&self) {
        self.recycle.abort();
        self.evolve.abort();
        self.transfer.abort();
        self.farm.abort();
    }
}

/// Automation bot over a game client.
#[derive(Debug)]
pub struct Bot<C> {
    client: Arc<C>,
    settings: Arc<Settings>,
    controls: Arc<LoopControls>,
    lucky_egg: Arc<LuckyEgg>,
    supervisor: TaskSupervisor,
}

impl<C: GameClient> Bot<C> {
    /// Create a bot. Loop toggles start from `settings`.
    pub fn new(client: Arc<C>, settings: Settings, supervisor: TaskSupervisor) -> Self {
        let controls = Arc::new(LoopControls::from_settings(&settings));
        let lucky_egg = Arc::new(LuckyEgg::from_settings(&settings));
        Self {
            client,
            settings: Arc::new(settings),
            controls,
            lucky_egg,
            supervisor,
        }
    }

    /// Runtime toggles for the recycling, evolution and transfer loops.
    pub const fn controls(&self) -> &Arc<LoopControls> {
        &self.controls
    }

    /// The settings the bot was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The lucky egg gate shared by evolution passes.
    pub const fn lucky_egg(&self) -> &Arc<LuckyEgg> {
        &self.lucky_egg
    }

    /// Start all loops. Must be called from within a Tokio runtime.
    ///
    /// Calling this again starts a second set of loops over the same
    /// client and toggles.
    pub fn start(&self) -> BotTasks {
        info!(
            recycle = self.controls.recycle_enabled(),
            evolve = self.controls.evolve_enabled(),
            transfer = self.controls.transfer_enabled(),
            "Starting bot."
        );

        let recycle = self.supervisor.spawn(
            TaskKind::RecycleLoop,
            "recycle",
            run_recycle_loop(
                Arc::clone(&self.client),
                Arc::clone(&self.settings),
                Arc::clone(&self.controls),
                self.supervisor.clone(),
            ),
        );
        let evolve = self.supervisor.spawn(
            TaskKind::EvolveLoop,
            "evolve",
            run_evolve_loop(
                Arc::clone(&self.client),
                Arc::clone(&self.settings),
                Arc::clone(&self.controls),
                Arc::clone(&self.lucky_egg),
                self.supervisor.clone(),
            ),
        );
        let transfer = self.supervisor.spawn(
            TaskKind::TransferLoop,
            "transfer",
            run_transfer_loop(
                Arc::clone(&self.client),
                Arc::clone(&self.settings),
                Arc::clone(&self.controls),
            ),
        );
        let capture = CaptureRoutine::new(
            Arc::clone(&self.client),
            Arc::clone(&self.settings),
            self.supervisor.clone(),
        );
        let farm = self.supervisor.spawn(
            TaskKind::FarmLoop,
            "farm",
            run_farm_loop(Arc::clone(&self.client), Arc::clone(&self.settings), capture),
        );

        BotTasks {
            recycle,
            evolve,
            transfer,
            farm,
        }
    }
}
