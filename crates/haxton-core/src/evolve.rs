//! Evolution loop.
//!
//! Each pass optionally activates a lucky egg first, then asks the
//! inventory for evolvable creatures in the allow-list and fires one
//! supervised evolve unit per creature. The loop does not wait for those
//! units; it pauses for the pass interval and goes again.

use std::sync::Arc;

use tracing::info;

use crate::client::Inventory;
use crate::control::LoopControls;
use crate::error::BotError;
use crate::lucky_egg::LuckyEgg;
use crate::settings::Settings;
use crate::supervisor::{TaskKind, TaskSupervisor};

/// Run one evolution pass. Returns how many evolve units were spawned.
pub async fn evolve_pass<I: Inventory>(
    inventory: &Arc<I>,
    settings: &Settings,
    lucky_egg: &LuckyEgg,
    supervisor: &TaskSupervisor,
) -> Result<usize, BotError> {
    if settings.evolve.use_lucky_eggs_while_evolving {
        info!("Using lucky egg.");
        lucky_egg.try_activate(inventory.as_ref()).await?;
    }

    let candidates = inventory
        .creatures_to_evolve(&settings.evolve.to_evolve, settings.evolve.min_iv())
        .await?;
    let spawned = candidates.len();
    for creature in candidates {
        info!(species = %creature.species, cp = creature.cp, "Evolving pokemon");
        let inventory = Arc::clone(inventory);
        let id = creature.id;
        supervisor.spawn(TaskKind::Evolve, id.to_string(), async move {
            inventory.evolve(id).await.map_err(BotError::from)
        });
    }
    Ok(spawned)
}

/// Run evolution passes while the evolve flag is set.
pub async fn run_evolve_loop<I: Inventory>(
    inventory: Arc<I>,
    settings: Arc<Settings>,
    controls: Arc<LoopControls>,
    lucky_egg: Arc<LuckyEgg>,
    supervisor: TaskSupervisor,
) -> Result<(), BotError> {
    while controls.evolve_enabled() {
        evolve_pass(&inventory, &settings, &lucky_egg, &supervisor).await?;
        tokio::time::sleep(settings.timings.evolve_pass()).await;
    }
    info!("Evolve loop stopped");
    Ok(())
}
