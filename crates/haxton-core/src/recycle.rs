//! Item recycling loop.
//!
//! Each pass asks the inventory which stacks exceed the configured keep
//! limits and fires one supervised unit per stack that discards it and
//! then pauses briefly. The loop itself does not wait for those units.

use std::sync::Arc;

use tracing::info;

use crate::client::Inventory;
use crate::control::LoopControls;
use crate::error::BotError;
use crate::settings::Settings;
use crate::supervisor::{TaskKind, TaskSupervisor};

/// Run one recycling pass. Returns how many discard units were spawned.
pub async fn recycle_pass<I: Inventory>(
    inventory: &Arc<I>,
    settings: &Settings,
    supervisor: &TaskSupervisor,
) -> Result<usize, BotError> {
    let stacks = inventory.items_to_recycle(&settings.recycle.rules).await?;
    let spawned = stacks.len();
    let pause = settings.timings.recycle_item_delay();
    for stack in stacks {
        let inventory = Arc::clone(inventory);
        supervisor.spawn(TaskKind::Recycle, stack.kind.to_string(), async move {
            info!(item = %stack.kind, count = stack.count, "Recycling item(s)");
            inventory.recycle(stack.kind, stack.count).await?;
            tokio::time::sleep(pause).await;
            Ok::<(), BotError>(())
        });
    }
    Ok(spawned)
}

/// Run recycling passes while the recycle flag is set.
pub async fn run_recycle_loop<I: Inventory>(
    inventory: Arc<I>,
    settings: Arc<Settings>,
    controls: Arc<LoopControls>,
    supervisor: TaskSupervisor,
) -> Result<(), BotError> {
    while controls.recycle_enabled() {
        recycle_pass(&inventory, &settings, &supervisor).await?;
        tokio::time::sleep(settings.timings.recycle_pass()).await;
    }
    info!("Recycle loop stopped");
    Ok(())
}
