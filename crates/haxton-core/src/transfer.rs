//! Duplicate transfer loop.
//!
//! Which creatures count as duplicates is the inventory's decision; this
//! loop only applies the keep floors on top and releases the rest, one at
//! a time. Releases are irreversible and independent: a failure midway
//! leaves earlier releases in place and ends the loop.

use std::sync::Arc;

use haxton_types::OwnedCreature;
use tracing::info;

use crate::client::Inventory;
use crate::control::LoopControls;
use crate::error::BotError;
use crate::settings::{Settings, TransferSettings};

/// Whether a duplicate is kept despite being offered for transfer.
///
/// Kept when its CP meets the floor or its IV exceeds the floor.
pub fn should_keep(creature: &OwnedCreature, settings: &TransferSettings) -> bool {
    creature.cp >= settings.keep_min_cp
        || creature.perfection() > settings.keep_min_iv_percentage
}

/// Run one transfer pass. Returns how many creatures were released.
pub async fn transfer_pass<I: Inventory>(
    inventory: &I,
    settings: &TransferSettings,
) -> Result<usize, BotError> {
    let duplicates = inventory
        .duplicates_for_transfer(
            settings.keep_creatures_that_can_evolve,
            settings.prioritize_iv_over_cp,
            &settings.not_to_transfer,
        )
        .await?;

    let mut released: usize = 0;
    for creature in duplicates {
        if should_keep(&creature, settings) {
            continue;
        }
        info!(
            species = %creature.species,
            cp = creature.cp,
            iv = creature.perfection(),
            "Transferring pokemon"
        );
        inventory.transfer(creature.id).await?;
        released = released.saturating_add(1);
    }
    Ok(released)
}

/// Run transfer passes while the transfer flag is set.
pub async fn run_transfer_loop<I: Inventory>(
    inventory: Arc<I>,
    settings: Arc<Settings>,
    controls: Arc<LoopControls>,
) -> Result<(), BotError> {
    while controls.transfer_enabled() {
        transfer_pass(inventory.as_ref(), &settings.transfer).await?;
        tokio::time::sleep(settings.timings.transfer_pass()).await;
    }
    info!("Transfer loop stopped");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use haxton_types::{CreatureId, Species};

    use super::*;
    use crate::testkit::{Call, FakeClient, creature};

    fn floors(cp: u32, iv: f64) -> TransferSettings {
        TransferSettings {
            enabled: true,
            keep_min_cp: cp,
            keep_min_iv_percentage: iv,
            ..TransferSettings::default()
        }
    }

    #[test]
    fn keep_when_cp_meets_floor() {
        let settings = floors(500, 90.0);
        assert!(should_keep(&creature(1, "pidgey", 500, (0, 0, 0)), &settings));
        assert!(!should_keep(&creature(1, "pidgey", 499, (0, 0, 0)), &settings));
    }

    #[test]
    fn keep_only_when_iv_strictly_exceeds_floor() {
        // 15+15+15 = 100%; 15+15+9 = 86.67%.
        let settings = floors(10_000, 86.0);
        assert!(should_keep(&creature(1, "pidgey", 10, (15, 15, 15)), &settings));
        assert!(should_keep(&creature(1, "pidgey", 10, (15, 15, 9)), &settings));
        let at_floor = floors(10_000, 100.0);
        assert!(!should_keep(&creature(1, "pidgey", 10, (15, 15, 15)), &at_floor));
    }

    #[tokio::test]
    async fn releases_only_creatures_below_both_floors() {
        let client = FakeClient::new();
        client.set_duplicates(vec![
            creature(1, "pidgey", 1300, (0, 0, 0)),
            creature(2, "pidgey", 100, (15, 15, 15)),
            creature(3, "pidgey", 100, (1, 1, 1)),
            creature(4, "rattata", 1249, (10, 10, 10)),
        ]);
        let mut settings = floors(1250, 95.0);
        settings.not_to_transfer = vec![Species::new("dragonite")];
        settings.prioritize_iv_over_cp = true;

        let released = transfer_pass(&client, &settings).await.unwrap();
        assert_eq!(released, 2);
        assert_eq!(
            client.calls(),
            vec![
                Call::Duplicates {
                    keep_evolvable: false,
                    prioritize_iv: true,
                    protected: vec![Species::new("dragonite")],
                },
                Call::Transfer(CreatureId(3)),
                Call::Transfer(CreatureId(4)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn loop_repeats_every_pass_until_disabled() {
        let client = Arc::new(FakeClient::new());
        let controls = Arc::new(LoopControls::new(false, false, true));
        let handle = tokio::spawn(run_transfer_loop(
            Arc::clone(&client),
            Arc::new(Settings::default()),
            Arc::clone(&controls),
        ));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(client.count_calls(|c| matches!(c, Call::Duplicates { .. })), 1);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(client.count_calls(|c| matches!(c, Call::Duplicates { .. })), 2);

        controls.set_transfer_enabled(false);
        handle.await.unwrap().unwrap();
        assert_eq!(client.count_calls(|c| matches!(c, Call::Duplicates { .. })), 2);
    }

    #[tokio::test]
    async fn disabled_loop_never_runs() {
        let client = Arc::new(FakeClient::new());
        let controls = Arc::new(LoopControls::new(false, false, false));
        run_transfer_loop(Arc::clone(&client), Arc::new(Settings::default()), controls)
            .await
            .unwrap();
        assert!(client.calls().is_empty());
    }
}
