//! Catching nearby creatures while walking.
//!
//! [`CaptureRoutine`] is the [`StepHook`] handed to the walker by the
//! farming loop. On every movement step it snapshots nearby sightings
//! (closest first) and schedules one supervised catch unit per sighting
//! whose species is not excluded. It returns as soon as scheduling is
//! done: units run independently of each other and of the walk, so the
//! bot may reach and claim the next fort while earlier catches are still
//! in flight.
//!
//! Each unit waits the throttle delay, encounters, captures on success,
//! warns on any status other than success or already-happened, and, unless
//! its sighting was the last of the snapshot, waits the inter-catch delay
//! before finishing. That trailing delay only holds the unit itself.

use std::sync::Arc;
use std::time::Duration;

use haxton_types::Sighting;
use tracing::{debug, info, warn};

use crate::client::{EncounterResolver, GameClient, StepHook};
use crate::error::BotError;
use crate::settings::Settings;
use crate::supervisor::{TaskKind, TaskSupervisor};

/// The walk-step hook that catches nearby creatures.
#[derive(Debug)]
pub struct CaptureRoutine<C> {
    client: Arc<C>,
    settings: Arc<Settings>,
    supervisor: TaskSupervisor,
}

impl<C> Clone for CaptureRoutine<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            settings: Arc::clone(&self.settings),
            supervisor: self.supervisor.clone(),
        }
    }
}

impl<C: GameClient> CaptureRoutine<C> {
    /// Create a routine over a shared client.
    pub const fn new(client: Arc<C>, settings: Arc<Settings>, supervisor: TaskSupervisor) -> Self {
        Self {
            client,
            settings,
            supervisor,
        }
    }

    /// Snapshot nearby sightings and schedule a catch unit for each one
    /// not excluded. Returns the number of units scheduled.
    ///
    /// The sighting fetch is bounded by `timings.nearby_fetch_timeout_ms`;
    /// a fetch that fails or times out is reported to the supervisor and
    /// schedules nothing.
    pub async fn catch_nearby(&self) -> usize {
        let bound = self.settings.timings.nearby_fetch_timeout();
        let fetched =
            tokio::time::timeout(bound, self.client.nearby_sightings_closest_first()).await;
        let sightings = match fetched {
            Ok(Ok(sightings)) => sightings,
            Ok(Err(error)) => {
                self.supervisor
                    .report(TaskKind::NearbyScan, "nearby", error.into());
                return 0;
            }
            Err(_elapsed) => {
                self.supervisor.report(
                    TaskKind::NearbyScan,
                    "nearby",
                    BotError::NearbyTimeout {
                        timeout_ms: u64::try_from(bound.as_millis()).unwrap_or(u64::MAX),
                    },
                );
                return 0;
            }
        };

        if !sightings.is_empty() {
            let names = sightings
                .iter()
                .map(|s| s.species.as_str())
                .collect::<Vec<_>>()
                .join(",");
            info!(count = sightings.len(), species = names, "Pokemon found");
        }

        let last_index = sightings.len().saturating_sub(1);
        let throttle = self.settings.timings.catch_throttle();
        let between = self.settings.catching.delay_between_catches();
        let mut scheduled: usize = 0;

        for (index, sighting) in sightings.into_iter().enumerate() {
            if self.settings.catching.excludes(&sighting.species) {
                debug!(species = %sighting.species, "Skipping excluded species");
                continue;
            }
            let trailing = (index != last_index).then_some(between);
            let label = sighting.species.to_string();
            let client = Arc::clone(&self.client);
            self.supervisor.spawn(
                TaskKind::Catch,
                label,
                attempt_catch(client, sighting, throttle, trailing),
            );
            scheduled = scheduled.saturating_add(1);
        }
        scheduled
    }
}

impl<C: GameClient> StepHook for CaptureRoutine<C> {
    async fn on_step(&self) {
        let _ = self.catch_nearby().await;
    }
}

/// One encounter-and-capture unit for a single sighting.
async fn attempt_catch<C: EncounterResolver>(
    client: Arc<C>,
    sighting: Sighting,
    throttle: Duration,
    trailing: Option<Duration>,
) -> Result<(), BotError> {
    tokio::time::sleep(throttle).await;

    let encounter = client.encounter(&sighting).await?;
    if encounter.status.is_success() {
        let outcome = client.catch(&encounter, &sighting).await?;
        info!(
            species = %sighting.species,
            encounter_id = %sighting.encounter_id,
            outcome = ?outcome,
            "Catch attempt finished"
        );
    } else if !encounter.status.is_benign() {
        warn!(
            species = %sighting.species,
            status = %encounter.status,
            "Unable to catch pokemon"
        );
    }

    if let Some(delay) = trailing {
        tokio::time::sleep(delay).await;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use haxton_types::{EncounterStatus, Species};
    use tokio::time::Instant;

    use super::*;
    use crate::testkit::{Call, FakeClient, sighting};

    fn routine(client: &Arc<FakeClient>, settings: Settings) -> CaptureRoutine<FakeClient> {
        let (supervisor, _collector) = TaskSupervisor::new();
        CaptureRoutine::new(Arc::clone(client), Arc::new(settings), supervisor)
    }

    fn filtering_settings(excluded: &[&str]) -> Settings {
        let mut settings = Settings::default();
        settings.catching.use_not_to_catch_filter = true;
        settings.catching.not_to_catch = excluded.iter().map(|s| Species::new(s)).collect();
        settings
    }

    #[tokio::test(start_paused = true)]
    async fn excluded_species_never_encountered() {
        let client = Arc::new(FakeClient::new());
        client.set_sightings(vec![
            sighting(1, "pidgey"),
            sighting(2, "zubat"),
            sighting(3, "rattata"),
        ]);
        let routine = routine(&client, filtering_settings(&["zubat"]));

        let start = Instant::now();
        assert_eq!(routine.catch_nearby().await, 2);
        // Scheduling returns before any encounter is attempted.
        assert_eq!(client.count_calls(|c| matches!(c, Call::Encounter(_))), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;

        let encounters: Vec<_> = client
            .timed_calls()
            .into_iter()
            .filter(|(_, c)| matches!(c, Call::Encounter(_)))
            .collect();
        assert_eq!(encounters.len(), 2);
        for (at, call) in &encounters {
            assert!(at.duration_since(start) >= Duration::from_millis(500));
            assert_ne!(call, &Call::Encounter(Species::new("zubat")));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn units_run_concurrently() {
        let client = Arc::new(FakeClient::new());
        client.set_sightings(vec![
            sighting(1, "pidgey"),
            sighting(2, "weedle"),
            sighting(3, "rattata"),
        ]);
        let routine = routine(&client, Settings::default());

        let start = Instant::now();
        routine.catch_nearby().await;
        tokio::time::sleep(Duration::from_millis(600)).await;

        // All three throttles elapse together; the 2s inter-catch delay
        // of the first units does not hold back their siblings.
        let encounters = client
            .timed_calls()
            .into_iter()
            .filter(|(at, c)| {
                matches!(c, Call::Encounter(_))
                    && at.duration_since(start) < Duration::from_millis(600)
            })
            .count();
        assert_eq!(encounters, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn only_success_is_captured() {
        let client = Arc::new(FakeClient::new());
        client.set_sightings(vec![
            sighting(1, "pidgey"),
            sighting(2, "weedle"),
            sighting(3, "rattata"),
        ]);
        client.set_encounter_status("weedle", EncounterStatus::AlreadyHappened);
        client.set_encounter_status("rattata", EncounterStatus::PokemonFled);
        let routine = routine(&client, Settings::default());

        routine.catch_nearby().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        let catches: Vec<_> = client
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Catch(_)))
            .collect();
        assert_eq!(catches, vec![Call::Catch(Species::new("pidgey"))]);
    }

    #[tokio::test(start_paused = true)]
    async fn trailing_delay_holds_only_the_unit_that_carries_it() {
        let client = Arc::new(FakeClient::new());
        let throttle = Duration::from_millis(500);

        let start = Instant::now();
        attempt_catch(
            Arc::clone(&client),
            sighting(1, "pidgey"),
            throttle,
            Some(Duration::from_secs(2)),
        )
        .await
        .unwrap();
        let with_trailing = start.elapsed();
        assert!(with_trailing >= Duration::from_millis(2_500));
        assert!(with_trailing < Duration::from_millis(2_600));

        let start = Instant::now();
        attempt_catch(Arc::clone(&client), sighting(2, "weedle"), throttle, None)
            .await
            .unwrap();
        let without = start.elapsed();
        assert!(without >= throttle);
        assert!(without < Duration::from_millis(600));

        assert_eq!(client.count_calls(|c| matches!(c, Call::Catch(_))), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_snapshot_schedules_nothing() {
        let client = Arc::new(FakeClient::new());
        let routine = routine(&client, Settings::default());
        assert_eq!(routine.catch_nearby().await, 0);
        assert_eq!(client.calls(), vec![Call::Nearby]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_is_bounded_and_reported() {
        let client = Arc::new(FakeClient::new());
        client.set_sightings(vec![sighting(1, "pidgey")]);
        client.set_nearby_delay(Duration::from_secs(60));
        let mut settings = Settings::default();
        settings.timings.nearby_fetch_timeout_ms = 1_000;

        let (supervisor, mut collector) = TaskSupervisor::new();
        let routine = CaptureRoutine::new(Arc::clone(&client), Arc::new(settings), supervisor);

        assert_eq!(routine.catch_nearby().await, 0);
        let failure = collector.next().await.unwrap();
        assert_eq!(failure.kind, TaskKind::NearbyScan);
        assert!(matches!(
            failure.error,
            BotError::NearbyTimeout { timeout_ms: 1_000 }
        ));
    }
}
