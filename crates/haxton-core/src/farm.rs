//! Fort farming loop.
//!
//! Discover forts, walk to the closest, catch along the way, claim the
//! reward, pause, repeat. Once every fort of a discovery pass has been
//! visited the map is queried again. Distances are recomputed from the
//! player's current position before every selection, since the position
//! moves with each visit.
//!
//! There is no error handling here: any collaborator failure ends the
//! loop, and the supervisor reports it.

use std::sync::Arc;

use haxton_types::{FortSummary, GeoCoordinate, distance_in_meters, summarize_awards};
use tracing::{info, warn};

use crate::capture::CaptureRoutine;
use crate::client::GameClient;
use crate::error::BotError;
use crate::settings::Settings;

/// Remove and return the fort closest to `position` with its distance
/// in meters.
///
/// Ties keep the earliest fort in `forts`.
pub fn take_closest(
    position: GeoCoordinate,
    forts: &mut Vec<FortSummary>,
) -> Option<(FortSummary, f64)> {
    let (index, distance) = forts
        .iter()
        .map(|fort| distance_in_meters(position, fort.location))
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((index, distance)),
        })?;
    Some((forts.remove(index), distance))
}

/// Run the farming loop until a collaborator call fails.
pub async fn run_farm_loop<C: GameClient>(
    client: Arc<C>,
    settings: Arc<Settings>,
    capture: CaptureRoutine<C>,
) -> Result<(), BotError> {
    loop {
        let forts = client.forts().await?;
        if forts.is_empty() {
            warn!("No pokestops found! Are you sure you're not in the middle of the ocean?");
            let delay = settings.timings.rediscover_delay();
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            continue;
        }

        let rewarded = visit_forts(client.as_ref(), &settings, &capture, forts).await?;
        info!(rewarded, "Discovery pass finished");
    }
}

/// Visit every fort of one discovery pass, closest first, and return how
/// many visits paid out experience.
async fn visit_forts<C: GameClient>(
    client: &C,
    settings: &Settings,
    capture: &CaptureRoutine<C>,
    mut forts: Vec<FortSummary>,
) -> Result<u64, BotError> {
    let mut visited: u64 = 0;
    while !forts.is_empty() {
        info!(count = forts.len(), "Found pokestops");
        let position = client.current_location();
        let Some((target, distance)) = take_closest(position, &mut forts) else {
            break;
        };

        let details = client.fort_details(&target.id, target.location).await?;
        info!(
            fort = details.name,
            distance_m = distance.round(),
            "Moving to pokestop"
        );
        client
            .walk_to(target.location, settings.walking.speed_kmh, capture)
            .await?;

        let reward = client.search_fort(&target.id, target.location).await?;
        if reward.experience > 0 {
            info!(
                visit = visited,
                fort = details.name,
                experience = reward.experience,
                gems = reward.gems,
                items = summarize_awards(&reward.items),
                "Pokestop rewarded us"
            );
            visited = visited.saturating_add(1);
        }

        tokio::time::sleep(settings.timings.fort_visit_delay()).await;
    }
    Ok(visited)
}
