//! [`SimWorld`]: the collaborator traits over an in-memory world.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use haxton_core::client::{
    EncounterResolver, FortClient, Inventory, MapProvider, Navigation, StepHook,
};
use haxton_core::error::ClientError;
use haxton_core::settings::SimulationSettings;
use haxton_types::{
    CatchOutcome, CreatureId, EncounterResult, FortDetails, FortId, FortReward,
    FortSummary, GeoCoordinate, ItemKind, ItemStack, OwnedCreature, RecycleRule, Sighting,
    Species, distance_in_meters,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::SimError;
use crate::state::WorldState;

/// Simulated time between two walking steps.
pub const STEP_INTERVAL: Duration = Duration::from_secs(1);

/// Sightings within this distance of the player are reported as nearby.
pub const NEARBY_RADIUS_M: f64 = 200.0;

/// An in-memory game world.
///
/// World state sits behind one async mutex so every loop can call into the
/// world concurrently. The player position is kept apart from it so
/// [`Navigation::current_location`] stays synchronous.
#[derive(Debug)]
pub struct SimWorld {
    state: Mutex<WorldState>,
    position: RwLock<GeoCoordinate>,
}

impl SimWorld {
    /// An empty world with the player at `origin`.
    pub fn new(origin: GeoCoordinate, seed: u64) -> Self {
        Self {
            state: Mutex::new(WorldState::new(seed)),
            position: RwLock::new(origin),
        }
    }

    /// A populated world generated from `settings`.
    pub fn generate(settings: &SimulationSettings) -> Self {
        Self {
            state: Mutex::new(WorldState::generate(settings)),
            position: RwLock::new(settings.origin),
        }
    }

    /// Add a fort.
    #[must_use]
    pub fn with_fort(
        mut self,
        id: &str,
        name: &str,
        location: GeoCoordinate,
    ) -> Self {
        self.state.get_mut().add_fort(FortId::new(id), name, location);
        self
    }

    /// Add a wild creature.
    #[must_use]
    pub fn with_sighting(mut self, species: &str, location: GeoCoordinate) -> Self {
        self.state
            .get_mut()
            .add_sighting(Species::new(species), location);
        self
    }

    /// Set the count of an item kind in the bag.
    #[must_use]
    pub fn with_items(mut self, kind: ItemKind, count: u32) -> Self {
        self.state.get_mut().set_item_count(kind, count);
        self
    }

    /// Add an owned creature.
    #[must_use]
    pub fn with_creature(mut self, species: &str, cp: u32, ivs: (u8, u8, u8)) -> Self {
        self.state
            .get_mut()
            .add_creature(Species::new(species), cp, ivs);
        self
    }

    /// Grant candy to a species' family.
    #[must_use]
    pub fn with_candy(mut self, species: &str, amount: u32) -> Self {
        self.state
            .get_mut()
            .add_candy(&Species::new(species), amount);
        self
    }

    /// Every owned creature.
    pub async fn creatures(&self) -> Vec<OwnedCreature> {
        self.state.lock().await.creatures()
    }

    /// Count of `kind` in the bag.
    pub async fn item_count(&self, kind: ItemKind) -> u32 {
        self.state.lock().await.item_count(kind)
    }

    /// Candy held for a species' family.
    pub async fn candy(&self, species: &str) -> u32 {
        self.state.lock().await.candy_for(&Species::new(species))
    }

    fn set_position(&self, to: GeoCoordinate) {
        *self
            .position
            .write()
            .unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Navigation for SimWorld {
    fn current_location(&self) -> GeoCoordinate {
        *self.position.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move in straight steps of `speed_kmh` per simulated second, awaiting
    /// `hook` after each step. The last step lands exactly on `target`.
    async fn walk_to<H: StepHook>(
        &self,
        target: GeoCoordinate,
        speed_kmh: f64,
        hook: &H,
    ) -> Result<(), ClientError> {
        if !speed_kmh.is_finite() || speed_kmh <= 0.0 {
            return Err(SimError::InvalidSpeed(speed_kmh).into());
        }
        let step_m = speed_kmh / 3.6 * STEP_INTERVAL.as_secs_f64();

        let mut steps: u64 = 0;
        loop {
            let here = self.current_location();
            let remaining = distance_in_meters(here, target);
            let next = if remaining <= step_m {
                target
            } else {
                here.step_toward(target, step_m / remaining)
            };

            tokio::time::sleep(STEP_INTERVAL).await;
            self.set_position(next);
            steps = steps.saturating_add(1);
            hook.on_step().await;

            if remaining <= step_m {
                debug!(steps, %target, "Arrived");
                return Ok(());
            }
        }
    }
}

impl MapProvider for SimWorld {
    async fn forts(&self) -> Result<Vec<FortSummary>, ClientError> {
        Ok(self.state.lock().await.forts())
    }

    async fn nearby_sightings_closest_first(&self) -> Result<Vec<Sighting>, ClientError> {
        let position = self.current_location();
        Ok(self.state.lock().await.nearby(position, NEARBY_RADIUS_M))
    }
}

impl FortClient for SimWorld {
    async fn fort_details(
        &self,
        id: &FortId,
        _location: GeoCoordinate,
    ) -> Result<FortDetails, ClientError> {
        Ok(self.state.lock().await.fort_details(id)?)
    }

    async fn search_fort(
        &self,
        id: &FortId,
        _location: GeoCoordinate,
    ) -> Result<FortReward, ClientError> {
        let position = self.current_location();
        let now = tokio::time::Instant::now();
        let reward = self.state.lock().await.search_fort(id, position, now)?;
        if reward.experience == 0 {
            debug!(fort = %id, "Search paid nothing (out of range or cooling down)");
        }
        Ok(reward)
    }
}

impl EncounterResolver for SimWorld {
    async fn encounter(&self, sighting: &Sighting) -> Result<EncounterResult, ClientError> {
        let position = self.current_location();
        Ok(self
            .state
            .lock()
            .await
            .encounter(sighting.encounter_id, position))
    }

    async fn catch(
        &self,
        encounter: &EncounterResult,
        sighting: &Sighting,
    ) -> Result<CatchOutcome, ClientError> {
        let outcome = self.state.lock().await.catch(encounter.encounter_id)?;
        debug!(species = %sighting.species, ?outcome, "Ball thrown");
        Ok(outcome)
    }
}

impl Inventory for SimWorld {
    async fn items(&self) -> Result<Vec<ItemStack>, ClientError> {
        Ok(self.state.lock().await.items())
    }

    async fn duplicates_for_transfer(
        &self,
        keep_evolvable: bool,
        prioritize_iv: bool,
        protected: &[Species],
    ) -> Result<Vec<OwnedCreature>, ClientError> {
        Ok(self
            .state
            .lock()
            .await
            .duplicates(keep_evolvable, prioritize_iv, protected))
    }

    async fn transfer(&self, id: CreatureId) -> Result<(), ClientError> {
        Ok(self.state.lock().await.transfer(id)?)
    }

    async fn creatures_to_evolve(
        &self,
        filter: &[Species],
        min_iv: Option<f64>,
    ) -> Result<Vec<OwnedCreature>, ClientError> {
        Ok(self.state.lock().await.evolve_candidates(filter, min_iv))
    }

    async fn evolve(&self, id: CreatureId) -> Result<(), ClientError> {
        Ok(self.state.lock().await.evolve(id)?)
    }

    async fn use_lucky_egg(&self) -> Result<(), ClientError> {
        Ok(self.state.lock().await.use_lucky_egg()?)
    }

    async fn items_to_recycle(&self, rules: &[RecycleRule]) -> Result<Vec<ItemStack>, ClientError> {
        Ok(self.state.lock().await.items_to_recycle(rules))
    }

    async fn recycle(&self, kind: ItemKind, count: u32) -> Result<(), ClientError> {
        Ok(self.state.lock().await.recycle(kind, count)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use haxton_core::client::NoStepHook;
    use haxton_types::EncounterId;

    use super::*;
    use crate::state::offset_by;

    const HOME: GeoCoordinate = GeoCoordinate::new(40.0, -74.0);

    async fn find_nearby(world: &SimWorld, id: EncounterId) -> Option<Sighting> {
        world
            .nearby_sightings_closest_first()
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.encounter_id == id)
    }

    #[derive(Default)]
    struct CountingHook(AtomicU32);

    impl StepHook for CountingHook {
        async fn on_step(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn walk_takes_one_step_per_second() {
        let world = SimWorld::new(HOME, 1);
        let target = offset_by(HOME, 100.0, 0.0);
        let hook = CountingHook::default();
        let start = tokio::time::Instant::now();

        // 36 km/h is 10 m/s: ten steps for 100 m.
        world.walk_to(target, 36.0, &hook).await.unwrap();

        assert_eq!(world.current_location(), target);
        let steps = hook.0.load(Ordering::SeqCst);
        assert!((10..=11).contains(&steps), "{steps} steps");
        assert_eq!(start.elapsed(), STEP_INTERVAL * steps);
    }

    #[tokio::test(start_paused = true)]
    async fn walk_to_current_position_still_steps_once() {
        let world = SimWorld::new(HOME, 1);
        let hook = CountingHook::default();
        world.walk_to(HOME, 50.0, &hook).await.unwrap();
        assert_eq!(hook.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_speed_is_rejected() {
        let world = SimWorld::new(HOME, 1);
        let err = world
            .walk_to(offset_by(HOME, 10.0, 0.0), 0.0, &NoStepHook)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Rejected { .. }));
        assert_eq!(world.current_location(), HOME);
    }

    #[tokio::test(start_paused = true)]
    async fn sightings_follow_the_player() {
        let far_away = offset_by(HOME, 1_000.0, 0.0);
        let world = SimWorld::new(HOME, 1).with_sighting("pidgey", far_away);
        assert!(world.nearby_sightings_closest_first().await.unwrap().is_empty());

        world.walk_to(far_away, 200.0, &NoStepHook).await.unwrap();
        let nearby = world.nearby_sightings_closest_first().await.unwrap();
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].species, Species::new("pidgey"));
    }

    #[tokio::test(start_paused = true)]
    async fn encounter_then_master_ball_catch() {
        let world = SimWorld::new(HOME, 1)
            .with_sighting("eevee", HOME)
            .with_items(ItemKind::MasterBall, 1);
        let sighting = find_nearby(&world, EncounterId(1)).await.unwrap();

        let encounter = world.encounter(&sighting).await.unwrap();
        assert!(encounter.status.is_success());
        let outcome = world.catch(&encounter, &sighting).await.unwrap();

        assert_eq!(outcome, CatchOutcome::Caught);
        assert_eq!(world.creatures().await.len(), 1);
        assert_eq!(world.candy("eevee").await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_fort_maps_to_not_found() {
        let world = SimWorld::new(HOME, 1);
        let err = world
            .fort_details(&FortId::new("missing"), HOME)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn search_after_walking_pays_out() {
        let stop = offset_by(HOME, 300.0, 0.0);
        let world = SimWorld::new(HOME, 1).with_fort("f1", "Fountain", stop);
        let fort = FortId::new("f1");

        let before = world.search_fort(&fort, stop).await.unwrap();
        assert_eq!(before.experience, 0);

        world.walk_to(stop, 50.0, &NoStepHook).await.unwrap();
        let reward = world.search_fort(&fort, stop).await.unwrap();
        assert!(reward.experience > 0);
        let details = world.fort_details(&fort, stop).await.unwrap();
        assert_eq!(details.name, "Fountain");
    }
}
