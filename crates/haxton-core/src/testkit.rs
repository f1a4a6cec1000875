//! Recording in-memory client used by the unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use haxton_types::{
    CatchOutcome, CreatureId, EncounterResult, EncounterStatus, FortDetails, FortId, FortReward,
    FortSummary, GeoCoordinate, ItemKind, ItemStack, OwnedCreature, RecycleRule, Sighting,
    Species,
};
use tokio::time::Instant;

use crate::client::{
    EncounterResolver, FortClient, Inventory, MapProvider, Navigation, StepHook,
};
use crate::error::ClientError;

/// A collaborator call, as recorded by [`FakeClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Forts,
    Nearby,
    WalkTo(GeoCoordinate),
    FortDetails(FortId),
    SearchFort(FortId),
    Encounter(Species),
    Catch(Species),
    Items,
    Duplicates {
        keep_evolvable: bool,
        prioritize_iv: bool,
        protected: Vec<Species>,
    },
    Transfer(CreatureId),
    CreaturesToEvolve(Vec<Species>, Option<f64>),
    Evolve(CreatureId),
    UseLuckyEgg,
    ItemsToRecycle(Vec<RecycleRule>),
    Recycle(ItemKind, u32),
}

#[derive(Debug, Default)]
struct State {
    position: GeoCoordinate,
    fort_batches: VecDeque<Vec<FortSummary>>,
    sightings: Vec<Sighting>,
    nearby_delay: Option<Duration>,
    encounter_statuses: HashMap<Species, EncounterStatus>,
    reward: FortReward,
    items: Vec<ItemStack>,
    duplicates: Vec<OwnedCreature>,
    evolvable: Vec<OwnedCreature>,
    recyclable: Vec<ItemStack>,
    calls: Vec<(Instant, Call)>,
}

/// Scriptable client that records every call with its (virtual) time.
#[derive(Debug, Default)]
pub struct FakeClient {
    state: Mutex<State>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push((Instant::now(), call));
    }

    pub fn set_position(&self, position: GeoCoordinate) {
        self.state.lock().unwrap().position = position;
    }

    /// Queue the result of one `forts()` call. Once the queue is empty,
    /// `forts()` fails, which ends the farming loop.
    pub fn push_fort_batch(&self, forts: Vec<FortSummary>) {
        self.state.lock().unwrap().fort_batches.push_back(forts);
    }

    pub fn set_sightings(&self, sightings: Vec<Sighting>) {
        self.state.lock().unwrap().sightings = sightings;
    }

    pub fn set_nearby_delay(&self, delay: Duration) {
        self.state.lock().unwrap().nearby_delay = Some(delay);
    }

    pub fn set_encounter_status(&self, species: &str, status: EncounterStatus) {
        self.state
            .lock()
            .unwrap()
            .encounter_statuses
            .insert(Species::new(species), status);
    }

    pub fn set_reward(&self, reward: FortReward) {
        self.state.lock().unwrap().reward = reward;
    }

    pub fn set_items(&self, items: Vec<ItemStack>) {
        self.state.lock().unwrap().items = items;
    }

    pub fn set_duplicates(&self, creatures: Vec<OwnedCreature>) {
        self.state.lock().unwrap().duplicates = creatures;
    }

    pub fn set_evolvable(&self, creatures: Vec<OwnedCreature>) {
        self.state.lock().unwrap().evolvable = creatures;
    }

    pub fn set_recyclable(&self, stacks: Vec<ItemStack>) {
        self.state.lock().unwrap().recyclable = stacks;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, Call)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(_, call)| predicate(call))
            .count()
    }
}

pub fn fort(id: &str, latitude: f64, longitude: f64) -> FortSummary {
    FortSummary {
        id: FortId::new(id),
        location: GeoCoordinate::new(latitude, longitude),
    }
}

pub fn sighting(encounter: u64, species: &str) -> Sighting {
    Sighting {
        encounter_id: encounter.into(),
        spawn_point_id: format!("spawn-{encounter}"),
        species: Species::new(species),
        location: GeoCoordinate::default(),
    }
}

pub fn creature(id: u64, species: &str, cp: u32, ivs: (u8, u8, u8)) -> OwnedCreature {
    OwnedCreature {
        id: CreatureId(id),
        species: Species::new(species),
        cp,
        individual_attack: ivs.0,
        individual_defense: ivs.1,
        individual_stamina: ivs.2,
        can_evolve: true,
    }
}

impl Navigation for FakeClient {
    fn current_location(&self) -> GeoCoordinate {
        self.state.lock().unwrap().position
    }

    async fn walk_to<H: StepHook>(
        &self,
        target: GeoCoordinate,
        _speed_kmh: f64,
        hook: &H,
    ) -> Result<(), ClientError> {
        self.record(Call::WalkTo(target));
        hook.on_step().await;
        self.set_position(target);
        Ok(())
    }
}

impl MapProvider for FakeClient {
    async fn forts(&self) -> Result<Vec<FortSummary>, ClientError> {
        self.record(Call::Forts);
        self.state
            .lock()
            .unwrap()
            .fort_batches
            .pop_front()
            .ok_or_else(|| ClientError::Unavailable {
                message: "map exhausted".to_owned(),
            })
    }

    async fn nearby_sightings_closest_first(&self) -> Result<Vec<Sighting>, ClientError> {
        self.record(Call::Nearby);
        let (sightings, delay) = {
            let state = self.state.lock().unwrap();
            (state.sightings.clone(), state.nearby_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(sightings)
    }
}

impl FortClient for FakeClient {
    async fn fort_details(
        &self,
        id: &FortId,
        location: GeoCoordinate,
    ) -> Result<FortDetails, ClientError> {
        self.record(Call::FortDetails(id.clone()));
        Ok(FortDetails {
            id: id.clone(),
            name: format!("Fort {id}"),
            location,
        })
    }

    async fn search_fort(
        &self,
        id: &FortId,
        _location: GeoCoordinate,
    ) -> Result<FortReward, ClientError> {
        self.record(Call::SearchFort(id.clone()));
        Ok(self.state.lock().unwrap().reward.clone())
    }
}

impl EncounterResolver for FakeClient {
    async fn encounter(&self, sighting: &Sighting) -> Result<EncounterResult, ClientError> {
        self.record(Call::Encounter(sighting.species.clone()));
        let status = self
            .state
            .lock()
            .unwrap()
            .encounter_statuses
            .get(&sighting.species)
            .copied()
            .unwrap_or(EncounterStatus::Success);
        Ok(EncounterResult {
            status,
            encounter_id: sighting.encounter_id,
            capture_probability: Some(0.5),
        })
    }

    async fn catch(
        &self,
        _encounter: &EncounterResult,
        sighting: &Sighting,
    ) -> Result<CatchOutcome, ClientError> {
        self.record(Call::Catch(sighting.species.clone()));
        Ok(CatchOutcome::Caught)
    }
}

impl Inventory for FakeClient {
    async fn items(&self) -> Result<Vec<ItemStack>, ClientError> {
        self.record(Call::Items);
        Ok(self.state.lock().unwrap().items.clone())
    }

    async fn duplicates_for_transfer(
        &self,
        keep_evolvable: bool,
        prioritize_iv: bool,
        protected: &[Species],
    ) -> Result<Vec<OwnedCreature>, ClientError> {
        self.record(Call::Duplicates {
            keep_evolvable,
            prioritize_iv,
            protected: protected.to_vec(),
        });
        Ok(self.state.lock().unwrap().duplicates.clone())
    }

    async fn transfer(&self, id: CreatureId) -> Result<(), ClientError> {
        self.record(Call::Transfer(id));
        Ok(())
    }

    async fn creatures_to_evolve(
        &self,
        filter: &[Species],
        min_iv: Option<f64>,
    ) -> Result<Vec<OwnedCreature>, ClientError> {
        self.record(Call::CreaturesToEvolve(filter.to_vec(), min_iv));
        Ok(self.state.lock().unwrap().evolvable.clone())
    }

    async fn evolve(&self, id: CreatureId) -> Result<(), ClientError> {
        self.record(Call::Evolve(id));
        Ok(())
    }

    async fn use_lucky_egg(&self) -> Result<(), ClientError> {
        self.record(Call::UseLuckyEgg);
        Ok(())
    }

    async fn items_to_recycle(&self, rules: &[RecycleRule]) -> Result<Vec<ItemStack>, ClientError> {
        self.record(Call::ItemsToRecycle(rules.to_vec()));
        Ok(self.state.lock().unwrap().recyclable.clone())
    }

    async fn recycle(&self, kind: ItemKind, count: u32) -> Result<(), ClientError> {
        self.record(Call::Recycle(kind, count));
        Ok(())
    }
}
