//! Synchronous world state and the rules that mutate it.
//!
//! [`WorldState`] knows nothing about async or locking; [`SimWorld`] wraps
//! it in a mutex and maps each collaborator call onto one method here.
//! Time is passed in explicitly so cooldowns can be tested without a
//! runtime.
//!
//! [`SimWorld`]: crate::world::SimWorld

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use haxton_core::settings::SimulationSettings;
use haxton_types::{
    CatchOutcome, CreatureId, EARTH_RADIUS_METERS, EncounterId, EncounterResult, EncounterStatus,
    FortDetails, FortId, FortReward, FortSummary, GeoCoordinate, ItemAward, ItemKind, ItemStack,
    OwnedCreature, RecycleRule, Sighting, Species, distance_in_meters,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;

use crate::error::SimError;
use crate::species::{
    CANDY_PER_CATCH, CANDY_PER_TRANSFER, EVOLVE_CANDY_COST, evolution_of, family_of,
    total_spawn_weight, wild_species_at,
};

/// A fort can be searched from this close, in meters.
pub const FORT_SEARCH_RANGE_M: f64 = 40.0;

/// A sighting can be encountered from this close, in meters.
pub const ENCOUNTER_RANGE_M: f64 = 100.0;

/// Time before a searched fort pays out again.
pub const FORT_COOLDOWN: Duration = Duration::from_secs(300);

/// Experience granted per successful fort search.
pub const FORT_EXPERIENCE: u32 = 50;

/// Largest collection the player may hold.
pub const MAX_CREATURES: usize = 250;

/// Chance that a creature that broke free runs away.
const FLEE_CHANCE: f64 = 0.15;

/// Items a fort search can award, drawn uniformly.
const FORT_LOOT: &[ItemKind] = &[
    ItemKind::PokeBall,
    ItemKind::PokeBall,
    ItemKind::PokeBall,
    ItemKind::GreatBall,
    ItemKind::Potion,
    ItemKind::Potion,
    ItemKind::Revive,
    ItemKind::RazzBerry,
];

/// Balls in the order they are thrown, with their catch-rate multiplier.
const BALLS: &[(ItemKind, f64)] = &[
    (ItemKind::PokeBall, 1.0),
    (ItemKind::GreatBall, 1.5),
    (ItemKind::UltraBall, 2.0),
    (ItemKind::MasterBall, f64::INFINITY),
];

/// Bag contents of a freshly generated world.
const STARTING_BAG: &[(ItemKind, u32)] = &[
    (ItemKind::PokeBall, 50),
    (ItemKind::Potion, 10),
    (ItemKind::RazzBerry, 5),
    (ItemKind::LuckyEgg, 2),
];

/// Sightings placed around each generated fort.
const SIGHTINGS_PER_FORT: u32 = 2;

/// A fort on the map.
#[derive(Debug, Clone)]
struct SimFort {
    id: FortId,
    name: String,
    location: GeoCoordinate,
    searched_at: Option<Instant>,
}

/// A wild creature waiting to be encountered.
#[derive(Debug, Clone)]
struct WildCreature {
    sighting: Sighting,
    capture_probability: f64,
    encountered: bool,
}

/// Everything the simulated game server knows.
#[derive(Debug)]
pub struct WorldState {
    forts: Vec<SimFort>,
    wild: Vec<WildCreature>,
    bag: BTreeMap<ItemKind, u32>,
    creatures: Vec<OwnedCreature>,
    candy: HashMap<Species, u32>,
    next_creature_id: u64,
    next_encounter_id: u64,
    rng: StdRng,
}

impl WorldState {
    /// An empty world: no forts, no sightings, an empty bag.
    pub fn new(seed: u64) -> Self {
        Self {
            forts: Vec::new(),
            wild: Vec::new(),
            bag: BTreeMap::new(),
            creatures: Vec::new(),
            candy: HashMap::new(),
            next_creature_id: 1,
            next_encounter_id: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Scatter forts and sightings around `settings.origin` and stock the
    /// bag. The same settings always produce the same world.
    pub fn generate(settings: &SimulationSettings) -> Self {
        let mut state = Self::new(settings.seed);
        for (kind, count) in STARTING_BAG {
            state.bag.insert(*kind, *count);
        }

        let radius = settings.radius_m.max(0.0);
        for index in 0..settings.fort_count {
            let location = state.random_point(settings.origin, radius);
            state.add_fort(
                FortId::new(format!("fort-{index:03}")),
                format!("Pokestop #{}", index.saturating_add(1)),
                location,
            );
            for _ in 0..SIGHTINGS_PER_FORT {
                state.spawn_wild_near(location);
            }
        }
        state
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    /// Place a fort.
    pub fn add_fort(&mut self, id: FortId, name: impl Into<String>, location: GeoCoordinate) {
        self.forts.push(SimFort {
            id,
            name: name.into(),
            location,
            searched_at: None,
        });
    }

    /// Place a wild creature and return its encounter id.
    pub fn add_sighting(&mut self, species: Species, location: GeoCoordinate) -> EncounterId {
        let encounter_id = EncounterId(self.next_encounter_id);
        self.next_encounter_id = self.next_encounter_id.saturating_add(1);
        let capture_probability = self.rng.random_range(0.2..0.9);
        self.wild.push(WildCreature {
            sighting: Sighting {
                encounter_id,
                spawn_point_id: format!("spawn-{}", encounter_id.into_inner()),
                species,
                location,
            },
            capture_probability,
            encountered: false,
        });
        encounter_id
    }

    /// Add an owned creature and return its id.
    pub fn add_creature(&mut self, species: Species, cp: u32, ivs: (u8, u8, u8)) -> CreatureId {
        let id = CreatureId(self.next_creature_id);
        self.next_creature_id = self.next_creature_id.saturating_add(1);
        self.creatures.push(OwnedCreature {
            id,
            species,
            cp,
            individual_attack: ivs.0,
            individual_defense: ivs.1,
            individual_stamina: ivs.2,
            can_evolve: false,
        });
        id
    }

    /// Set how many items of `kind` the bag holds.
    pub fn set_item_count(&mut self, kind: ItemKind, count: u32) {
        self.bag.insert(kind, count);
    }

    /// Grant candy for a species' family.
    pub fn add_candy(&mut self, species: &Species, amount: u32) {
        let entry = self.candy.entry(family_of(species)).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of items of `kind` held.
    pub fn item_count(&self, kind: ItemKind) -> u32 {
        self.bag.get(&kind).copied().unwrap_or(0)
    }

    /// Candy held for a species' family.
    pub fn candy_for(&self, species: &Species) -> u32 {
        self.candy.get(&family_of(species)).copied().unwrap_or(0)
    }

    /// Every owned creature, with its evolve flag filled in.
    pub fn creatures(&self) -> Vec<OwnedCreature> {
        self.creatures.iter().map(|c| self.with_evolve_flag(c)).collect()
    }

    /// Every fort on the map.
    pub fn forts(&self) -> Vec<FortSummary> {
        self.forts
            .iter()
            .map(|fort| FortSummary {
                id: fort.id.clone(),
                location: fort.location,
            })
            .collect()
    }

    /// Wild creatures within `radius_m` of `position`, closest first.
    pub fn nearby(&self, position: GeoCoordinate, radius_m: f64) -> Vec<Sighting> {
        let mut found: Vec<(f64, &Sighting)> = self
            .wild
            .iter()
            .map(|wild| {
                (
                    distance_in_meters(position, wild.sighting.location),
                    &wild.sighting,
                )
            })
            .filter(|(distance, _)| *distance <= radius_m)
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.into_iter().map(|(_, s)| s.clone()).collect()
    }

    /// Name and location of a fort.
    pub fn fort_details(&self, id: &FortId) -> Result<FortDetails, SimError> {
        self.forts
            .iter()
            .find(|fort| &fort.id == id)
            .map(|fort| FortDetails {
                id: fort.id.clone(),
                name: fort.name.clone(),
                location: fort.location,
            })
            .ok_or_else(|| SimError::UnknownFort(id.clone()))
    }

    // -----------------------------------------------------------------------
    // Forts
    // -----------------------------------------------------------------------

    /// Search a fort from `position` at time `now`.
    ///
    /// Out of range or cooling down yields an empty reward, as the server
    /// does. A paying search adds the items to the bag and spawns a new
    /// wild creature near the fort.
    pub fn search_fort(
        &mut self,
        id: &FortId,
        position: GeoCoordinate,
        now: Instant,
    ) -> Result<FortReward, SimError> {
        let fort = self
            .forts
            .iter_mut()
            .find(|fort| &fort.id == id)
            .ok_or_else(|| SimError::UnknownFort(id.clone()))?;
        let location = fort.location;

        if distance_in_meters(position, location) > FORT_SEARCH_RANGE_M {
            return Ok(FortReward::default());
        }
        if fort
            .searched_at
            .is_some_and(|at| now.saturating_duration_since(at) < FORT_COOLDOWN)
        {
            return Ok(FortReward::default());
        }
        fort.searched_at = Some(now);

        let drops = self.rng.random_range(1..=4_usize);
        let mut items = Vec::with_capacity(drops);
        for _ in 0..drops {
            let Some(kind) = FORT_LOOT.choose(&mut self.rng).copied() else {
                break;
            };
            items.push(ItemAward { kind, quantity: 1 });
            let held = self.bag.entry(kind).or_insert(0);
            *held = held.saturating_add(1);
        }
        let gems = u32::from(self.rng.random_bool(0.05));
        self.spawn_wild_near(location);

        Ok(FortReward {
            experience: FORT_EXPERIENCE,
            gems,
            items,
        })
    }

    // -----------------------------------------------------------------------
    // Encounters
    // -----------------------------------------------------------------------

    /// Start an encounter with a wild creature from `position`.
    pub fn encounter(&mut self, id: EncounterId, position: GeoCoordinate) -> EncounterResult {
        let collection_full = self.creatures.len() >= MAX_CREATURES;
        let Some(wild) = self
            .wild
            .iter_mut()
            .find(|wild| wild.sighting.encounter_id == id)
        else {
            return encounter_result(EncounterStatus::NotFound, id, None);
        };

        if distance_in_meters(position, wild.sighting.location) > ENCOUNTER_RANGE_M {
            return encounter_result(EncounterStatus::NotInRange, id, None);
        }
        if collection_full {
            return encounter_result(EncounterStatus::InventoryFull, id, None);
        }
        if wild.encountered {
            return encounter_result(EncounterStatus::AlreadyHappened, id, None);
        }
        wild.encountered = true;
        encounter_result(
            EncounterStatus::Success,
            id,
            Some(wild.capture_probability),
        )
    }

    /// Throw the cheapest ball held at an encountered creature.
    pub fn catch(&mut self, id: EncounterId) -> Result<CatchOutcome, SimError> {
        let wild = self
            .wild
            .iter()
            .find(|wild| wild.sighting.encounter_id == id)
            .ok_or(SimError::UnknownEncounter(id))?;
        if !wild.encountered {
            return Err(SimError::EncounterNotStarted(id));
        }
        let capture_probability = wild.capture_probability;

        let (ball, multiplier) = BALLS
            .iter()
            .copied()
            .find(|(kind, _)| self.item_count(*kind) > 0)
            .ok_or(SimError::NoBalls)?;
        self.take_items(ball, 1)?;

        let chance = (capture_probability * multiplier).min(1.0);
        if self.rng.random::<f64>() < chance {
            let Some(wild) = self.remove_wild(id) else {
                return Err(SimError::UnknownEncounter(id));
            };
            let cp = self.rng.random_range(10..=1_500);
            let ivs = (
                self.rng.random_range(0..=15),
                self.rng.random_range(0..=15),
                self.rng.random_range(0..=15),
            );
            self.add_candy(&wild.sighting.species, CANDY_PER_CATCH);
            self.add_creature(wild.sighting.species, cp, ivs);
            return Ok(CatchOutcome::Caught);
        }
        if self.rng.random_bool(FLEE_CHANCE) {
            self.remove_wild(id);
            return Ok(CatchOutcome::Fled);
        }
        // A creature that broke free must be encountered again before the next throw.
        if let Some(wild) = self
            .wild
            .iter_mut()
            .find(|wild| wild.sighting.encounter_id == id)
        {
            wild.encountered = false;
        }
        Ok(CatchOutcome::Escaped)
    }

    // -----------------------------------------------------------------------
    // Collection
    // -----------------------------------------------------------------------

    /// Duplicates to release: all but the best of each species.
    ///
    /// The best is the highest CP, or the highest IV when `prioritize_iv`
    /// is set, with the other measure breaking ties. Protected species are
    /// never offered; evolvable creatures are kept when `keep_evolvable`.
    pub fn duplicates(
        &self,
        keep_evolvable: bool,
        prioritize_iv: bool,
        protected: &[Species],
    ) -> Vec<OwnedCreature> {
        let mut by_species: BTreeMap<&Species, Vec<OwnedCreature>> = BTreeMap::new();
        for creature in &self.creatures {
            if protected.contains(&creature.species) {
                continue;
            }
            by_species
                .entry(&creature.species)
                .or_default()
                .push(self.with_evolve_flag(creature));
        }

        let mut duplicates = Vec::new();
        for group in by_species.into_values() {
            let mut group = group;
            group.sort_by(|a, b| {
                let by_cp = b.cp.cmp(&a.cp);
                let by_iv = b.perfection().total_cmp(&a.perfection());
                if prioritize_iv {
                    by_iv.then(by_cp)
                } else {
                    by_cp.then(by_iv)
                }
            });
            duplicates.extend(
                group
                    .into_iter()
                    .skip(1)
                    .filter(|c| !(keep_evolvable && c.can_evolve)),
            );
        }
        duplicates
    }

    /// Release a creature; its family gets a candy.
    pub fn transfer(&mut self, id: CreatureId) -> Result<(), SimError> {
        let index = self
            .creatures
            .iter()
            .position(|c| c.id == id)
            .ok_or(SimError::UnknownCreature(id))?;
        let released = self.creatures.remove(index);
        self.add_candy(&released.species, CANDY_PER_TRANSFER);
        Ok(())
    }

    /// Creatures that can evolve now, limited to `filter` when non-empty
    /// and to those at or above `min_iv` percent when set.
    ///
    /// Candy is budgeted across the list so every listed creature can
    /// actually be evolved in sequence.
    pub fn evolve_candidates(
        &self,
        filter: &[Species],
        min_iv: Option<f64>,
    ) -> Vec<OwnedCreature> {
        let mut budget: HashMap<Species, u32> = HashMap::new();
        let mut candidates = Vec::new();
        for creature in &self.creatures {
            if !filter.is_empty() && !filter.contains(&creature.species) {
                continue;
            }
            if min_iv.is_some_and(|floor| creature.perfection() < floor) {
                continue;
            }
            if evolution_of(&creature.species).is_none() {
                continue;
            }
            let family = family_of(&creature.species);
            let left = budget
                .entry(family.clone())
                .or_insert_with(|| self.candy.get(&family).copied().unwrap_or(0));
            if *left < EVOLVE_CANDY_COST {
                continue;
            }
            *left = left.saturating_sub(EVOLVE_CANDY_COST);
            let mut candidate = creature.clone();
            candidate.can_evolve = true;
            candidates.push(candidate);
        }
        candidates
    }

    /// Evolve a creature, spending its family's candy.
    pub fn evolve(&mut self, id: CreatureId) -> Result<(), SimError> {
        let species = self
            .creatures
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.species.clone())
            .ok_or(SimError::UnknownCreature(id))?;
        let family = family_of(&species);
        let candy = self.candy.get(&family).copied().unwrap_or(0);
        let evolved = evolution_of(&species)
            .filter(|_| candy >= EVOLVE_CANDY_COST)
            .ok_or_else(|| SimError::CannotEvolve {
                id,
                species: species.clone(),
            })?;

        self.candy
            .insert(family, candy.saturating_sub(EVOLVE_CANDY_COST));
        if let Some(creature) = self.creatures.iter_mut().find(|c| c.id == id) {
            creature.species = evolved;
            creature.cp = creature.cp.saturating_mul(8) / 5;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Every non-empty stack in the bag.
    pub fn items(&self) -> Vec<ItemStack> {
        self.bag
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(kind, count)| ItemStack {
                kind: *kind,
                count: *count,
            })
            .collect()
    }

    /// Consume one lucky egg.
    pub fn use_lucky_egg(&mut self) -> Result<(), SimError> {
        self.take_items(ItemKind::LuckyEgg, 1)
    }

    /// The excess of each rule's kind over its `keep`.
    pub fn items_to_recycle(&self, rules: &[RecycleRule]) -> Vec<ItemStack> {
        rules
            .iter()
            .filter_map(|rule| {
                let excess = self.item_count(rule.kind).saturating_sub(rule.keep);
                (excess > 0).then_some(ItemStack {
                    kind: rule.kind,
                    count: excess,
                })
            })
            .collect()
    }

    /// Discard `count` items of `kind`.
    pub fn recycle(&mut self, kind: ItemKind, count: u32) -> Result<(), SimError> {
        self.take_items(kind, count)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn take_items(&mut self, kind: ItemKind, count: u32) -> Result<(), SimError> {
        let have = self.item_count(kind);
        if have < count {
            return Err(SimError::NotEnoughItems {
                kind,
                have,
                need: count,
            });
        }
        self.bag.insert(kind, have.saturating_sub(count));
        Ok(())
    }

    fn remove_wild(&mut self, id: EncounterId) -> Option<WildCreature> {
        let index = self
            .wild
            .iter()
            .position(|wild| wild.sighting.encounter_id == id)?;
        Some(self.wild.swap_remove(index))
    }

    fn with_evolve_flag(&self, creature: &OwnedCreature) -> OwnedCreature {
        let mut copy = creature.clone();
        copy.can_evolve = evolution_of(&creature.species).is_some()
            && self.candy_for(&creature.species) >= EVOLVE_CANDY_COST;
        copy
    }

    fn spawn_wild_near(&mut self, location: GeoCoordinate) {
        let species = wild_species_at(self.rng.random_range(0..total_spawn_weight()));
        let spot = self.random_point(location, ENCOUNTER_RANGE_M / 2.0);
        self.add_sighting(species, spot);
    }

    /// A uniformly distributed point within `radius_m` of `center`.
    fn random_point(&mut self, center: GeoCoordinate, radius_m: f64) -> GeoCoordinate {
        let distance = radius_m * self.rng.random::<f64>().sqrt();
        let bearing = self.rng.random_range(0.0..core::f64::consts::TAU);
        offset_by(center, distance * bearing.cos(), distance * bearing.sin())
    }
}

const fn encounter_result(
    status: EncounterStatus,
    encounter_id: EncounterId,
    capture_probability: Option<f64>,
) -> EncounterResult {
    EncounterResult {
        status,
        encounter_id,
        capture_probability,
    }
}

/// Move `origin` by the given meters north and east.
pub fn offset_by(origin: GeoCoordinate, north_m: f64, east_m: f64) -> GeoCoordinate {
    let d_lat = (north_m / EARTH_RADIUS_METERS).to_degrees();
    let d_lon = (east_m / (EARTH_RADIUS_METERS * origin.latitude.to_radians().cos())).to_degrees();
    GeoCoordinate::new(origin.latitude + d_lat, origin.longitude + d_lon)
}
