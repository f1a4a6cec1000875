//! Collaborator traits consumed by the bot loops.
//!
//! The bot never talks to the game directly. Navigation, map queries,
//! fort interaction, encounters and the inventory are all behind these
//! traits; a live protocol client or the in-memory `haxton-sim` world
//! implements them.
//!
//! Uses native async fn in traits (RPITIT, Rust 2024 edition). Every
//! future is `Send` so loops and per-item units can be spawned onto the
//! runtime. Implementations must be internally synchronized: all loops
//! share one client and call it concurrently without any locking of
//! their own.

use std::future::Future;

use haxton_types::{
    CatchOutcome, CreatureId, EncounterResult, FortDetails, FortId, FortReward, FortSummary,
    GeoCoordinate, ItemKind, ItemStack, OwnedCreature, RecycleRule, Sighting, Species,
};

use crate::error::ClientError;

/// Callback awaited by [`Navigation::walk_to`] after every movement step.
///
/// The walker awaits each call to completion before taking the next step,
/// so a hook is never run concurrently with itself for one walk.
pub trait StepHook: Send + Sync {
    /// Run once per movement step.
    fn on_step(&self) -> impl Future<Output = ()> + Send;
}

/// A hook that does nothing, for walks without side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStepHook;

impl StepHook for NoStepHook {
    async fn on_step(&self) {}
}

/// Player position and movement.
pub trait Navigation: Send + Sync + 'static {
    /// The player's current position.
    fn current_location(&self) -> GeoCoordinate;

    /// Walk to `target` at `speed_kmh`, awaiting `hook` after each step.
    fn walk_to<H: StepHook>(
        &self,
        target: GeoCoordinate,
        speed_kmh: f64,
        hook: &H,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Map queries around the player.
pub trait MapProvider: Send + Sync + 'static {
    /// All forts currently known around the player.
    fn forts(&self) -> impl Future<Output = Result<Vec<FortSummary>, ClientError>> + Send;

    /// Wild creatures near the player, closest first.
    fn nearby_sightings_closest_first(
        &self,
    ) -> impl Future<Output = Result<Vec<Sighting>, ClientError>> + Send;
}

/// Fort interaction.
pub trait FortClient: Send + Sync + 'static {
    /// Resolve a fort's identity (name).
    fn fort_details(
        &self,
        id: &FortId,
        location: GeoCoordinate,
    ) -> impl Future<Output = Result<FortDetails, ClientError>> + Send;

    /// Search (spin) a fort and claim its reward.
    fn search_fort(
        &self,
        id: &FortId,
        location: GeoCoordinate,
    ) -> impl Future<Output = Result<FortReward, ClientError>> + Send;
}

/// Encounter and capture resolution.
pub trait EncounterResolver: Send + Sync + 'static {
    /// Start an encounter with a sighted creature.
    fn encounter(
        &self,
        sighting: &Sighting,
    ) -> impl Future<Output = Result<EncounterResult, ClientError>> + Send;

    /// Try to capture the creature of a successful encounter.
    fn catch(
        &self,
        encounter: &EncounterResult,
        sighting: &Sighting,
    ) -> impl Future<Output = Result<CatchOutcome, ClientError>> + Send;
}

/// Items and owned creatures.
pub trait Inventory: Send + Sync + 'static {
    /// Every item stack in the bag.
    fn items(&self) -> impl Future<Output = Result<Vec<ItemStack>, ClientError>> + Send;

    /// Duplicates the inventory would release under the given policy.
    ///
    /// Which copy of a species is kept is decided here, not by the bot.
    fn duplicates_for_transfer(
        &self,
        keep_evolvable: bool,
        prioritize_iv: bool,
        protected: &[Species],
    ) -> impl Future<Output = Result<Vec<OwnedCreature>, ClientError>> + Send;

    /// Release a creature. Irreversible.
    fn transfer(&self, id: CreatureId) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Creatures that can evolve now, limited to `filter` when non-empty
    /// and, when `min_iv` is set, to those at or above that IV percentage.
    fn creatures_to_evolve(
        &self,
        filter: &[Species],
        min_iv: Option<f64>,
    ) -> impl Future<Output = Result<Vec<OwnedCreature>, ClientError>> + Send;

    /// Evolve a creature.
    fn evolve(&self, id: CreatureId) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Consume one lucky egg.
    fn use_lucky_egg(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Stacks to discard under `rules`, with the count to discard.
    fn items_to_recycle(
        &self,
        rules: &[RecycleRule],
    ) -> impl Future<Output = Result<Vec<ItemStack>, ClientError>> + Send;

    /// Discard `count` items of `kind`.
    fn recycle(
        &self,
        kind: ItemKind,
        count: u32,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Everything the bot needs from the game, in one bound.
pub trait GameClient: Navigation + MapProvider + FortClient + EncounterResolver + Inventory {}

impl<T> GameClient for T where T: Navigation + MapProvider + FortClient + EncounterResolver + Inventory
{}
