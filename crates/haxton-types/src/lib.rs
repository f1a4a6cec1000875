//! Shared type definitions for the Haxton bot.
//!
//! Every value the orchestrator exchanges with its collaborators (map,
//! navigation, forts, encounters, inventory) is defined here so the core
//! crate and any client implementation agree on one vocabulary.
//!
//! # Modules
//!
//! - [`geo`] -- Coordinates and great-circle distance
//! - [`ids`] -- Strongly-typed identifiers for forts, creatures, encounters
//! - [`enums`] -- Item kinds, encounter statuses, catch outcomes
//! - [`structs`] -- Forts, rewards, sightings, item stacks, owned creatures

pub mod enums;
pub mod geo;
pub mod ids;
pub mod structs;

pub use enums::{CatchOutcome, EncounterStatus, ItemKind};
pub use geo::{EARTH_RADIUS_METERS, GeoCoordinate, distance_in_meters};
pub use ids::{CreatureId, EncounterId, FortId, Species};
pub use structs::{
    EncounterResult, FortDetails, FortReward, FortSummary, ItemAward, ItemStack, OwnedCreature,
    RecycleRule, Sighting, summarize_awards,
};
