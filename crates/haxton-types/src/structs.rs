//! Entity structs exchanged with the bot's collaborators.
//!
//! None of these are owned by the bot: they are snapshots produced by the
//! map, fort, encounter and inventory clients and dropped after use.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{EncounterStatus, ItemKind};
use crate::geo::GeoCoordinate;
use crate::ids::{CreatureId, EncounterId, FortId, Species};

/// Sum of the three individual attribute maxima (15 each).
const MAX_INDIVIDUAL_TOTAL: f64 = 45.0;

// ---------------------------------------------------------------------------
// Forts
// ---------------------------------------------------------------------------

/// A fort as listed by the map: enough to rank and travel to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FortSummary {
    /// Fort identifier.
    pub id: FortId,
    /// Where the fort stands.
    pub location: GeoCoordinate,
}

/// Resolved fort identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FortDetails {
    /// Fort identifier.
    pub id: FortId,
    /// Display name.
    pub name: String,
    /// Where the fort stands.
    pub location: GeoCoordinate,
}

/// A quantity of one item kind handed out by a fort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAward {
    /// Item kind awarded.
    pub kind: ItemKind,
    /// How many were awarded.
    pub quantity: u32,
}

/// The reward record produced by searching a fort.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FortReward {
    /// Experience points awarded. Zero means the search yielded nothing
    /// (fort on cooldown or out of range).
    pub experience: u32,
    /// Premium currency awarded.
    pub gems: u32,
    /// Items awarded, possibly with repeated kinds.
    pub items: Vec<ItemAward>,
}

/// Render an award list as `"3 x Poke Ball, 1 x Potion"`.
///
/// Repeated kinds are summed. Kinds appear in [`ItemKind`] order.
/// An empty list renders as `"nothing"`.
pub fn summarize_awards(items: &[ItemAward]) -> String {
    let mut summed: BTreeMap<ItemKind, u32> = BTreeMap::new();
    for award in items {
        let entry = summed.entry(award.kind).or_insert(0);
        *entry = entry.saturating_add(award.quantity);
    }
    if summed.is_empty() {
        return "nothing".to_owned();
    }
    summed
        .iter()
        .map(|(kind, count)| format!("{count} x {kind}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Wild creatures
// ---------------------------------------------------------------------------

/// A wild creature reported near the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    /// Encounter handle for this sighting.
    pub encounter_id: EncounterId,
    /// Spawn point the creature appeared at.
    pub spawn_point_id: String,
    /// Creature species.
    pub species: Species,
    /// Where the creature is.
    pub location: GeoCoordinate,
}

/// Outcome of an encounter attempt, carrying what a capture needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterResult {
    /// Status reported by the server.
    pub status: EncounterStatus,
    /// Encounter handle to capture with.
    pub encounter_id: EncounterId,
    /// Capture probability for a basic ball, when reported.
    pub capture_probability: Option<f64>,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A stack of identical items in the player's bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item kind.
    pub kind: ItemKind,
    /// Number held (or, from a recycle query, number to discard).
    pub count: u32,
}

/// Discard policy entry: keep at most `keep` items of `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecycleRule {
    /// Item kind the rule applies to.
    pub kind: ItemKind,
    /// Maximum to keep; the excess is discarded.
    pub keep: u32,
}

/// A creature in the player's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCreature {
    /// Collection identifier.
    pub id: CreatureId,
    /// Species.
    pub species: Species,
    /// Combat power.
    pub cp: u32,
    /// Individual attack value (0-15).
    pub individual_attack: u8,
    /// Individual defense value (0-15).
    pub individual_defense: u8,
    /// Individual stamina value (0-15).
    pub individual_stamina: u8,
    /// Whether enough candy is held to evolve it.
    pub can_evolve: bool,
}

impl OwnedCreature {
    /// Quality percentile (IV) in `[0, 100]`.
    pub fn perfection(&self) -> f64 {
        let total = u32::from(self.individual_attack)
            .saturating_add(u32::from(self.individual_defense))
            .saturating_add(u32::from(self.individual_stamina));
        if total == 0 {
            return 0.0;
        }
        f64::from(total) / MAX_INDIVIDUAL_TOTAL * 100.0
    }
}
