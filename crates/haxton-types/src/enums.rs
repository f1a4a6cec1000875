//! Enumeration types shared between the bot and its collaborators.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A kind of inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Basic capture ball.
    PokeBall,
    /// Improved capture ball.
    GreatBall,
    /// High-grade capture ball.
    UltraBall,
    /// Capture ball that never misses.
    MasterBall,
    /// Restores 20 HP.
    Potion,
    /// Restores 50 HP.
    SuperPotion,
    /// Restores 200 HP.
    HyperPotion,
    /// Fully restores HP.
    MaxPotion,
    /// Revives a fainted creature at half HP.
    Revive,
    /// Revives a fainted creature at full HP.
    MaxRevive,
    /// Makes the next catch attempt easier.
    RazzBerry,
    /// Doubles experience earned for 30 minutes.
    LuckyEgg,
    /// Attracts wild creatures to the player.
    Incense,
    /// Attracts wild creatures to a fort.
    LureModule,
}

impl ItemKind {
    /// Human-readable name used in log lines.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::PokeBall => "Poke Ball",
            Self::GreatBall => "Great Ball",
            Self::UltraBall => "Ultra Ball",
            Self::MasterBall => "Master Ball",
            Self::Potion => "Potion",
            Self::SuperPotion => "Super Potion",
            Self::HyperPotion => "Hyper Potion",
            Self::MaxPotion => "Max Potion",
            Self::Revive => "Revive",
            Self::MaxRevive => "Max Revive",
            Self::RazzBerry => "Razz Berry",
            Self::LuckyEgg => "Lucky Egg",
            Self::Incense => "Incense",
            Self::LureModule => "Lure Module",
        }
    }
}

impl core::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Encounters
// ---------------------------------------------------------------------------

/// Status returned when attempting to encounter a sighted creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterStatus {
    /// The encounter started; a capture may be attempted.
    Success,
    /// This sighting was already encountered. Benign.
    AlreadyHappened,
    /// The sighting no longer exists.
    NotFound,
    /// The encounter window has closed.
    Closed,
    /// The creature fled before the encounter started.
    PokemonFled,
    /// The player is too far away.
    NotInRange,
    /// No room left for another creature.
    InventoryFull,
    /// Unspecified server-side error.
    Error,
}

impl EncounterStatus {
    /// Whether a capture can follow this status.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Whether this status is an expected outcome that needs no warning.
    pub const fn is_benign(self) -> bool {
        matches!(self, Self::Success | Self::AlreadyHappened)
    }
}

impl core::fmt::Display for EncounterStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Success => "EncounterSuccess",
            Self::AlreadyHappened => "EncounterAlreadyHappened",
            Self::NotFound => "EncounterNotFound",
            Self::Closed => "EncounterClosed",
            Self::PokemonFled => "PokemonFled",
            Self::NotInRange => "EncounterNotInRange",
            Self::InventoryFull => "PokemonInventoryFull",
            Self::Error => "EncounterError",
        };
        f.write_str(s)
    }
}

/// Result of a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchOutcome {
    /// The creature was caught and added to the collection.
    Caught,
    /// The creature broke free; another throw may succeed.
    Escaped,
    /// The creature fled.
    Fled,
    /// The throw missed.
    Missed,
    /// Unspecified server-side error.
    Error,
}
