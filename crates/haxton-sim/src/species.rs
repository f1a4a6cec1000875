//! The species the simulated world spawns, and what they evolve into.

use haxton_types::Species;

/// Candy spent by one evolution.
pub const EVOLVE_CANDY_COST: u32 = 12;

/// Candy granted per capture.
pub const CANDY_PER_CATCH: u32 = 3;

/// Candy granted per transfer.
pub const CANDY_PER_TRANSFER: u32 = 1;

/// `(species, evolves into)` pairs.
const EVOLUTIONS: &[(&str, &str)] = &[
    ("pidgey", "pidgeotto"),
    ("pidgeotto", "pidgeot"),
    ("rattata", "raticate"),
    ("caterpie", "metapod"),
    ("metapod", "butterfree"),
    ("weedle", "kakuna"),
    ("kakuna", "beedrill"),
    ("spearow", "fearow"),
    ("zubat", "golbat"),
    ("drowzee", "hypno"),
    ("psyduck", "golduck"),
    ("magikarp", "gyarados"),
    ("eevee", "vaporeon"),
];

/// Species that appear in the wild, with relative spawn weights.
pub const WILD_SPAWNS: &[(&str, u32)] = &[
    ("pidgey", 30),
    ("rattata", 25),
    ("weedle", 15),
    ("caterpie", 15),
    ("spearow", 12),
    ("zubat", 12),
    ("drowzee", 8),
    ("psyduck", 8),
    ("magikarp", 10),
    ("eevee", 5),
    ("snorlax", 1),
    ("lapras", 1),
];

/// The species `species` evolves into, if any.
pub fn evolution_of(species: &Species) -> Option<Species> {
    EVOLUTIONS
        .iter()
        .find(|(from, _)| *from == species.as_str())
        .map(|(_, to)| Species::new(to))
}

/// The evolution family a species draws candy from (its base form).
pub fn family_of(species: &Species) -> Species {
    let mut current = species.as_str();
    while let Some((from, _)) = EVOLUTIONS.iter().find(|(_, to)| *to == current) {
        current = from;
    }
    Species::new(current)
}

/// Pick a wild species from a uniform draw in `[0, total_weight)`.
pub fn wild_species_at(mut draw: u32) -> Species {
    for (name, weight) in WILD_SPAWNS {
        if draw < *weight {
            return Species::new(name);
        }
        draw = draw.saturating_sub(*weight);
    }
    Species::new("pidgey")
}

/// Sum of the wild spawn weights.
pub fn total_spawn_weight() -> u32 {
    WILD_SPAWNS
        .iter()
        .fold(0_u32, |total, (_, weight)| total.saturating_add(*weight))
}
