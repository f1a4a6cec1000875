//! Error types for the `haxton-sim` crate.

use haxton_core::error::ClientError;
use haxton_types::{CreatureId, EncounterId, FortId, ItemKind, Species};

/// Errors raised by operations on the simulated world.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// No fort with this id exists.
    #[error("fort not found: {0}")]
    UnknownFort(FortId),

    /// No owned creature with this id exists.
    #[error("creature not found: {0}")]
    UnknownCreature(CreatureId),

    /// No encounter with this id exists.
    #[error("encounter not found: {0}")]
    UnknownEncounter(EncounterId),

    /// The bag holds fewer items than the operation needs.
    #[error("not enough {kind}: have {have}, need {need}")]
    NotEnoughItems {
        /// Item kind.
        kind: ItemKind,
        /// Count held.
        have: u32,
        /// Count required.
        need: u32,
    },

    /// No ball of any kind is left to throw.
    #[error("no balls left")]
    NoBalls,

    /// The creature cannot evolve (final form or not enough candy).
    #[error("{species} ({id}) cannot evolve")]
    CannotEvolve {
        /// The creature.
        id: CreatureId,
        /// Its species.
        species: Species,
    },

    /// A capture was attempted without a successful encounter first.
    #[error("encounter {0} was not started")]
    EncounterNotStarted(EncounterId),

    /// Walking speed must be positive and finite.
    #[error("invalid walking speed: {0} km/h")]
    InvalidSpeed(f64),
}

impl From<SimError> for ClientError {
    fn from(err: SimError) -> Self {
        match &err {
            SimError::UnknownFort(_)
            | SimError::UnknownCreature(_)
            | SimError::UnknownEncounter(_) => Self::NotFound {
                what: err.to_string(),
            },
            SimError::NotEnoughItems { .. }
            | SimError::NoBalls
            | SimError::CannotEvolve { .. }
            | SimError::EncounterNotStarted(_)
            | SimError::InvalidSpeed(_) => Self::Rejected {
                message: err.to_string(),
            },
        }
    }
}
