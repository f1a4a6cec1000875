//! Type-safe identifier wrappers.
//!
//! Forts are identified by the opaque string the game server hands out,
//! owned creatures and encounters by 64-bit numbers. Keeping them in
//! distinct newtypes prevents passing a creature id where an encounter
//! id is expected.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a `u64` identifier.
macro_rules! define_numeric_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Return the inner numeric value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

define_numeric_id! {
    /// Unique identifier for a creature owned by the player.
    CreatureId
}

define_numeric_id! {
    /// Identifier of a wild encounter, shared by the sighting and the
    /// encounter result that follows it.
    EncounterId
}

/// Identifier of a fort (point of interest) on the map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FortId(pub String);

impl FortId {
    /// Create a fort id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for FortId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A creature species, stored lowercase (`"pidgey"`, `"magikarp"`).
///
/// Species names from configuration are normalized on deserialization so
/// `Pidgey` in a YAML list matches `pidgey` reported by the map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Species(String);

impl Species {
    /// Create a species from a name, normalizing to lowercase.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// Borrow the normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Species {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<&str> for Species {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<Species> for String {
    fn from(species: Species) -> Self {
        species.0
    }
}

impl core::fmt::Display for Species {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
