//! In-memory game world for running the Haxton bot without a server.
//!
//! [`SimWorld`] implements every collaborator trait from
//! `haxton_core::client`: walking moves the player in timed steps, forts
//! pay out on a cooldown, wild creatures can be encountered once and
//! caught with balls from the bag, and the inventory applies the same
//! duplicate, evolution and recycling rules the bot's loops rely on.
//! Randomness comes from a seeded RNG so a given seed always builds and
//! plays out the same world.
//!
//! # Modules
//!
//! - [`error`] -- [`SimError`] and its mapping onto client errors
//! - [`species`] -- Wild spawn weights and evolution families
//! - [`state`] -- Synchronous [`WorldState`] and its rules
//! - [`world`] -- [`SimWorld`], the async trait implementations
//!
//! [`WorldState`]: state::WorldState

pub mod error;
pub mod species;
pub mod state;
pub mod world;

pub use error::SimError;
pub use state::offset_by;
pub use world::SimWorld;
