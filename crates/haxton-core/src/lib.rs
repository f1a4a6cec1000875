//! Farming, catching, transfer, evolution and recycling loops for the
//! Haxton bot.
//!
//! The bot is control glue: four independent, timer-driven loops that
//! share one game client. Every hard part (the protocol, path following,
//! encounter resolution, the inventory store) lives behind the traits in
//! [`client`].
//!
//! # Modules
//!
//! - [`bot`] -- [`Bot`] orchestrator that starts every loop
//! - [`capture`] -- Catch-on-walk step hook
//! - [`client`] -- Collaborator traits ([`GameClient`] and its parts)
//! - [`control`] -- Runtime loop toggles
//! - [`error`] -- [`ClientError`] and [`BotError`]
//! - [`evolve`] -- Evolution loop
//! - [`farm`] -- Fort farming loop
//! - [`lucky_egg`] -- Experience boost activation gate
//! - [`recycle`] -- Item recycling loop
//! - [`settings`] -- YAML settings
//! - [`supervisor`] -- Supervised spawning and failure collection
//! - [`transfer`] -- Duplicate transfer loop
//!
//! [`Bot`]: bot::Bot
//! [`GameClient`]: client::GameClient
//! [`ClientError`]: error::ClientError
//! [`BotError`]: error::BotError

pub mod bot;
pub mod capture;
pub mod client;
pub mod control;
pub mod error;
pub mod evolve;
pub mod farm;
pub mod lucky_egg;
pub mod recycle;
pub mod settings;
pub mod supervisor;
pub mod transfer;

#[cfg(test)]
mod testkit;
