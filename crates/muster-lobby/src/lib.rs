//! Lobby lifecycle management for Muster.
//!
//! A lobby is a short-lived meeting point: someone creates it and gets
//! a join code, others enter with the code, everyone's live stats hang
//! off it, and it disappears when its host does. This crate owns that
//! lifecycle:
//!
//! - [`Lobby`] / [`LobbyState`] — one lobby's roster and its one-way
//!   `Waiting → Started` state machine.
//! - [`LobbyDirectory`] — all live lobbies, keyed by join code, plus
//!   the user-to-lobby index that enforces "one lobby per user".
//! - [`LobbyConfig`] / [`StartPolicy`] — code shape and who may start
//!   a match.
//!
//! Everything here is synchronous and single-owner; the coordinator
//! above wraps the directory in its lock and fans results out to
//! connections. No networking, no serialization, no timers.

mod code;
mod config;
mod directory;
mod error;
mod lobby;

pub use config::{LobbyConfig, StartPolicy};
pub use directory::{Departure, LobbyDirectory};
pub use error::LobbyError;
pub use lobby::{Lobby, LobbyState};
