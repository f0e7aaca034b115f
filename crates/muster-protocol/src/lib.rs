//! Wire protocol for Muster.
//!
//! This crate defines the "language" that lobby clients and the
//! coordinator speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Participant`],
//!   the id newtypes): the structures that travel on the wire.
//! - **Codec** ([`parse_client`], [`encode_server`]): how text frames
//!   become messages and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong in between.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (text frames) and the
//! lobby domain (rosters, join codes). It knows nothing about
//! connections or lobby membership; it only knows shapes.
//!
//! ```text
//! Transport (frame) → Protocol (ClientMessage) → Coordinator (lobby state)
//! ```
//!
//! Every message is one JSON document of the form
//! `{"type": "...", "payload": ...}`. The catalogue and its exact key
//! casing are frozen by deployed clients; see the tests in `types.rs`
//! for the authoritative shapes.

mod codec;
mod error;
mod types;

pub use codec::{encode_server, parse_client};
pub use error::ProtocolError;
pub use types::{
    reply, ClientMessage, LobbyCode, Participant, ServerMessage, UserId,
    STARTING_HEALTH, STARTING_SCORE,
};
