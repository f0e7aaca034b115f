//! # Muster
//!
//! Real-time game lobby coordinator over WebSockets.
//!
//! Muster accepts persistent bidirectional connections from game
//! clients, groups them into short-lived lobbies identified by a
//! four-character join code, tracks each participant's live score and
//! health, and fans every state change out to the whole lobby.
//!
//! ```text
//!   client ── ws ──┐
//!   client ── ws ──┼─▶ transport ─▶ router ─▶ coordinator ─┬─▶ lobby directory
//!   client ── ws ──┘   (frames)    (parse,   (one lock,    └─▶ connection registry
//!                                  dispatch)  fan-out)
//! ```
//!
//! Everything in-memory, single process: lobby state does not survive a
//! restart, and identities are trusted as sent (callers validate them
//! upstream).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use muster::prelude::*;
//!
//! # async fn demo() -> Result<(), MusterError> {
//! let server = LobbyServer::builder()
//!     .bind("127.0.0.1:9000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod broadcast;
mod coordinator;
mod error;
mod router;
mod server;

pub use coordinator::{Coordinator, CoordinatorConfig};
pub use error::MusterError;
pub use server::{LobbyServer, LobbyServerBuilder};

/// Single import for everything a server embedder usually needs.
pub mod prelude {
    pub use crate::coordinator::{Coordinator, CoordinatorConfig};
    pub use crate::error::MusterError;
    pub use crate::server::{LobbyServer, LobbyServerBuilder};

    pub use muster_lobby::{LobbyConfig, LobbyError, StartPolicy};
    pub use muster_protocol::{
        reply, ClientMessage, LobbyCode, Participant, ServerMessage, UserId,
    };
    pub use muster_transport::{ConnectionId, FrameSender};
}
