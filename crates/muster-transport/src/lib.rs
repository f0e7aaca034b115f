//! Transport abstraction layer for Muster.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract
//! over the network protocol, plus [`FrameSender`], the cloneable handle
//! through which every outbound frame leaves the process.
//!
//! # Outbound buffering
//!
//! A connection's write half is owned by a dedicated writer task; frames
//! are handed to it through an unbounded queue. That makes
//! [`FrameSender::send`] a synchronous, never-blocking enqueue, so code
//! fanning a message out to a whole lobby can't be stalled by one slow
//! or dead peer. The sender is cheap to clone and safe to hold in maps
//! long after the connection is gone (sends to a gone connection just
//! return `false`).
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

use tokio::sync::mpsc;

/// Opaque identifier for a connection.
///
/// Distinct from user identity: one user may be seen on several
/// connections over time (reconnects, superseded sockets), and the id
/// is what tells those sockets apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A handle for enqueueing outbound text frames on one connection.
///
/// Cloning is cheap (it clones an `mpsc` sender). Dropping every clone
/// is what tells the connection's writer task to close the socket.
#[derive(Debug, Clone)]
pub struct FrameSender {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<String>,
}

impl FrameSender {
    /// Wraps a raw queue sender. The transport implementation calls
    /// this when it sets up a connection's writer task; tests call it
    /// to stand in for one.
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<String>) -> Self {
        FrameSender { id, tx }
    }

    /// Enqueues one frame. Never blocks.
    ///
    /// Returns `false` when the connection's writer is gone; the frame
    /// is dropped in that case and the caller decides whether that
    /// matters (fan-out code treats it as a skip).
    pub fn send(&self, frame: impl Into<String>) -> bool {
        self.tx.send(frame.into()).is_ok()
    }

    /// True once the connection's writer task has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// The connection this handle feeds.
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// The read side of a single connection.
///
/// Writing doesn't live here: grab a [`FrameSender`] via
/// [`outbound`](Connection::outbound) and enqueue through that. The
/// split is what lets one task read a connection while any number of
/// others (broadcasts, direct replies) write to it without locking.
pub trait Connection: Send + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Receives the next text frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&mut self) -> Result<Option<String>, Self::Error>;

    /// A fresh handle onto this connection's outbound queue.
    fn outbound(&self) -> FrameSender;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
