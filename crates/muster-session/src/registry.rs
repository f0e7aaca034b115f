//! The connection registry: who can be reached, and on which socket.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is NOT thread-safe by itself; it's a plain
//! `HashMap` owned by the coordinator and accessed under its lock.
//! Keeping it synchronous here means registration and lobby mutation
//! can share one critical section at the layer above.

use std::collections::HashMap;

use muster_protocol::UserId;
use muster_transport::{ConnectionId, FrameSender};

/// Maps each user to the outbound handle of their newest connection.
///
/// "Newest" is the operative word: a user who opens a second connection
/// (new tab, reconnect after a dropped socket) silently replaces the
/// old binding. The old socket is left alone; whatever it was doing, it
/// no longer receives anything addressed to the user.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<UserId, FrameSender>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Binds a user to a connection, superseding any existing binding.
    pub fn register(&mut self, user_id: UserId, sender: FrameSender) {
        let conn = sender.connection_id();
        if let Some(previous) = self.connections.insert(user_id, sender) {
            tracing::debug!(
                %user_id,
                old = %previous.connection_id(),
                new = %conn,
                "connection binding superseded"
            );
        } else {
            tracing::debug!(%user_id, %conn, "connection registered");
        }
    }

    /// The sender for a user's current connection, if they have one.
    pub fn lookup(&self, user_id: &UserId) -> Option<&FrameSender> {
        self.connections.get(user_id)
    }

    /// Drops a user's binding, but only if it still belongs to the
    /// closing connection.
    ///
    /// Disconnect teardown races against re-registration: by the time a
    /// dead socket's handler runs this, the user may already be bound
    /// to a newer connection, and that newer binding must survive. The
    /// `connection` guard is what distinguishes the two cases.
    ///
    /// Returns `true` if a binding was removed.
    pub fn unregister(&mut self, user_id: &UserId, connection: ConnectionId) -> bool {
        match self.connections.get(user_id) {
            Some(current) if current.connection_id() == connection => {
                self.connections.remove(user_id);
                tracing::debug!(%user_id, %connection, "connection unregistered");
                true
            }
            _ => false,
        }
    }

    /// Number of bound users.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// True when nobody is bound.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
