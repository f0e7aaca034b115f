//! The coordinator: one component that owns all mutable server state.
//!
//! Every wire operation (create, join, start, update, disconnect) is a
//! method here, and each one is a single critical section over the
//! lobby directory and the connection registry together. Fan-out runs
//! under the same lock; since sends are non-blocking enqueues, the lock
//! is never held across real I/O, and every connection observes a
//! lobby's broadcasts in the order its mutations took effect.

use muster_lobby::{LobbyConfig, LobbyDirectory};
use muster_protocol::{LobbyCode, ServerMessage, UserId};
use muster_session::ConnectionRegistry;
use muster_transport::{ConnectionId, FrameSender};
use tokio::sync::Mutex;

use crate::broadcast::{broadcast, send_to};
use crate::MusterError;

/// Tunables for a [`Coordinator`].
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Directory behavior: code shape and start policy.
    pub lobby: LobbyConfig,
    /// Whether a disconnect evicts the user from their lobby (reaping
    /// it if they were the host). On by default; turning it off leaves
    /// seats intact across reconnects, at the cost of lobbies that only
    /// die when their members come back.
    pub evict_on_disconnect: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            lobby: LobbyConfig::default(),
            evict_on_disconnect: true,
        }
    }
}

/// The state the coordinator guards. One struct so one lock covers
/// every check-then-act sequence across both maps.
#[derive(Debug, Default)]
struct CoordinatorInner {
    lobbies: LobbyDirectory,
    registry: ConnectionRegistry,
}

/// Owns the lobby directory and the connection registry behind a
/// single async mutex.
///
/// Cheap to share: the server wraps it in an `Arc` and every
/// connection task clones the handle.
#[derive(Debug)]
pub struct Coordinator {
    inner: Mutex<CoordinatorInner>,
    evict_on_disconnect: bool,
}

impl Coordinator {
    /// Creates a coordinator with the given configuration.
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            inner: Mutex::new(CoordinatorInner {
                lobbies: LobbyDirectory::new(config.lobby),
                registry: ConnectionRegistry::new(),
            }),
            evict_on_disconnect: config.evict_on_disconnect,
        }
    }

    /// Opens a lobby hosted by `user_id` and replies `LOBBY_CREATED`
    /// on `conn`. The reply goes to the creator alone; nobody else
    /// knows the lobby exists until someone joins it.
    pub async fn create_lobby(
        &self,
        conn: &FrameSender,
        user_id: UserId,
        username: &str,
    ) -> Result<(), MusterError> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;

        let code = inner.lobbies.create(user_id, username)?.code().clone();
        inner.registry.register(user_id, conn.clone());

        let reply = ServerMessage::LobbyCreated {
            code,
            user_id,
            username: username.to_owned(),
        };
        if !send_to(conn, &reply)? {
            tracing::debug!(%user_id, "creator's connection gone before the reply");
        }
        Ok(())
    }

    /// Seats `user_id` in the lobby `code` and broadcasts the updated
    /// roster as `PLAYER_JOINED` to everyone seated, joiner included.
    pub async fn join_lobby(
        &self,
        conn: &FrameSender,
        code: &LobbyCode,
        user_id: UserId,
        username: &str,
    ) -> Result<(), MusterError> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;

        let lobby = inner.lobbies.join(code, user_id, username)?;
        inner.registry.register(user_id, conn.clone());

        let roster = ServerMessage::PlayerJoined(lobby.participants().to_vec());
        let delivered = broadcast(lobby, &inner.registry, &roster)?;
        tracing::debug!(%code, %user_id, delivered, "join fanned out");
        Ok(())
    }

    /// Marks the lobby started and broadcasts `GAME_STARTED` with the
    /// final roster. Who may start is decided by the directory's
    /// configured [`StartPolicy`](muster_lobby::StartPolicy).
    pub async fn start_game(
        &self,
        code: &LobbyCode,
        user_id: UserId,
    ) -> Result<(), MusterError> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;

        let lobby = inner.lobbies.start(code, user_id)?;
        let started = ServerMessage::GameStarted {
            players: lobby.participants().to_vec(),
        };
        let delivered = broadcast(lobby, &inner.registry, &started)?;
        tracing::debug!(%code, delivered, "start fanned out");
        Ok(())
    }

    /// Overwrites `user_id`'s stats and broadcasts `USER_UPDATED`.
    ///
    /// A report for a user who is not seated in the lobby mutates
    /// nothing and sends nothing.
    pub async fn update_user(
        &self,
        code: &LobbyCode,
        user_id: UserId,
        score: i32,
        health: i32,
    ) -> Result<(), MusterError> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;

        let lobby = match inner.lobbies.update_participant(code, user_id, score, health)? {
            Some(lobby) => lobby,
            None => {
                tracing::debug!(%code, %user_id, "stats report from an unseated user dropped");
                return Ok(());
            }
        };

        let updated = ServerMessage::UserUpdated(lobby.participants().to_vec());
        let delivered = broadcast(lobby, &inner.registry, &updated)?;
        tracing::debug!(%code, %user_id, delivered, "stats fanned out");
        Ok(())
    }

    /// Tears down one connection's claim on `user_id`.
    ///
    /// The registry binding is removed only if it still points at
    /// `connection`; a binding superseded by a newer socket stays put
    /// and no eviction happens. When the binding did belong to the
    /// closing socket and eviction is enabled, the user is removed from
    /// their lobby, reaping it if that leaves it hostless or empty.
    /// Nothing goes out on the wire either way.
    pub async fn disconnect(&self, user_id: UserId, connection: ConnectionId) {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;

        if !inner.registry.unregister(&user_id, connection) {
            tracing::debug!(%user_id, %connection, "superseded connection closed, binding kept");
            return;
        }

        if !self.evict_on_disconnect {
            return;
        }

        if let Some(departure) = inner.lobbies.remove_participant(user_id) {
            tracing::info!(
                %user_id,
                code = %departure.code,
                reaped = departure.reaped,
                "participant evicted on disconnect"
            );
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
