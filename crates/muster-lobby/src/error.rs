//! Error types for the lobby layer.

use muster_protocol::{LobbyCode, UserId};

/// Errors that can occur while operating on lobbies.
///
/// These are domain errors, not wire errors: the routing layer decides
/// which of them become an `ERROR` frame (and with which of the fixed
/// reply strings), and which stay quiet.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// No live lobby has this code.
    #[error("no lobby with code {0}")]
    NotFound(LobbyCode),

    /// The lobby exists but its match already began.
    #[error("lobby {0} has already started")]
    AlreadyStarted(LobbyCode),

    /// The requester isn't the lobby's host, and the start policy
    /// requires them to be.
    #[error("user {0} is not the lobby host")]
    NotHost(UserId),

    /// The user is already seated in a live lobby.
    #[error("user {0} is already in a lobby")]
    AlreadyInLobby(UserId),

    /// No unused join code was found within the attempt budget.
    #[error("no unused lobby code available")]
    CodeSpaceExhausted,
}
