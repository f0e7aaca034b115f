//! Lobby configuration and the start-permission policy.

// ---------------------------------------------------------------------------
// StartPolicy
// ---------------------------------------------------------------------------

/// Who may move a lobby from waiting to started.
///
/// This is a named, testable contract rather than an ad-hoc `if`,
/// because the two deployments of this protocol disagree about it:
///
/// - [`AnyParticipant`](StartPolicy::AnyParticipant) is what the
///   original service did: `START_GAME` carried a `userId` but nothing
///   ever checked it, so anyone holding the code could start the match.
///   This is the default, since deployed clients grew up against it.
/// - [`HostOnly`](StartPolicy::HostOnly) enforces what the error string
///   `"Only host can start the game."` always promised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartPolicy {
    /// Any requester may start the lobby; the `userId` on the request
    /// is logged but not verified.
    #[default]
    AnyParticipant,

    /// Only the lobby's host may start it.
    HostOnly,
}

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Configuration for the lobby directory.
#[derive(Debug, Clone)]
pub struct LobbyConfig {
    /// Length of generated join codes.
    pub code_length: usize,

    /// How many random codes to try before declaring the code space
    /// exhausted. Only matters when the directory is nearly as large
    /// as the code space itself.
    pub max_code_attempts: usize,

    /// Who may start a lobby.
    pub start_policy: StartPolicy,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            code_length: 4,
            max_code_attempts: 64,
            start_policy: StartPolicy::default(),
        }
    }
}
