//! A single lobby: its roster and its two-state lifecycle.

use std::fmt;

use muster_protocol::{LobbyCode, Participant, UserId};

// ---------------------------------------------------------------------------
// LobbyState
// ---------------------------------------------------------------------------

/// The lifecycle state of a lobby.
///
/// There are exactly two states and one transition:
///
/// ```text
/// Waiting ──start──▶ Started
/// ```
///
/// - **Waiting**: accepting joins, match not yet running.
/// - **Started**: match running. No new joins; stats updates still
///   flow. Nothing ever moves a lobby back to Waiting; the only exit
///   from Started is the lobby being reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyState {
    Waiting,
    Started,
}

impl LobbyState {
    /// Returns `true` if the lobby is accepting new participants.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` once the match has begun.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }
}

impl fmt::Display for LobbyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Started => write!(f, "started"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

/// One lobby: a join code, a host, a roster, and a state.
///
/// The roster is a `Vec`, not a map, because join order is part of the
/// wire contract: every roster broadcast lists participants in the
/// order they joined, and clients render them that way.
///
/// Mutation goes through the directory (the methods here are
/// crate-private), which is what keeps the roster consistent with the
/// directory's membership index.
#[derive(Debug, Clone)]
pub struct Lobby {
    code: LobbyCode,
    host: UserId,
    participants: Vec<Participant>,
    state: LobbyState,
}

impl Lobby {
    /// A fresh lobby in `Waiting` with the host seated first.
    pub(crate) fn new(code: LobbyCode, host: UserId, host_name: String) -> Self {
        Lobby {
            participants: vec![Participant::new(host, host_name)],
            code,
            host,
            state: LobbyState::Waiting,
        }
    }

    /// The lobby's join code.
    pub fn code(&self) -> &LobbyCode {
        &self.code
    }

    /// The user who created the lobby. Always present in the roster
    /// while the lobby is alive.
    pub fn host(&self) -> UserId {
        self.host
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LobbyState {
        self.state
    }

    /// The roster, in join order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Whether the user currently holds a seat in this lobby.
    pub fn contains(&self, user_id: UserId) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// True when the roster is empty (only ever observed mid-teardown).
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Seats a participant, or re-seats them in place.
    ///
    /// A re-join keeps the original roster position; the entry itself
    /// (name and stats) is replaced wholesale with the fresh one.
    pub(crate) fn upsert(&mut self, participant: Participant) {
        match self
            .participants
            .iter_mut()
            .find(|p| p.user_id == participant.user_id)
        {
            Some(seat) => *seat = participant,
            None => self.participants.push(participant),
        }
    }

    /// Overwrites a participant's stats with client-reported values.
    /// Returns `false` if the user holds no seat here.
    pub(crate) fn set_stats(&mut self, user_id: UserId, score: i32, health: i32) -> bool {
        match self
            .participants
            .iter_mut()
            .find(|p| p.user_id == user_id)
        {
            Some(seat) => {
                seat.score = score;
                seat.health = health;
                true
            }
            None => false,
        }
    }

    /// Unseats a participant. Returns `false` if they weren't here.
    pub(crate) fn remove(&mut self, user_id: UserId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.user_id != user_id);
        self.participants.len() != before
    }

    /// Moves the lobby to `Started`. A second call changes nothing.
    pub(crate) fn start(&mut self) {
        self.state = LobbyState::Started;
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use muster_protocol::{STARTING_HEALTH, STARTING_SCORE};

    fn lobby() -> Lobby {
        Lobby::new(LobbyCode::from("7F2K"), UserId(1), "Alice".to_owned())
    }

    #[test]
    fn test_state_is_joinable_only_while_waiting() {
        assert!(LobbyState::Waiting.is_joinable());
        assert!(!LobbyState::Started.is_joinable());
        assert!(LobbyState::Started.is_started());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LobbyState::Waiting.to_string(), "waiting");
        assert_eq!(LobbyState::Started.to_string(), "started");
    }

    #[test]
    fn test_new_lobby_seats_host_with_starting_stats() {
        let lobby = lobby();
        assert_eq!(lobby.host(), UserId(1));
        assert_eq!(lobby.state(), LobbyState::Waiting);
        assert_eq!(lobby.len(), 1);

        let host = &lobby.participants()[0];
        assert_eq!(host.user_id, UserId(1));
        assert_eq!(host.score, STARTING_SCORE);
        assert_eq!(host.health, STARTING_HEALTH);
    }

    #[test]
    fn test_upsert_appends_in_join_order() {
        let mut lobby = lobby();
        lobby.upsert(Participant::new(UserId(2), "Bob"));
        lobby.upsert(Participant::new(UserId(3), "Cleo"));

        let ids: Vec<UserId> =
            lobby.participants().iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![UserId(1), UserId(2), UserId(3)]);
    }

    #[test]
    fn test_upsert_existing_keeps_roster_position() {
        let mut lobby = lobby();
        lobby.upsert(Participant::new(UserId(2), "Bob"));
        lobby.set_stats(UserId(2), 10, 4);

        // Bob re-joins: same seat, fresh entry.
        lobby.upsert(Participant::new(UserId(2), "Bobby"));

        assert_eq!(lobby.len(), 2);
        let seat = &lobby.participants()[1];
        assert_eq!(seat.username, "Bobby");
        assert_eq!(seat.score, STARTING_SCORE);
        assert_eq!(seat.health, STARTING_HEALTH);
    }

    #[test]
    fn test_set_stats_without_seat_returns_false() {
        let mut lobby = lobby();
        assert!(!lobby.set_stats(UserId(9), 3, 3));
        assert!(lobby.set_stats(UserId(1), 3, 3));
        assert_eq!(lobby.participants()[0].score, 3);
    }

    #[test]
    fn test_remove_reports_whether_seated() {
        let mut lobby = lobby();
        lobby.upsert(Participant::new(UserId(2), "Bob"));

        assert!(lobby.remove(UserId(2)));
        assert!(!lobby.remove(UserId(2)));
        assert!(!lobby.contains(UserId(2)));
        assert_eq!(lobby.len(), 1);
    }

    #[test]
    fn test_start_is_one_way() {
        let mut lobby = lobby();
        lobby.start();
        assert_eq!(lobby.state(), LobbyState::Started);
        lobby.start();
        assert_eq!(lobby.state(), LobbyState::Started);
    }
}
