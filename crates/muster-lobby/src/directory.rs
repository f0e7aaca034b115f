//! The lobby directory: creates, tracks, and tears down lobbies.

use std::collections::HashMap;

use muster_protocol::{LobbyCode, Participant, UserId};

use crate::code;
use crate::config::{LobbyConfig, StartPolicy};
use crate::error::LobbyError;
use crate::lobby::Lobby;

/// What happened when a user was removed from their lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The lobby the user was removed from.
    pub code: LobbyCode,
    /// True when the whole lobby was destroyed as a result.
    pub reaped: bool,
}

/// Owns every live lobby and the index of who is in which one.
///
/// Two maps, kept in sync by every method that touches either:
///
/// - `lobbies` is the source of truth, keyed by join code;
/// - `members` maps each seated user to their lobby's code, which is
///   both the fast path for disconnect teardown and the enforcement
///   point for the one-lobby-per-user invariant.
///
/// # Concurrency note
///
/// Like the connection registry, this is a plain synchronous structure
/// with `&mut self` methods. The coordinator owns it behind a lock, so
/// generate-check-insert sequences here are atomic as long as they
/// stay inside one method call. None of them hands a candidate code
/// out before inserting it.
#[derive(Debug)]
pub struct LobbyDirectory {
    config: LobbyConfig,
    lobbies: HashMap<LobbyCode, Lobby>,
    members: HashMap<UserId, LobbyCode>,
}

impl LobbyDirectory {
    /// Creates an empty directory.
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            config,
            lobbies: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// Opens a new lobby with `host_id` seated as host.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::AlreadyInLobby`] if the host is seated anywhere.
    /// - [`LobbyError::CodeSpaceExhausted`] if no unused code turned up
    ///   within the configured attempt budget. Nothing is mutated in
    ///   either case.
    pub fn create(
        &mut self,
        host_id: UserId,
        host_name: impl Into<String>,
    ) -> Result<&Lobby, LobbyError> {
        if self.members.contains_key(&host_id) {
            return Err(LobbyError::AlreadyInLobby(host_id));
        }

        let code = self.allocate_code()?;
        self.members.insert(host_id, code.clone());
        tracing::info!(%code, host = %host_id, "lobby created");
        Ok(self
            .lobbies
            .entry(code.clone())
            .or_insert_with(|| Lobby::new(code, host_id, host_name.into())))
    }

    /// Seats a user in the lobby with this code.
    ///
    /// A user already seated in this same lobby is re-seated: their
    /// entry is replaced (fresh name, starting stats) but keeps its
    /// roster position.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::NotFound`] if no lobby has the code.
    /// - [`LobbyError::AlreadyStarted`] if the match already began.
    /// - [`LobbyError::AlreadyInLobby`] if the user is seated in a
    ///   different lobby.
    pub fn join(
        &mut self,
        code: &LobbyCode,
        user_id: UserId,
        username: impl Into<String>,
    ) -> Result<&Lobby, LobbyError> {
        let lobby = self
            .lobbies
            .get_mut(code)
            .ok_or_else(|| LobbyError::NotFound(code.clone()))?;

        if !lobby.state().is_joinable() {
            return Err(LobbyError::AlreadyStarted(code.clone()));
        }

        if let Some(current) = self.members.get(&user_id) {
            if current != code {
                return Err(LobbyError::AlreadyInLobby(user_id));
            }
        }

        lobby.upsert(Participant::new(user_id, username));
        self.members.insert(user_id, code.clone());
        tracing::info!(%code, user = %user_id, "participant joined");
        Ok(&*lobby)
    }

    /// Looks up a lobby by code.
    ///
    /// # Errors
    ///
    /// [`LobbyError::NotFound`] when absent.
    pub fn get(&self, code: &LobbyCode) -> Result<&Lobby, LobbyError> {
        self.lobbies
            .get(code)
            .ok_or_else(|| LobbyError::NotFound(code.clone()))
    }

    /// Moves a lobby to started, subject to the configured
    /// [`StartPolicy`]. Starting an already-started lobby is a no-op
    /// that still returns the lobby.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::NotFound`] if no lobby has the code.
    /// - [`LobbyError::NotHost`] under [`StartPolicy::HostOnly`] when
    ///   the requester isn't the host. The state is untouched.
    pub fn start(
        &mut self,
        code: &LobbyCode,
        requester: UserId,
    ) -> Result<&Lobby, LobbyError> {
        let lobby = self
            .lobbies
            .get_mut(code)
            .ok_or_else(|| LobbyError::NotFound(code.clone()))?;

        if self.config.start_policy == StartPolicy::HostOnly && lobby.host() != requester {
            return Err(LobbyError::NotHost(requester));
        }

        if !lobby.state().is_started() {
            lobby.start();
            tracing::info!(%code, by = %requester, "lobby started");
        }
        Ok(&*lobby)
    }

    /// Overwrites one participant's stats with client-reported values.
    ///
    /// The values are trusted as sent; nothing validates or clamps
    /// them. Returns `Ok(None)` without mutating anything when the
    /// user holds no seat in the lobby (stale updates race against
    /// evictions, so this is a normal quiet case, not an error).
    ///
    /// # Errors
    ///
    /// [`LobbyError::NotFound`] if no lobby has the code.
    pub fn update_participant(
        &mut self,
        code: &LobbyCode,
        user_id: UserId,
        score: i32,
        health: i32,
    ) -> Result<Option<&Lobby>, LobbyError> {
        let lobby = self
            .lobbies
            .get_mut(code)
            .ok_or_else(|| LobbyError::NotFound(code.clone()))?;

        if lobby.set_stats(user_id, score, health) {
            tracing::debug!(%code, user = %user_id, score, health, "stats updated");
            Ok(Some(&*lobby))
        } else {
            tracing::debug!(%code, user = %user_id, "stats update for unseated user ignored");
            Ok(None)
        }
    }

    /// Removes a user from whichever lobby they're seated in.
    ///
    /// The lobby itself is reaped when the departing user was its host
    /// or when nobody remains seated, and every remaining member is
    /// released from the membership index with it. Returns `None` when
    /// the user was seated nowhere.
    pub fn remove_participant(&mut self, user_id: UserId) -> Option<Departure> {
        let code = self.members.remove(&user_id)?;
        let lobby = self.lobbies.get_mut(&code)?;

        let was_host = lobby.host() == user_id;
        lobby.remove(user_id);

        let reaped = was_host || lobby.is_empty();
        if reaped {
            let remaining: Vec<UserId> =
                lobby.participants().iter().map(|p| p.user_id).collect();
            for member in remaining {
                self.members.remove(&member);
            }
            self.lobbies.remove(&code);
            tracing::info!(%code, "lobby reaped");
        } else {
            tracing::info!(%code, user = %user_id, "participant left");
        }

        Some(Departure { code, reaped })
    }

    /// The code of the lobby this user is seated in, if any.
    pub fn lobby_of(&self, user_id: &UserId) -> Option<&LobbyCode> {
        self.members.get(user_id)
    }

    /// Number of live lobbies.
    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    /// True when no lobby is live.
    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }

    /// Generates a code that no live lobby is using.
    ///
    /// Retries up to the configured budget; candidates never leave
    /// this directory before being claimed, so two creates can't race
    /// for the same code.
    fn allocate_code(&self) -> Result<LobbyCode, LobbyError> {
        for _ in 0..self.config.max_code_attempts {
            let candidate = code::generate(self.config.code_length);
            if !self.lobbies.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
        tracing::warn!(
            attempts = self.config.max_code_attempts,
            live = self.lobbies.len(),
            "failed to find an unused lobby code"
        );
        Err(LobbyError::CodeSpaceExhausted)
    }
}

impl Default for LobbyDirectory {
    fn default() -> Self {
        Self::new(LobbyConfig::default())
    }
}
