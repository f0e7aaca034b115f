//! Core wire types for the Muster lobby protocol.
//!
//! Everything in this module travels on the wire as JSON: identity
//! newtypes, the participant snapshot, and the two message catalogues
//! (client to server, server to client). The JSON shapes are a frozen
//! contract with deployed game clients, so the serde attributes here are
//! load-bearing and every shape is pinned down by a test below.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a user.
///
/// A newtype wrapper around `u64`: you cannot pass a raw number (or a
/// lobby code) where a `UserId` is expected, even though the wire
/// representation is just a number.
///
/// `#[serde(transparent)]` tells serde to serialize the inner value
/// directly, so `UserId(42)` becomes `42` in JSON, not `{"0": 42}`.
/// Clients send plain numeric ids and expect plain numeric ids back.
///
/// Identity is pre-validated by whatever hands the id to a client; the
/// lobby layer never checks it against an account store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// `tracing::info!("user {} joined", user_id)` prints "user U-42 joined".
impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// The join code that names a lobby, e.g. `"7F2K"`.
///
/// Same newtype pattern, wrapping `String` this time. Codes are short
/// uppercase alphanumeric strings generated server-side; clients echo
/// them back verbatim (no trimming or case folding happens anywhere, a
/// lowercase echo simply misses).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyCode(pub String);

impl LobbyCode {
    /// Borrows the code as a plain `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LobbyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LobbyCode {
    fn from(code: &str) -> Self {
        LobbyCode(code.to_owned())
    }
}

impl From<String> for LobbyCode {
    fn from(code: String) -> Self {
        LobbyCode(code)
    }
}

// ---------------------------------------------------------------------------
// Participant — one user's live state inside a lobby
// ---------------------------------------------------------------------------

/// Score a participant carries when they first enter a lobby.
pub const STARTING_SCORE: i32 = 0;

/// Health a participant carries when they first enter a lobby.
pub const STARTING_HEALTH: i32 = 5;

/// One user's live state inside a lobby.
///
/// This is the unit that roster broadcasts carry: every `PLAYER_JOINED`,
/// `GAME_STARTED`, and `USER_UPDATED` message contains the full array of
/// these, in join order.
///
/// `#[serde(rename_all = "camelCase")]` maps the Rust field `user_id` to
/// the JSON key `userId`, which is what the client SDK reads. `score` and
/// `health` are whatever the owning client last reported; the server
/// stores them verbatim and never recomputes or clamps them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// The user this entry belongs to.
    pub user_id: UserId,
    /// Display name, chosen by the client.
    pub username: String,
    /// Current score as last reported by the owning client.
    pub score: i32,
    /// Current health as last reported by the owning client.
    pub health: i32,
}

impl Participant {
    /// A fresh entry with the starting stats.
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Participant {
            user_id,
            username: username.into(),
            score: STARTING_SCORE,
            health: STARTING_HEALTH,
        }
    }
}

// ---------------------------------------------------------------------------
// Client → server messages
// ---------------------------------------------------------------------------

/// Everything a client can ask the coordinator to do.
///
/// `#[serde(tag = "type", content = "payload")]` produces the adjacently
/// tagged envelope the clients speak:
///
/// ```text
/// { "type": "JOIN_LOBBY", "payload": { "code": "7F2K", "userId": 2, "username": "Bob" } }
/// ```
///
/// The variant-level `rename` pins the SCREAMING_SNAKE tag strings, and
/// `rename_all = "camelCase"` on each variant maps the payload fields.
/// Note the inconsistency between `code` and `lobbyCode`: `START_GAME`
/// historically used a different key than the other lobby-addressed
/// messages, and deployed clients still send it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// "Open a new lobby with me as host."
    #[serde(rename = "CREATE_LOBBY", rename_all = "camelCase")]
    CreateLobby { user_id: UserId, username: String },

    /// "Put me in the lobby with this code."
    #[serde(rename = "JOIN_LOBBY", rename_all = "camelCase")]
    JoinLobby {
        code: LobbyCode,
        user_id: UserId,
        username: String,
    },

    /// "Begin the match for this lobby."
    #[serde(rename = "START_GAME", rename_all = "camelCase")]
    StartGame {
        lobby_code: LobbyCode,
        user_id: UserId,
    },

    /// "Here are my current stats."
    /// The server trusts these values as sent.
    #[serde(rename = "UPDATE_USER", rename_all = "camelCase")]
    UpdateUser {
        code: LobbyCode,
        user_id: UserId,
        score: i32,
        health: i32,
    },
}

// ---------------------------------------------------------------------------
// Server → client messages
// ---------------------------------------------------------------------------

/// Everything the coordinator can tell a client.
///
/// Same adjacently tagged envelope as [`ClientMessage`]. Two payload
/// shapes to watch for, both frozen by deployed clients:
///
/// - `PLAYER_JOINED` and `USER_UPDATED` carry the roster as a **bare
///   array** (`"payload": [ ... ]`), which the newtype variants below
///   produce;
/// - `GAME_STARTED` wraps the same roster in an object under a
///   `players` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Reply to `CREATE_LOBBY`, sent to the creator only.
    #[serde(rename = "LOBBY_CREATED", rename_all = "camelCase")]
    LobbyCreated {
        code: LobbyCode,
        user_id: UserId,
        username: String,
    },

    /// Roster after a join, broadcast to the whole lobby.
    #[serde(rename = "PLAYER_JOINED")]
    PlayerJoined(Vec<Participant>),

    /// The match has begun, broadcast to the whole lobby.
    #[serde(rename = "GAME_STARTED")]
    GameStarted { players: Vec<Participant> },

    /// Roster after a stats update, broadcast to the whole lobby.
    #[serde(rename = "USER_UPDATED")]
    UserUpdated(Vec<Participant>),

    /// Something went wrong; sent only to the offending connection.
    /// `message` is one of the strings in [`reply`].
    #[serde(rename = "ERROR")]
    Error { message: String },
}

/// Exact reply strings deployed clients match on.
///
/// These are compared character for character on the client side, so
/// they must never be reworded. Domain errors are mapped onto them at
/// the routing layer.
pub mod reply {
    /// The frame was not a well-formed `{type, payload}` envelope, or
    /// the payload did not match the schema for its type.
    pub const INVALID_FORMAT: &str = "Invalid message format.";

    /// The envelope's `type` tag is not in the catalogue.
    pub const UNKNOWN_TYPE: &str = "Unknown message type.";

    /// Join failed: no such lobby, or it already started.
    pub const INVALID_OR_STARTED_LOBBY: &str = "Invalid or started lobby.";

    /// Start failed: lobby missing, or the requester may not start it.
    pub const ONLY_HOST_STARTS: &str = "Only host can start the game.";
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Wire-shape tests.
    //!
    //! The JSON produced here is read by client SDKs that were shipped
    //! long ago, so these assert exact shapes (tag strings, key casing,
    //! bare-array vs wrapped payloads), not just round-trips.

    use super::*;

    use serde_json::{json, Value};

    // =====================================================================
    // Identity types: UserId, LobbyCode
    // =====================================================================

    #[test]
    fn test_user_id_serializes_as_plain_number() {
        // `#[serde(transparent)]` means UserId(42) → `42`, not `{"0":42}`.
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_user_id_deserializes_from_plain_number() {
        let id: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(id, UserId(42));
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId(7).to_string(), "U-7");
    }

    #[test]
    fn test_lobby_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&LobbyCode::from("7F2K")).unwrap();
        assert_eq!(json, "\"7F2K\"");
    }

    #[test]
    fn test_lobby_code_display_is_verbatim() {
        assert_eq!(LobbyCode::from("AB12").to_string(), "AB12");
    }

    // =====================================================================
    // Participant
    // =====================================================================

    #[test]
    fn test_new_participant_starts_with_default_stats() {
        let p = Participant::new(UserId(1), "Alice");
        assert_eq!(p.score, STARTING_SCORE);
        assert_eq!(p.health, STARTING_HEALTH);
        assert_eq!(p.username, "Alice");
    }

    #[test]
    fn test_participant_wire_shape_is_camel_case() {
        // The client reads `userId`, not `user_id`. Exactly four keys.
        let p = Participant::new(UserId(1), "Alice");
        let value: Value = serde_json::to_value(&p).unwrap();

        assert_eq!(
            value,
            json!({ "userId": 1, "username": "Alice", "score": 0, "health": 5 })
        );
    }

    #[test]
    fn test_participant_round_trip() {
        let p = Participant {
            user_id: UserId(2),
            username: "Bob".into(),
            score: 10,
            health: 4,
        };
        let text = serde_json::to_string(&p).unwrap();
        let decoded: Participant = serde_json::from_str(&text).unwrap();
        assert_eq!(p, decoded);
    }

    // =====================================================================
    // ClientMessage — one shape test per variant
    // =====================================================================

    #[test]
    fn test_create_lobby_parses_from_wire_json() {
        let text = r#"{"type":"CREATE_LOBBY","payload":{"userId":1,"username":"Alice"}}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        assert_eq!(
            msg,
            ClientMessage::CreateLobby {
                user_id: UserId(1),
                username: "Alice".into(),
            }
        );
    }

    #[test]
    fn test_join_lobby_parses_from_wire_json() {
        let text =
            r#"{"type":"JOIN_LOBBY","payload":{"code":"7F2K","userId":2,"username":"Bob"}}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinLobby {
                code: LobbyCode::from("7F2K"),
                user_id: UserId(2),
                username: "Bob".into(),
            }
        );
    }

    #[test]
    fn test_start_game_uses_lobby_code_key() {
        // START_GAME addresses the lobby as `lobbyCode`, unlike the
        // other messages. Deployed clients depend on this mismatch.
        let text = r#"{"type":"START_GAME","payload":{"lobbyCode":"7F2K","userId":1}}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        assert_eq!(
            msg,
            ClientMessage::StartGame {
                lobby_code: LobbyCode::from("7F2K"),
                user_id: UserId(1),
            }
        );
    }

    #[test]
    fn test_update_user_parses_from_wire_json() {
        let text = r#"{"type":"UPDATE_USER","payload":{"code":"7F2K","userId":2,"score":10,"health":4}}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        assert_eq!(
            msg,
            ClientMessage::UpdateUser {
                code: LobbyCode::from("7F2K"),
                user_id: UserId(2),
                score: 10,
                health: 4,
            }
        );
    }

    #[test]
    fn test_extra_payload_fields_are_ignored() {
        // Older clients send fields the server never used. Tolerated.
        let text = r#"{"type":"CREATE_LOBBY","payload":{"userId":1,"username":"Alice","avatar":"cat"}}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        assert!(matches!(msg, ClientMessage::CreateLobby { .. }));
    }

    // =====================================================================
    // ServerMessage — exact payload shapes
    // =====================================================================

    #[test]
    fn test_lobby_created_json_format() {
        let msg = ServerMessage::LobbyCreated {
            code: LobbyCode::from("7F2K"),
            user_id: UserId(1),
            username: "Alice".into(),
        };
        let value: Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "LOBBY_CREATED");
        assert_eq!(value["payload"]["code"], "7F2K");
        assert_eq!(value["payload"]["userId"], 1);
        assert_eq!(value["payload"]["username"], "Alice");
    }

    #[test]
    fn test_player_joined_payload_is_bare_roster_array() {
        // The newtype variant serializes the Vec directly: the payload
        // is `[ ... ]`, not `{"players": [ ... ]}`.
        let msg = ServerMessage::PlayerJoined(vec![
            Participant::new(UserId(1), "Alice"),
            Participant::new(UserId(2), "Bob"),
        ]);
        let value: Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "PLAYER_JOINED");
        assert!(value["payload"].is_array());
        assert_eq!(value["payload"][0]["userId"], 1);
        assert_eq!(value["payload"][1]["username"], "Bob");
    }

    #[test]
    fn test_game_started_payload_wraps_players() {
        // GAME_STARTED is the one roster message with an object payload.
        let msg = ServerMessage::GameStarted {
            players: vec![Participant::new(UserId(1), "Alice")],
        };
        let value: Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "GAME_STARTED");
        assert!(value["payload"]["players"].is_array());
        assert_eq!(value["payload"]["players"][0]["health"], 5);
    }

    #[test]
    fn test_user_updated_payload_is_bare_roster_array() {
        let msg = ServerMessage::UserUpdated(vec![Participant {
            user_id: UserId(2),
            username: "Bob".into(),
            score: 10,
            health: 4,
        }]);
        let value: Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "USER_UPDATED");
        assert_eq!(
            value["payload"],
            json!([{ "userId": 2, "username": "Bob", "score": 10, "health": 4 }])
        );
    }

    #[test]
    fn test_error_json_format() {
        let msg = ServerMessage::Error {
            message: reply::UNKNOWN_TYPE.to_owned(),
        };
        let value: Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "ERROR");
        assert_eq!(value["payload"]["message"], "Unknown message type.");
    }
}
