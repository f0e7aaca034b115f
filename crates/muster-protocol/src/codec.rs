//! Parsing and encoding of wire frames.
//!
//! One JSON document per WebSocket text frame, in both directions.
//! Decoding happens in two steps so that the two failure modes clients
//! distinguish stay distinguishable:
//!
//! 1. Validate the envelope shape: the frame must be a JSON object with
//!    a string `type` tag. Anything else is [`ProtocolError::Malformed`].
//! 2. Check the tag against the catalogue. A well-formed envelope with a
//!    tag we don't know is [`ProtocolError::UnknownType`]; a known tag
//!    whose payload doesn't match that type's schema is `Malformed`.
//!
//! A single pass through serde's tagged-enum deserializer would collapse
//! both cases into one error, which is why the raw envelope exists.

use serde::Deserialize;

use crate::error::ProtocolError;
use crate::types::{ClientMessage, ServerMessage};

/// The tag strings the catalogue accepts, used to tell "unknown type"
/// apart from "known type, bad payload".
const KNOWN_TYPES: [&str; 4] = [
    "CREATE_LOBBY",
    "JOIN_LOBBY",
    "START_GAME",
    "UPDATE_USER",
];

/// Step one of decoding: just the tag, payload left untouched.
///
/// `type` is a keyword in Rust, so the field is named `kind` and renamed
/// on the wire. serde skips the payload (and anything else) here; a
/// missing payload surfaces in step two as a schema mismatch for the
/// tag, which is the bucket clients expect it in.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
}

/// Parses one inbound text frame into a [`ClientMessage`].
///
/// # Errors
///
/// [`ProtocolError::Malformed`] when the frame is not valid JSON, is not
/// an object, lacks a string `type`, or carries a payload that does not
/// match its type's schema. [`ProtocolError::UnknownType`] when the
/// envelope is fine but the tag is not in the catalogue.
pub fn parse_client(text: &str) -> Result<ClientMessage, ProtocolError> {
    let envelope: RawEnvelope =
        serde_json::from_str(text).map_err(ProtocolError::Malformed)?;

    if !KNOWN_TYPES.contains(&envelope.kind.as_str()) {
        return Err(ProtocolError::UnknownType(envelope.kind));
    }

    // The tag is known, so any failure from here on is a payload that
    // doesn't fit the tag's schema.
    serde_json::from_str(text).map_err(ProtocolError::Malformed)
}

/// Encodes one outbound message as a text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails. With the
/// shapes in this catalogue that never happens in practice, but the
/// routing layer still logs it rather than unwrapping.
pub fn encode_server(message: &ServerMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}

// =========================================================================
// Tests
// =========================================================================
