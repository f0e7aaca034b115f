//! Error types for the protocol layer.
//!
//! Each crate in Muster defines its own error enum, so a
//! `ProtocolError` always means "the bytes were wrong", never "the
//! lobby was wrong" or "the socket died".

/// Errors that can occur while decoding or encoding wire frames.
///
/// `#[derive(thiserror::Error)]` generates the `std::error::Error`
/// impl; the `#[error("...")]` attributes are the log-facing text.
/// None of these strings go to clients directly: the routing layer
/// maps [`Malformed`](ProtocolError::Malformed) and
/// [`UnknownType`](ProtocolError::UnknownType) onto the fixed reply
/// strings in [`reply`](crate::reply).
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame is not valid JSON, is not an object with a string
    /// `type`, or its payload does not match the tag's schema.
    ///
    /// The inner `serde_json::Error` says which, for logs.
    #[error("malformed envelope: {0}")]
    Malformed(serde_json::Error),

    /// A well-formed envelope whose `type` tag is not in the
    /// catalogue. Carries the offending tag.
    #[error("unknown message type `{0}`")]
    UnknownType(String),

    /// Serializing an outbound message failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),
}
