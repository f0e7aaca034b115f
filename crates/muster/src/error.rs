//! Unified error type for the Muster meta crate.

use muster_lobby::LobbyError;
use muster_protocol::ProtocolError;
use muster_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `muster` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MusterError {
    /// A transport-level error (bind, accept, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (malformed envelope, unknown type, encode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A lobby-level error (missing lobby, start refused, seating rules).
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_protocol::LobbyCode;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::Handshake("refused".into());
        let muster_err: MusterError = err.into();
        assert!(matches!(muster_err, MusterError::Transport(_)));
        assert!(muster_err.to_string().contains("refused"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::UnknownType("DANCE".into());
        let muster_err: MusterError = err.into();
        assert!(matches!(muster_err, MusterError::Protocol(_)));
        assert!(muster_err.to_string().contains("DANCE"));
    }

    #[test]
    fn test_from_lobby_error() {
        let err = LobbyError::NotFound(LobbyCode::from("ZZZZ"));
        let muster_err: MusterError = err.into();
        assert!(matches!(muster_err, MusterError::Lobby(_)));
        assert!(muster_err.to_string().contains("ZZZZ"));
    }
}
