//! Lobby-wide fan-out.
//!
//! A broadcast encodes its message once and enqueues the same frame on
//! every participant's live connection. Enqueues never block, so one
//! dead or slow peer cannot hold up delivery to the rest of the lobby.

use muster_lobby::Lobby;
use muster_protocol::{encode_server, ProtocolError, ServerMessage};
use muster_session::ConnectionRegistry;
use muster_transport::FrameSender;

/// Encodes `message` and enqueues it on a single connection.
///
/// Returns `false` when the connection's writer is already gone.
pub(crate) fn send_to(
    sender: &FrameSender,
    message: &ServerMessage,
) -> Result<bool, ProtocolError> {
    let frame = encode_server(message)?;
    Ok(sender.send(frame))
}

/// Encodes `message` once and enqueues it for every participant of
/// `lobby` that has a live registry binding, in seating order.
///
/// Participants with no binding, or whose connection writer is gone,
/// are skipped; a partial audience is normal during churn. Returns how
/// many connections accepted the frame.
pub(crate) fn broadcast(
    lobby: &Lobby,
    registry: &ConnectionRegistry,
    message: &ServerMessage,
) -> Result<usize, ProtocolError> {
    let frame = encode_server(message)?;
    let mut delivered = 0;

    for participant in lobby.participants() {
        if let Some(sender) = registry.lookup(&participant.user_id) {
            if sender.send(frame.clone()) {
                delivered += 1;
            }
        }
    }

    Ok(delivered)
}
