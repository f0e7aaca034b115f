//! Per-connection message routing.
//!
//! Each accepted connection gets its own task running
//! [`handle_connection`]. Every inbound frame goes through the same
//! pipeline: parse at the protocol boundary, dispatch to the
//! coordinator, answer or fan out. Nothing a client sends can close
//! its own connection; bad frames are answered with an `ERROR` reply
//! and the loop keeps reading.

use std::sync::Arc;

use muster_lobby::LobbyError;
use muster_protocol::{parse_client, reply, ClientMessage, ProtocolError, ServerMessage, UserId};
use muster_transport::{Connection, FrameSender};

use crate::broadcast::send_to;
use crate::coordinator::Coordinator;
use crate::MusterError;

/// Handles a single connection from accept to close.
///
/// Tracks which identity the connection is acting as (set by its first
/// successful `CREATE_LOBBY` or `JOIN_LOBBY`) and runs disconnect
/// teardown for that identity when the transport closes, cleanly or
/// not.
pub(crate) async fn handle_connection<C: Connection>(
    coordinator: Arc<Coordinator>,
    mut conn: C,
) {
    let conn_id = conn.id();
    let outbound = conn.outbound();
    tracing::debug!(%conn_id, "connection open");

    let mut bound: Option<UserId> = None;

    loop {
        let frame = match conn.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "connection errored");
                break;
            }
        };

        let message = match parse_client(&frame) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "inbound frame rejected");
                send_error(&outbound, parse_reply(&e));
                continue;
            }
        };

        dispatch(&coordinator, &outbound, &mut bound, message).await;
    }

    if let Some(user_id) = bound {
        coordinator.disconnect(user_id, conn_id).await;
    }
}

/// Routes one parsed message to the coordinator and maps domain
/// failures onto the fixed reply strings.
async fn dispatch(
    coordinator: &Coordinator,
    outbound: &FrameSender,
    bound: &mut Option<UserId>,
    message: ClientMessage,
) {
    match message {
        ClientMessage::CreateLobby { user_id, username } => {
            rebind(coordinator, outbound, bound, user_id).await;
            match coordinator.create_lobby(outbound, user_id, &username).await {
                Ok(()) => *bound = Some(user_id),
                Err(MusterError::Lobby(e)) => {
                    tracing::debug!(%user_id, error = %e, "create refused");
                    send_error(outbound, &e.to_string());
                }
                Err(e) => tracing::warn!(%user_id, error = %e, "create failed"),
            }
        }

        ClientMessage::JoinLobby {
            code,
            user_id,
            username,
        } => {
            rebind(coordinator, outbound, bound, user_id).await;
            match coordinator.join_lobby(outbound, &code, user_id, &username).await {
                Ok(()) => *bound = Some(user_id),
                Err(MusterError::Lobby(
                    e @ (LobbyError::NotFound(_) | LobbyError::AlreadyStarted(_)),
                )) => {
                    tracing::debug!(%code, %user_id, error = %e, "join refused");
                    send_error(outbound, reply::INVALID_OR_STARTED_LOBBY);
                }
                Err(MusterError::Lobby(e)) => {
                    tracing::debug!(%code, %user_id, error = %e, "join refused");
                    send_error(outbound, &e.to_string());
                }
                Err(e) => tracing::warn!(%code, %user_id, error = %e, "join failed"),
            }
        }

        ClientMessage::StartGame {
            lobby_code,
            user_id,
        } => match coordinator.start_game(&lobby_code, user_id).await {
            Ok(()) => {}
            Err(MusterError::Lobby(
                e @ (LobbyError::NotFound(_) | LobbyError::NotHost(_)),
            )) => {
                tracing::debug!(code = %lobby_code, %user_id, error = %e, "start refused");
                send_error(outbound, reply::ONLY_HOST_STARTS);
            }
            Err(MusterError::Lobby(e)) => {
                tracing::debug!(code = %lobby_code, %user_id, error = %e, "start refused");
                send_error(outbound, &e.to_string());
            }
            Err(e) => tracing::warn!(code = %lobby_code, %user_id, error = %e, "start failed"),
        },

        ClientMessage::UpdateUser {
            code,
            user_id,
            score,
            health,
        } => {
            // Updates never answer on the wire: an unknown lobby or an
            // unseated user is dropped the same way a valid update is
            // acknowledged only by its broadcast.
            if let Err(e) = coordinator.update_user(&code, user_id, score, health).await {
                tracing::debug!(%code, %user_id, error = %e, "update dropped");
            }
        }
    }
}

/// Releases the connection's previous identity before it acts as a new
/// one, so a socket switching identities never leaves a stale registry
/// binding or an abandoned seat behind.
async fn rebind(
    coordinator: &Coordinator,
    outbound: &FrameSender,
    bound: &mut Option<UserId>,
    user_id: UserId,
) {
    if let Some(previous) = *bound {
        if previous != user_id {
            tracing::debug!(%previous, next = %user_id, "connection switching identity");
            coordinator.disconnect(previous, outbound.connection_id()).await;
            *bound = None;
        }
    }
}

/// Picks the fixed reply string for a frame that failed to parse.
fn parse_reply(err: &ProtocolError) -> &'static str {
    match err {
        ProtocolError::UnknownType(_) => reply::UNKNOWN_TYPE,
        _ => reply::INVALID_FORMAT,
    }
}

/// Sends an `ERROR` reply to one connection. Best-effort: a gone
/// connection just drops it.
fn send_error(outbound: &FrameSender, message: &str) {
    let reply = ServerMessage::Error {
        message: message.to_owned(),
    };
    if let Err(e) = send_to(outbound, &reply) {
        tracing::warn!(error = %e, "error reply failed to encode");
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Router tests run [`handle_connection`] against an in-memory
    //! connection: frames go in through a channel, replies come back
    //! out through the connection's outbound queue.

    use super::*;
    use std::time::Duration;

    use muster_transport::ConnectionId;
    use tokio::sync::mpsc;

    struct FakeConnection {
        id: ConnectionId,
        inbound: mpsc::UnboundedReceiver<String>,
        sender: FrameSender,
    }

    impl Connection for FakeConnection {
        type Error = muster_transport::TransportError;

        async fn recv(&mut self) -> Result<Option<String>, Self::Error> {
            Ok(self.inbound.recv().await)
        }

        fn outbound(&self) -> FrameSender {
            self.sender.clone()
        }

        fn id(&self) -> ConnectionId {
            self.id
        }
    }

    struct TestClient {
        inbound: mpsc::UnboundedSender<String>,
        replies: mpsc::UnboundedReceiver<String>,
        task: tokio::task::JoinHandle<()>,
    }

    impl TestClient {
        /// Spawns a router task over a fake connection.
        fn spawn(coordinator: &Arc<Coordinator>, conn: u64) -> Self {
            let (in_tx, in_rx) = mpsc::unbounded_channel();
            let (out_tx, out_rx) = mpsc::unbounded_channel();
            let id = ConnectionId::new(conn);
            let connection = FakeConnection {
                id,
                inbound: in_rx,
                sender: FrameSender::new(id, out_tx),
            };
            let task = tokio::spawn(handle_connection(
                Arc::clone(coordinator),
                connection,
            ));
            Self {
                inbound: in_tx,
                replies: out_rx,
                task,
            }
        }

        fn send(&self, frame: impl Into<String>) {
            self.inbound.send(frame.into()).expect("router gone");
        }

        async fn next(&mut self) -> serde_json::Value {
            let frame = tokio::time::timeout(Duration::from_secs(2), self.replies.recv())
                .await
                .expect("timed out waiting for a reply")
                .expect("connection produced no reply");
            serde_json::from_str(&frame).expect("frames are JSON")
        }

        /// Closes the inbound side and waits for the router to finish
        /// its teardown.
        async fn close(self) -> mpsc::UnboundedReceiver<String> {
            drop(self.inbound);
            self.task.await.expect("router task panicked");
            self.replies
        }
    }

    fn new_coordinator() -> Arc<Coordinator> {
        Arc::new(Coordinator::new(Default::default()))
    }

    async fn create_lobby(client: &mut TestClient, user: u64, name: &str) -> String {
        client.send(format!(
            r#"{{"type":"CREATE_LOBBY","payload":{{"userId":{user},"username":"{name}"}}}}"#
        ));
        let reply = client.next().await;
        assert_eq!(reply["type"], "LOBBY_CREATED");
        reply["payload"]["code"].as_str().unwrap().to_owned()
    }

    fn join_frame(code: &str, user: u64, name: &str) -> String {
        format!(
            r#"{{"type":"JOIN_LOBBY","payload":{{"code":"{code}","userId":{user},"username":"{name}"}}}}"#
        )
    }

    #[tokio::test]
    async fn test_garbage_frame_gets_format_error() {
        let coordinator = new_coordinator();
        let mut client = TestClient::spawn(&coordinator, 1);

        client.send("this is not json");

        let reply = client.next().await;
        assert_eq!(reply["type"], "ERROR");
        assert_eq!(reply["payload"]["message"], "Invalid message format.");
    }

    #[tokio::test]
    async fn test_unknown_tag_gets_unknown_type_error() {
        let coordinator = new_coordinator();
        let mut client = TestClient::spawn(&coordinator, 1);

        client.send(r#"{"type":"DANCE","payload":{}}"#);

        let reply = client.next().await;
        assert_eq!(reply["type"], "ERROR");
        assert_eq!(reply["payload"]["message"], "Unknown message type.");
    }

    #[tokio::test]
    async fn test_bad_frame_does_not_close_the_connection() {
        let coordinator = new_coordinator();
        let mut client = TestClient::spawn(&coordinator, 1);

        client.send("garbage");
        let reply = client.next().await;
        assert_eq!(reply["type"], "ERROR");

        // The same connection still works.
        let code = create_lobby(&mut client, 1, "Alice").await;
        assert_eq!(code.len(), 4);
    }

    #[tokio::test]
    async fn test_join_unknown_code_gets_fixed_reply() {
        let coordinator = new_coordinator();
        let mut client = TestClient::spawn(&coordinator, 1);

        client.send(join_frame("ZZZZ", 2, "Bob"));

        let reply = client.next().await;
        assert_eq!(reply["type"], "ERROR");
        assert_eq!(reply["payload"]["message"], "Invalid or started lobby.");
    }

    #[tokio::test]
    async fn test_close_reaps_the_hosts_lobby() {
        let coordinator = new_coordinator();
        let mut host = TestClient::spawn(&coordinator, 1);
        let code = create_lobby(&mut host, 1, "Alice").await;

        host.close().await;

        // The join code is dead once the host's teardown has run.
        let mut guest = TestClient::spawn(&coordinator, 2);
        guest.send(join_frame(&code, 2, "Bob"));
        let reply = guest.next().await;
        assert_eq!(reply["type"], "ERROR");
        assert_eq!(reply["payload"]["message"], "Invalid or started lobby.");
    }

    #[tokio::test]
    async fn test_identity_switch_releases_the_previous_identity() {
        let coordinator = new_coordinator();
        let mut client = TestClient::spawn(&coordinator, 1);

        // The connection acts as user 1, then as user 2. User 1's
        // lobby must be torn down when the identity switches.
        let first = create_lobby(&mut client, 1, "Alice").await;
        let second = create_lobby(&mut client, 2, "Alina").await;
        assert_ne!(first, second);

        let mut guest = TestClient::spawn(&coordinator, 2);
        guest.send(join_frame(&first, 3, "Bob"));
        let reply = guest.next().await;
        assert_eq!(reply["payload"]["message"], "Invalid or started lobby.");

        guest.send(join_frame(&second, 3, "Bob"));
        let reply = guest.next().await;
        assert_eq!(reply["type"], "PLAYER_JOINED");
    }

    #[tokio::test]
    async fn test_update_for_unknown_lobby_is_silent() {
        let coordinator = new_coordinator();
        let mut client = TestClient::spawn(&coordinator, 1);

        client.send(
            r#"{"type":"UPDATE_USER","payload":{"code":"ZZZZ","userId":1,"score":5,"health":5}}"#,
        );

        // Nothing comes back for the bad update; the next reply on the
        // wire is for the create that follows it.
        let code = create_lobby(&mut client, 1, "Alice").await;
        assert_eq!(code.len(), 4);
    }
}
