//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! Each accepted socket is split in two. The read half stays with the
//! [`WebSocketConnection`] and backs [`recv`](Connection::recv); the
//! write half moves into a spawned writer task that drains the
//! connection's outbound queue. The writer exits (and closes the
//! socket) once every [`FrameSender`] clone for the connection has been
//! dropped.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::{Connection, ConnectionId, FrameSender, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsReader = SplitStream<WebSocketStream<TcpStream>>;
type WsWriter = SplitSink<WebSocketStream<TcpStream>, Message>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    ///
    /// Binding to port 0 asks the OS for a free port; read it back with
    /// [`local_addr`](WebSocketTransport::local_addr).
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::Bind)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }

    /// The address the listener actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(TransportError::LocalAddr)
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted WebSocket connection");

        let (writer, reader) = ws.split();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(drain_outbound(id, writer, rx));

        Ok(WebSocketConnection {
            id,
            reader,
            outbound: FrameSender::new(id, tx),
        })
    }
}

/// Writer task: forwards queued frames onto the socket until every
/// sender is gone or the peer stops accepting writes, then closes.
async fn drain_outbound(
    id: ConnectionId,
    mut writer: WsWriter,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = writer.send(Message::Text(frame.into())).await {
            tracing::debug!(%id, error = %e, "outbound write failed, dropping connection");
            return;
        }
    }
    // All senders dropped: nothing will ever be queued again.
    let _ = writer.send(Message::Close(None)).await;
    tracing::debug!(%id, "outbound writer finished");
}

/// The server-side read half of one WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    reader: WsReader,
    outbound: FrameSender,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn recv(&mut self) -> Result<Option<String>, Self::Error> {
        loop {
            match self.reader.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().to_owned()));
                }
                // Some client libraries send JSON as binary frames.
                // Pass the bytes through; validation happens at the
                // protocol layer either way.
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(
                        String::from_utf8_lossy(&data).into_owned(),
                    ));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::Receive(e.to_string()));
                }
            }
        }
    }

    fn outbound(&self) -> FrameSender {
        self.outbound.clone()
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
