/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listener failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The WebSocket upgrade handshake failed.
    #[error("websocket handshake failed: {0}")]
    Handshake(String),

    /// Receiving a frame failed mid-connection.
    #[error("receive failed: {0}")]
    Receive(String),

    /// The listener's local address could not be read.
    #[error("local address unavailable: {0}")]
    LocalAddr(#[source] std::io::Error),
}
