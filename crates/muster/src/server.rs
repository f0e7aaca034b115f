//! `LobbyServer` builder and accept loop.
//!
//! This is the entry point for running a lobby coordinator. It ties
//! together all the layers: transport → protocol → session → lobby.

use std::net::SocketAddr;
use std::sync::Arc;

use muster_lobby::StartPolicy;
use muster_transport::{Transport, WebSocketTransport};

use crate::coordinator::{Coordinator, CoordinatorConfig};
use crate::router::handle_connection;
use crate::MusterError;

/// Builder for configuring and starting a lobby server.
///
/// # Example
///
/// ```rust,no_run
/// use muster::prelude::*;
///
/// # async fn demo() -> Result<(), MusterError> {
/// let server = LobbyServer::builder()
///     .bind("0.0.0.0:9000")
///     .start_policy(StartPolicy::HostOnly)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct LobbyServerBuilder {
    bind_addr: String,
    config: CoordinatorConfig,
}

impl LobbyServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            config: CoordinatorConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole coordinator configuration.
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets who may start a game.
    pub fn start_policy(mut self, policy: StartPolicy) -> Self {
        self.config.lobby.start_policy = policy;
        self
    }

    /// Sets whether a disconnect evicts the user from their lobby.
    pub fn evict_on_disconnect(mut self, evict: bool) -> Self {
        self.config.evict_on_disconnect = evict;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<LobbyServer, MusterError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let coordinator = Arc::new(Coordinator::new(self.config));
        Ok(LobbyServer {
            transport,
            coordinator,
        })
    }
}

impl Default for LobbyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running lobby coordinator.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct LobbyServer {
    transport: WebSocketTransport,
    coordinator: Arc<Coordinator>,
}

impl LobbyServer {
    /// Creates a new builder.
    pub fn builder() -> LobbyServerBuilder {
        LobbyServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, MusterError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a router task for each.
    /// Accept failures are logged and never stop the loop; runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), MusterError> {
        tracing::info!("lobby server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let coordinator = Arc::clone(&self.coordinator);
                    tokio::spawn(handle_connection(coordinator, conn));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
