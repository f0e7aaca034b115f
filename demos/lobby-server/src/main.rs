//! Runnable lobby coordinator.
//!
//! Binds the address given as the first argument (default
//! `127.0.0.1:9000`) and serves lobbies until Ctrl-C. Log verbosity
//! comes from `RUST_LOG`, e.g. `RUST_LOG=muster=debug`.

use muster::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), MusterError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:9000".to_string());

    let server = LobbyServer::builder().bind(&addr).build().await?;
    tracing::info!(%addr, "lobby server listening");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
