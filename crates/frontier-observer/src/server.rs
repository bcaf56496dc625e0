//! Observer HTTP server lifecycle.
//!
//! [`start_server`] serves the router until the supplied shutdown future
//! resolves, then lets in-flight requests finish.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use frontier_core::config::ObserverConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the observer server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configured host and port do not form a socket address.
    #[error("invalid listen address {addr}: {reason}")]
    Address {
        /// The rejected `host:port` string.
        addr: String,
        /// Parser detail.
        reason: String,
    },

    /// Failed to bind the listener.
    #[error("bind failed on {addr}: {source}")]
    Bind {
        /// Address that could not be bound.
        addr: SocketAddr,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The server hit a fatal I/O error while serving.
    #[error("serve error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Resolve the listen address from configuration.
///
/// # Errors
///
/// Returns [`ServerError::Address`] if `host:port` does not parse.
pub fn listen_addr(config: &ObserverConfig) -> Result<SocketAddr, ServerError> {
    let raw = format!("{}:{}", config.host, config.port);
    raw.parse().map_err(|e: std::net::AddrParseError| ServerError::Address {
        reason: e.to_string(),
        addr: raw.clone(),
    })
}

/// Bind to the configured address and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError`] if the address is invalid, the port cannot be
/// bound, or serving fails.
pub async fn start_server<F>(
    config: &ObserverConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listen_addr(config)?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    info!(%addr, "Observer server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Observer server stopped");
    Ok(())
}
