//! Socket binding and the serve loop.

use std::future::Future;
use std::net::SocketAddr;

use gateway::Gateway;
use tokio::net::TcpListener;
use tracing::info;

use crate::{router, ListenerError};

/// Binds the listening socket.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ListenerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })
}

/// Serves `gateway` on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish after `shutdown` fires.
pub async fn serve<F>(listener: TcpListener, gateway: Gateway, shutdown: F) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, providers = ?gateway.configured_providers(), "interview gateway listening");
    }

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ListenerError::Serve)?;

    info!("interview gateway stopped");
    Ok(())
}
