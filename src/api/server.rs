use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{config::ServerConfig, errors::Error};

use super::routes::{build_router, ApiState};

/// Serve the API on the configured address until Ctrl-C.
pub async fn start_api_server(config: &ServerConfig, state: ApiState) -> crate::Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| Error::config(format!("Invalid API address: {}", e)))?;

    let router = build_router(state, config);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::transport(format!("Failed to bind API server: {}", e)))?;

    info!(address = %addr, "Starting HTTP API server");
    serve(listener, router, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "API server shutdown listener failed");
        }
    })
    .await?;

    info!("API server shutdown completed");
    Ok(())
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> crate::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::transport(format!("API server error: {}", e)))
}
