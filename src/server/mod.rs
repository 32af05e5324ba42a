//! HTTP server for exchange-map
//!
//! Serves the public map API, the admin API and the browser front-end.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::service::ExchangeService;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Start the HTTP server on the configured address
///
/// Never returns unless the server shuts down
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server_addr();
    run_on(&addr, config).await
}

/// Start the HTTP server with a specific address
///
/// Loads persisted data, or reads and locates the exchange file, before
/// accepting connections. A missing exchange file starts an empty map.
pub async fn run_on(addr: &str, config: Config) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let mut service = ExchangeService::from_config(&config)?;
    match service.initialize().await {
        Ok(source) => info!("Exchange data ready ({:?})", source),
        Err(e) => warn!("Starting without exchange data: {}", e),
    }

    let state = Arc::new(AppState::new(config, service));
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}
