//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Bind the listener
//! - Hand the engine to the HTTP server and run until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Routes must be registered before this is called; the engine is frozen
//!   here

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::engine::Engine;
use crate::http::HttpServer;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Error raised while bringing the server up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Serve `engine` with `config` until `shutdown` fires.
pub async fn serve(engine: Engine, config: ServerConfig, shutdown: ShutdownSignal) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    tracing::info!(
        address = %listener.local_addr()?,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        "Listening for connections"
    );

    HttpServer::new(engine, config).run(listener, shutdown).await?;
    Ok(())
}
