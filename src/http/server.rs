//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the engine in an Axum fallback service
//! - Wire up tower-http layers (request ID, tracing, timeout)
//! - Buffer bodies and run the handler chain off the async workers
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::engine::Engine;
use crate::http::request::{buffer_request, BodyError, MakeRequestUuidV4};
use crate::lifecycle::ShutdownSignal;

/// State injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub max_body_bytes: usize,
}

/// Transport for a frozen [`Engine`].
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    engine: Arc<Engine>,
}

impl HttpServer {
    /// Freeze `engine` and build the Axum service around it.
    pub fn new(mut engine: Engine, config: ServerConfig) -> Self {
        if config.routing.handle_method_not_allowed {
            engine.set_handle_method_not_allowed(true);
        }

        let engine = Arc::new(engine);
        let state = AppState {
            engine: Arc::clone(&engine),
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            engine,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.engine.routes().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The Axum service, for embedding or in-process tests.
    pub fn into_router(self) -> Router {
        self.router
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

/// Hand every request to the engine.
async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let request = match buffer_request(request, state.max_body_bytes).await {
        Ok(request) => request,
        Err(e @ BodyError::TooLarge { .. }) => {
            tracing::warn!(error = %e, "Rejected request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer request body");
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    // Handlers are synchronous and may block; keep them off the async workers.
    let engine = Arc::clone(&state.engine);
    match tokio::task::spawn_blocking(move || engine.serve_request(request)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Request task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
