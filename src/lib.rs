//! jin: a minimal HTTP toolkit built around a route trie and a middleware
//! chain.
//!
//! ```text
//! transport (axum/hyper)
//!     → Engine::serve_request
//!     → Router::resolve(method, path)      literal > :param > *wildcard
//!     → Context::next()                    middleware wrap downstream
//!     → Response
//! ```
//!
//! ```no_run
//! use axum::http::StatusCode;
//! use jin::{Context, Engine, Routes};
//!
//! # fn main() -> Result<(), jin::RouteError> {
//! let mut engine = Engine::with_default_middleware();
//! engine.get("/hello/:name", |c: &mut Context| {
//!     let name = c.param("name").unwrap_or("world").to_string();
//!     c.string(StatusCode::OK, format!("hello {name}"));
//! })?;
//!
//! let mut v1 = engine.group("/v1", []);
//! v1.get("/ping", |c: &mut Context| c.json(StatusCode::OK, &serde_json::json!({ "pong": true })))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use dispatch::{handler, Context, HandlerFunc, HandlersChain};
pub use engine::Engine;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{GroupId, Params, RouteError, RouterGroup, Routes};
