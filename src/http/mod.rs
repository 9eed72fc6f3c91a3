//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (hyper via axum::serve)
//!     → tower-http layers (request ID, trace, timeout)
//!     → server.rs dispatch (fallback service for every path)
//!     → request.rs (buffer body within limit)
//!     → Engine::serve_request on the blocking pool
//!     → Response back to the client
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
