//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Resolved route (chain + params)
//!     → context.rs (per-request state, cursor at 0)
//!     → next() / abort() walk the chain
//!     → response.rs (buffered status, headers, body)
//!     → Response handed back to the transport
//! ```
//!
//! # Design Decisions
//! - Context is owned by one request; no sharing, no locks
//! - Abort is a cursor jump, not unwinding
//! - Panics are not caught here (see `middleware::recovery`)

pub mod context;
pub mod handler;
pub mod response;

pub use context::Context;
pub use handler::{handler, HandlerFunc, HandlersChain};
pub use response::ResponseWriter;
