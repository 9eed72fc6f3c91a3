//! Built-in chain middleware.
//!
//! Both are ordinary handlers: they do their work around a call to
//! `Context::next()`.
//!
//! - `logger()`: structured access log + request metrics
//! - `recovery()`: turns a panic downstream into a 500 abort

pub mod logger;
pub mod recovery;

pub use logger::logger;
pub use recovery::recovery;
