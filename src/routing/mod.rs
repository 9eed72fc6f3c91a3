//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (before serving):
//!     group.rs (prefix + inherited middleware)
//!     → pattern.rs (parse & validate)
//!     → router.rs (per-method tree, lazily created)
//!     → tree.rs (insert)
//!
//! Incoming Request (method, path)
//!     → router.rs (pick tree by method)
//!     → tree.rs (literal > param > wildcard, with backtracking)
//!     → Return: pattern + params + handler chain, or a miss
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable while serving
//! - Malformed patterns fail at registration, never at request time
//! - Deterministic: same input always matches same route

pub mod group;
pub mod pattern;
pub mod router;
pub mod tree;

pub use group::{GroupId, RouterGroup, Routes};
pub use pattern::{Params, Pattern, Segment};
pub use router::{Resolved, RouteInfo, RouteMiss, Router};
pub use tree::Tree;

/// Error raised when a route pattern cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("pattern {0:?} must begin with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern {0:?} contains an empty segment")]
    EmptySegment(String),

    #[error("pattern {0:?} has a parameter or wildcard without a name")]
    EmptyName(String),

    #[error("wildcard must be the last segment in pattern {0:?}")]
    WildcardNotLast(String),

    #[error("name {name:?} appears more than once in pattern {pattern:?}")]
    DuplicateName { pattern: String, name: String },
}
