//! Handler and chain types.

use std::sync::Arc;

use crate::dispatch::Context;

/// A middleware or terminal handler.
pub type HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// The ordered middleware plus terminal handler bound to one route.
///
/// Built once at registration and shared read-only by every request
/// dispatched to that route.
pub type HandlersChain = Arc<[HandlerFunc]>;

/// Box a closure as a [`HandlerFunc`].
pub fn handler<F>(f: F) -> HandlerFunc
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(f)
}
