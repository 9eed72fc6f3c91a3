//! Route groups and the registration surface.
//!
//! # Responsibilities
//! - Track each group's prefix, own middleware and parent
//! - Flatten ancestor middleware into a chain at registration time
//! - Provide `get`/`post`/... sugar over a single `add_route`
//!
//! # Design Decisions
//! - Groups live in an engine-owned registry and are addressed by `GroupId`;
//!   a group never owns its parent
//! - Middleware is looked up when a route is registered, not snapshotted when
//!   a group is created, so `use_middleware` on a parent affects later
//!   registrations in every descendant
//! - Chains already registered are never rewritten

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::Method;

use crate::dispatch::{Context, HandlerFunc};
use crate::engine::Engine;
use crate::routing::RouteError;

/// Handle to a group inside one engine.
///
/// Carries the identity of the registry that issued it, so an id from one
/// engine is never accepted by another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId {
    registry: usize,
    index: usize,
}

static NEXT_REGISTRY: AtomicUsize = AtomicUsize::new(0);

struct GroupRecord {
    prefix: String,
    middleware: Vec<HandlerFunc>,
    parent: Option<GroupId>,
}

/// All groups created from one engine. Index 0 is the root.
pub(crate) struct GroupRegistry {
    id: usize,
    records: Vec<GroupRecord>,
}

impl GroupRegistry {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed),
            records: vec![GroupRecord {
                prefix: String::new(),
                middleware: Vec::new(),
                parent: None,
            }],
        }
    }

    pub(crate) fn root(&self) -> GroupId {
        GroupId {
            registry: self.id,
            index: 0,
        }
    }

    pub(crate) fn contains(&self, id: GroupId) -> bool {
        id.registry == self.id && id.index < self.records.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    fn create(&mut self, parent: GroupId, prefix: &str, middleware: Vec<HandlerFunc>) -> GroupId {
        let prefix = format!("{}{}", self.records[parent.index].prefix, prefix);
        tracing::debug!(prefix = %prefix, middleware = middleware.len(), "Route group created");

        self.records.push(GroupRecord {
            prefix,
            middleware,
            parent: Some(parent),
        });
        GroupId {
            registry: self.id,
            index: self.records.len() - 1,
        }
    }

    fn prefix(&self, id: GroupId) -> &str {
        &self.records[id.index].prefix
    }

    fn extend(&mut self, id: GroupId, middleware: impl IntoIterator<Item = HandlerFunc>) {
        self.records[id.index].middleware.extend(middleware);
    }

    /// Middleware for a route in `id`, root first, `id`'s own last.
    fn middleware_for(&self, id: GroupId) -> Vec<HandlerFunc> {
        let mut lineage = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            lineage.push(current);
            cursor = self.records[current.index].parent;
        }

        lineage
            .iter()
            .rev()
            .flat_map(|g| self.records[g.index].middleware.iter().cloned())
            .collect()
    }
}

/// A group borrowed from its engine for registration.
pub struct RouterGroup<'e> {
    engine: &'e mut Engine,
    id: GroupId,
}

impl<'e> RouterGroup<'e> {
    pub(crate) fn new(engine: &'e mut Engine, id: GroupId) -> Self {
        Self { engine, id }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Full prefix, including every ancestor's.
    pub fn prefix(&self) -> &str {
        self.engine.groups().prefix(self.id)
    }

    /// Append middleware to this group's own list.
    pub fn use_middleware<I>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = HandlerFunc>,
    {
        self.engine.groups_mut().extend(self.id, middleware);
        self
    }

    /// Create a child group with its own prefix and middleware.
    pub fn group<I>(&mut self, prefix: &str, middleware: I) -> RouterGroup<'_>
    where
        I: IntoIterator<Item = HandlerFunc>,
    {
        let id = self
            .engine
            .groups_mut()
            .create(self.id, prefix, middleware.into_iter().collect());
        RouterGroup::new(&mut *self.engine, id)
    }
}

impl Routes for RouterGroup<'_> {
    fn add_route(
        &mut self,
        method: Method,
        path: &str,
        handler: HandlerFunc,
    ) -> Result<&mut Self, RouteError> {
        let pattern = format!("{}{}", self.prefix(), path);
        let mut chain = self.engine.groups().middleware_for(self.id);
        chain.push(handler);

        self.engine
            .router_mut()
            .add_route(method, &pattern, Arc::from(chain))?;
        Ok(self)
    }
}

/// Route registration surface shared by [`Engine`] and [`RouterGroup`].
pub trait Routes {
    /// Register `handler` behind the group's inherited middleware.
    fn add_route(
        &mut self,
        method: Method,
        path: &str,
        handler: HandlerFunc,
    ) -> Result<&mut Self, RouteError>;

    fn handle<F>(&mut self, method: Method, path: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(method, path, Arc::new(handler))
    }

    fn get<F>(&mut self, path: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::GET, path, handler)
    }

    fn post<F>(&mut self, path: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::POST, path, handler)
    }

    fn put<F>(&mut self, path: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::PUT, path, handler)
    }

    fn patch<F>(&mut self, path: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::PATCH, path, handler)
    }

    fn delete<F>(&mut self, path: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::DELETE, path, handler)
    }

    fn head<F>(&mut self, path: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::HEAD, path, handler)
    }

    fn options<F>(&mut self, path: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle(Method::OPTIONS, path, handler)
    }

    /// Register the same handler for every common method.
    fn any<F>(&mut self, path: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        let handler: HandlerFunc = Arc::new(handler);
        let methods = [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ];
        for method in methods {
            self.add_route(method, path, Arc::clone(&handler))?;
        }
        Ok(self)
    }
}
