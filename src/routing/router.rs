//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store handler chains per method
//! - Look up matching route for a request
//! - Return matched route or an explicit miss
//!
//! # Design Decisions
//! - One tree per method, created on first registration
//! - Immutable after the engine starts serving (shared via Arc, no locks)
//! - Explicit miss rather than silent default; the engine decides 404 vs 405

use std::collections::HashMap;

use axum::http::Method;

use crate::dispatch::HandlersChain;
use crate::routing::pattern::{Params, Pattern};
use crate::routing::tree::Tree;
use crate::routing::RouteError;

/// A route resolved for one request.
pub struct Resolved<'r> {
    pub pattern: &'r Pattern,
    pub params: Params,
    pub handlers: &'r HandlersChain,
}

/// Why resolution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMiss {
    /// Nothing was ever registered for this method.
    UnknownMethod,
    /// The method has routes, none of which match the path.
    NoMatch,
}

/// Summary of one registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: Method,
    pub pattern: String,
    pub handlers: usize,
}

/// Method-keyed collection of pattern trees.
#[derive(Default)]
pub struct Router {
    trees: HashMap<Method, Tree<HandlersChain>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler chain for `method` and `pattern`.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handlers: HandlersChain,
    ) -> Result<(), RouteError> {
        let parsed = Pattern::parse(pattern)?;
        let count = handlers.len();

        tracing::info!(method = %method, pattern = %pattern, handlers = count, "Route registered");

        let tree = self.trees.entry(method.clone()).or_default();
        if tree.insert(parsed, handlers).is_some() {
            tracing::warn!(method = %method, pattern = %pattern, "Route overwritten by later registration");
        }
        Ok(())
    }

    /// Resolve `method` + `path` to a handler chain.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<Resolved<'_>, RouteMiss> {
        let tree = self.trees.get(method).ok_or(RouteMiss::UnknownMethod)?;
        let found = tree.find(path).ok_or(RouteMiss::NoMatch)?;
        Ok(Resolved {
            pattern: found.pattern,
            params: found.params,
            handlers: found.value,
        })
    }

    /// True if at least one route exists for `method`.
    pub fn has_method(&self, method: &Method) -> bool {
        self.trees.contains_key(method)
    }

    /// Methods with a route matching `path`, sorted by name.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .trees
            .iter()
            .filter(|(_, tree)| tree.find(path).is_some())
            .map(|(method, _)| method.clone())
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    /// Every registered route, sorted by method then pattern.
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut routes: Vec<RouteInfo> = self
            .trees
            .iter()
            .flat_map(|(method, tree)| {
                tree.iter().map(move |(pattern, handlers)| RouteInfo {
                    method: method.clone(),
                    pattern: pattern.to_string(),
                    handlers: handlers.len(),
                })
            })
            .collect();
        routes.sort_by(|a, b| {
            a.method
                .as_str()
                .cmp(b.method.as_str())
                .then_with(|| a.pattern.cmp(&b.pattern))
        });
        routes
    }
}

impl std::fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("pattern", &self.pattern)
            .field("params", &self.params)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes()).finish()
    }
}
