//! Engine: the root group plus the shared router.
//!
//! # Responsibilities
//! - Own the router and every route group
//! - Expose the root group's registration surface
//! - Turn one buffered request into one response
//!
//! # Design Decisions
//! - Registration needs `&mut Engine`, serving needs only `&Engine`; once the
//!   engine is behind an `Arc` the routing table cannot change
//! - A miss never runs a chain: 404, or 405 when enabled and another method
//!   matches the path

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Method, Request, Response, StatusCode};

use crate::dispatch::{Context, HandlerFunc};
use crate::middleware::{logger, recovery};
use crate::routing::group::GroupRegistry;
use crate::routing::{GroupId, RouteError, RouteInfo, RouteMiss, Router, RouterGroup, Routes};

const NOT_FOUND_BODY: &str = "404 page not found";
const METHOD_NOT_ALLOWED_BODY: &str = "405 method not allowed";

pub struct Engine {
    router: Router,
    groups: GroupRegistry,
    handle_method_not_allowed: bool,
}

impl Engine {
    /// Create an engine with an empty root group.
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: GroupRegistry::new(),
            handle_method_not_allowed: false,
        }
    }

    /// Create an engine whose root group already uses `logger()` and
    /// `recovery()`.
    pub fn with_default_middleware() -> Self {
        let mut engine = Self::new();
        engine.use_middleware([logger(), recovery()]);
        engine
    }

    /// The root group.
    pub fn root(&mut self) -> RouterGroup<'_> {
        let id = self.groups.root();
        RouterGroup::new(self, id)
    }

    /// Append middleware to the root group.
    pub fn use_middleware<I>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = HandlerFunc>,
    {
        self.root().use_middleware(middleware);
        self
    }

    /// Create a top-level group.
    pub fn group<I>(&mut self, prefix: &str, middleware: I) -> RouterGroup<'_>
    where
        I: IntoIterator<Item = HandlerFunc>,
    {
        let id = self.root().group(prefix, middleware).id();
        RouterGroup::new(self, id)
    }

    /// Reopen a group created earlier from this engine.
    pub fn group_mut(&mut self, id: GroupId) -> Option<RouterGroup<'_>> {
        if self.groups.contains(id) {
            Some(RouterGroup::new(self, id))
        } else {
            None
        }
    }

    /// Answer 405 instead of 404 when the path exists under another method.
    pub fn set_handle_method_not_allowed(&mut self, enabled: bool) -> &mut Self {
        self.handle_method_not_allowed = enabled;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn routes(&self) -> Vec<RouteInfo> {
        self.router.routes()
    }

    /// Dispatch one request through its handler chain.
    pub fn serve_request(&self, request: Request<Bytes>) -> Response<Body> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        match self.router.resolve(&method, &path) {
            Ok(route) => {
                let mut context = Context::new(request, Arc::clone(route.handlers))
                    .with_route(route.pattern, route.params);
                context.next();
                context.into_response()
            }
            Err(miss) => {
                tracing::debug!(method = %method, path = %path, miss = ?miss, "No route matched");
                self.miss_response(miss, &path)
            }
        }
    }

    fn miss_response(&self, miss: RouteMiss, path: &str) -> Response<Body> {
        if self.handle_method_not_allowed {
            let allowed = self.router.allowed_methods(path);
            if !allowed.is_empty() {
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_BODY);
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(header::ALLOW, value);
                }
                return response;
            }
        }

        if miss == RouteMiss::UnknownMethod {
            tracing::trace!(path = %path, "No routes registered for method");
        }
        text_response(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
    }

    pub(crate) fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    pub(crate) fn groups_mut(&mut self) -> &mut GroupRegistry {
        &mut self.groups
    }

    pub(crate) fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("router", &self.router)
            .field("groups", &self.groups.len())
            .field("handle_method_not_allowed", &self.handle_method_not_allowed)
            .finish()
    }
}

impl Routes for Engine {
    fn add_route(
        &mut self,
        method: Method,
        path: &str,
        handler: HandlerFunc,
    ) -> Result<&mut Self, RouteError> {
        self.root().add_route(method, path, handler)?;
        Ok(self)
    }
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
