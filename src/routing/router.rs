//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the ordered route table
//! - Apply the wrong-universe rule before any lookup
//! - Resolve (method, path) to a handler, or to a 404/405 response
//!
//! # Design Decisions
//! - Immutable after construction (shared across tasks without locks)
//! - First pattern whose shape matches wins; no fallthrough on method
//! - 405 bodies list the matched pattern's methods in registration order

use std::sync::Arc;

use serde_json::json;

use crate::handlers;
use crate::http::method::Method;
use crate::http::request::{Headers, ParsedRequest};
use crate::http::response::Response;
use crate::pot::PotStore;
use crate::routing::matcher::PathPattern;

/// Route handler: pot store, captured pot id (if any), request headers.
pub type Handler = fn(&PotStore, Option<&str>, &Headers) -> Response;

/// A path pattern and the handlers registered for it.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: PathPattern,
    handlers: Vec<(Method, Handler)>,
}

impl Route {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: PathPattern::new(pattern),
            handlers: Vec::new(),
        }
    }

    /// Register `handler` for `method`, replacing an earlier registration.
    pub fn on(mut self, method: Method, handler: Handler) -> Self {
        match self.handlers.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((method, handler)),
        }
        self
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Methods this route answers, in registration order.
    pub fn allowed(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|(m, _)| m.as_str()).collect()
    }

    fn handler(&self, method: &str) -> Option<Handler> {
        let method = Method::from_token(method)?;
        self.handlers
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, h)| *h)
    }
}

/// The HTCPCP dispatcher.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
    store: Arc<PotStore>,
}

impl Router {
    /// An empty router over `store`.
    pub fn new(store: Arc<PotStore>) -> Self {
        Self {
            routes: Vec::new(),
            store,
        }
    }

    /// Append a route. Earlier routes take precedence.
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// The standard HTCPCP route table.
    pub fn htcpcp(store: Arc<PotStore>) -> Self {
        Self::new(store)
            .route(
                Route::new("/coffee/{id}")
                    .on(Method::Brew, handlers::brew)
                    .on(Method::Post, handlers::brew),
            )
            .route(Route::new("/coffee/{id}/status").on(Method::Get, handlers::status))
            .route(Route::new("/coffee/{id}/history").on(Method::Get, handlers::history))
            .route(Route::new("/coffee/{id}/additions").on(Method::Propfind, handlers::additions))
            .route(Route::new("/coffee/{id}/stop-milk").on(Method::When, handlers::stop_milk))
            .route(Route::new("/").on(Method::Get, handlers::registry))
    }

    pub fn store(&self) -> &Arc<PotStore> {
        &self.store
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Turn a parsed request into a response. Never fails.
    pub fn dispatch(&self, request: &ParsedRequest) -> Response {
        let method = request.method.as_str();
        let path = request.path.as_str();

        if method == Method::Brew.as_str() && !path.starts_with("/coffee/") {
            tracing::warn!(method, path, status_code = 418, "BREW outside the coffee universe");
            return handlers::wrong_universe(path);
        }

        for route in &self.routes {
            let Some(matched) = route.pattern.matches(path) else {
                continue;
            };

            return match route.handler(method) {
                Some(handler) => handler(&self.store, matched.id.as_deref(), &request.headers),
                None => {
                    tracing::debug!(method, path, pattern = route.pattern.as_str(), "Method not allowed");
                    Response::json(
                        405,
                        json!({
                            "error": "Method Not Allowed",
                            "allowed": route.allowed(),
                        }),
                    )
                }
            };
        }

        tracing::debug!(method, path, "No route matched");
        Response::json(404, json!({"error": "Not Found", "path": path}))
    }
}
