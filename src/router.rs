//! Radix-tree request router with an introspectable route table.
//!
//! One [`matchit`] tree per HTTP method for dispatch, plus the list of
//! registered routes in registration order so that
//! [`RouteCatalog`](crate::RouteCatalog) can read it back.
//!
//! Paths use `:name` parameters and a trailing `*` wildcard. A path of `"*"`
//! registers the method's fallback handler.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::catalog::{RouteEntry, RouteSource};
use crate::handler::{BoxFuture, BoxedHandler, Handler, Service};
use crate::pattern::to_matchit;
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// ```rust
/// # use route_metrics::{Request, Response, Router};
/// # async fn get_user(_: Request) -> Response { Response::text("") }
/// # async fn create_user(_: Request) -> Response { Response::text("") }
/// let app = Router::new()
///     .get("/users/:id", get_user)
///     .post("/users",    create_user);
/// ```
#[derive(Default)]
pub struct Router {
    trees: HashMap<Method, MatchitRouter<BoxedHandler>>,
    fallbacks: HashMap<Method, BoxedHandler>,
    table: Vec<RouteEntry>,
}

impl Router {
    pub fn new() -> Self { Self::default() }

    /// Register a handler for a method + path pair.
    ///
    /// # Panics
    ///
    /// Panics if `path` conflicts with an already-registered path for the
    /// same method, or is not a valid route.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        let handler: BoxedHandler = Arc::new(handler);
        if path == "*" {
            self.fallbacks.insert(method.clone(), handler);
        } else {
            self.trees
                .entry(method.clone())
                .or_default()
                .insert(to_matchit(path), handler)
                .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        }
        self.record(method, path);
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self { self.on(Method::GET, path, handler) }
    pub fn post(self, path: &str, handler: impl Handler) -> Self { self.on(Method::POST, path, handler) }
    pub fn put(self, path: &str, handler: impl Handler) -> Self { self.on(Method::PUT, path, handler) }
    pub fn patch(self, path: &str, handler: impl Handler) -> Self { self.on(Method::PATCH, path, handler) }
    pub fn delete(self, path: &str, handler: impl Handler) -> Self { self.on(Method::DELETE, path, handler) }

    // A path registered for several methods is listed once, at its first
    // position, with every method it answers.
    fn record(&mut self, method: Method, path: &str) {
        match self.table.iter_mut().find(|e| e.path == path) {
            Some(entry) if entry.methods.contains(&method) => {}
            Some(entry) => entry.methods.push(method),
            None => self.table.push(RouteEntry::new(path, [method])),
        }
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let routed = self.trees.get(method).and_then(|tree| tree.at(path).ok());
        match routed {
            Some(matched) => {
                let params = matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                Some((Arc::clone(matched.value), params))
            }
            None => self.fallbacks.get(method).map(|h| (Arc::clone(h), HashMap::new())),
        }
    }
}

impl RouteSource for Router {
    fn routes(&self) -> Vec<RouteEntry> {
        self.table.clone()
    }
}

impl Service for Router {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req)
            }
            None => Box::pin(async { Response::status(StatusCode::NOT_FOUND) }),
        }
    }
}
