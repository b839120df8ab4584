//! The route catalog: every registered route, compiled once.
//!
//! Built from a host's introspectable route table the first time the
//! middleware sees a request. From then on it is read-only, shared by every
//! request, and consulted in registration order.

use std::fmt;

use http::Method;
use tracing::info;

use crate::error::Error;
use crate::pattern::{Matcher, MatcherFactory};

/// Paths that match everything. Never useful as a label.
const CATCH_ALL: [&str; 2] = ["/*", "*"];

/// One row of a host's route table, as the host reports it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteEntry {
    pub path: String,
    pub methods: Vec<Method>,
}

impl RouteEntry {
    pub fn new(path: impl Into<String>, methods: impl IntoIterator<Item = Method>) -> Self {
        Self { path: path.into(), methods: methods.into_iter().collect() }
    }
}

/// Anything that can list its registered routes.
///
/// [`Router`](crate::Router) implements this; so do plain lists of
/// [`RouteEntry`], which is how a foreign framework plugs in.
pub trait RouteSource {
    /// Registered routes in registration order.
    fn routes(&self) -> Vec<RouteEntry>;
}

impl RouteSource for [RouteEntry] {
    fn routes(&self) -> Vec<RouteEntry> { self.to_vec() }
}

impl RouteSource for Vec<RouteEntry> {
    fn routes(&self) -> Vec<RouteEntry> { self.clone() }
}

/// A registered route, ready for matching.
pub struct RouteDescriptor {
    pub methods: Vec<Method>,
    /// The path as the host registered it.
    pub original_path: String,
    /// `original_path` minus one trailing slash. This is the label.
    pub canonical_path: String,
    pub matcher: Box<dyn Matcher>,
}

impl RouteDescriptor {
    pub fn accepts(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("methods", &self.methods)
            .field("original_path", &self.original_path)
            .field("canonical_path", &self.canonical_path)
            .finish_non_exhaustive()
    }
}

/// Ordered, immutable list of [`RouteDescriptor`]s.
#[derive(Debug, Default)]
pub struct RouteCatalog {
    routes: Vec<RouteDescriptor>,
}

impl RouteCatalog {
    /// Compiles every route `source` reports, except the catch-alls.
    ///
    /// Order is preserved and nothing is deduplicated: a path listed twice
    /// yields two descriptors. The first template `factory` rejects aborts
    /// the build.
    pub fn build<S>(source: &S, factory: &dyn MatcherFactory) -> Result<Self, Error>
    where
        S: RouteSource + ?Sized,
    {
        let mut routes = Vec::new();
        for entry in source.routes() {
            if CATCH_ALL.contains(&entry.path.as_str()) {
                continue;
            }
            let canonical_path = strip_trailing_slash(&entry.path).to_owned();
            let matcher = factory.compile(&canonical_path)
                .map_err(|source| Error::Pattern { path: entry.path.clone(), source })?;

            info!(route = %canonical_path, methods = ?entry.methods, "route found");
            routes.push(RouteDescriptor {
                methods: entry.methods,
                original_path: entry.path,
                canonical_path,
                matcher,
            });
        }
        Ok(Self { routes })
    }

    /// First descriptor that accepts `method` and matches `path`.
    pub fn find(&self, method: &Method, path: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.accepts(method) && r.matcher.matches(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize { self.routes.len() }
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }
}

/// Removes exactly one trailing `/`. The root path is left alone.
pub fn strip_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}
