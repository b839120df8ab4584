//! Route-pattern-labelled request metrics.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use http::{Method, StatusCode};
use tokio::task::JoinHandle;
use tracing::error;

use crate::catalog::{RouteCatalog, RouteSource};
use crate::config::Options;
use crate::error::Error;
use crate::handler::{BoxFuture, Service};
use crate::metrics::{PrometheusRecorder, Recorder};
use crate::normalize::{Label, normalize};
use crate::pattern::MatcherFactory;
use crate::request::Request;
use crate::response::Response;
use crate::scrape;

/// Resolves request paths to route-pattern labels and feeds a [`Recorder`].
///
/// The route catalog is read from the wrapped service on the first request,
/// not at construction: routes may still be registering when the middleware
/// is created. It is built exactly once, even when several first requests
/// race, and never rebuilt. Routes added afterwards are not seen.
pub struct PatternMetrics {
    options: Options,
    factory: Arc<dyn MatcherFactory>,
    recorder: Arc<dyn Recorder>,
    catalog: OnceLock<Result<RouteCatalog, Error>>,
    listener: Option<JoinHandle<()>>,
}

impl PatternMetrics {
    /// Records into a fresh [`PrometheusRecorder`].
    ///
    /// With `create_server` set (the default) this also starts the scrape
    /// listener, which needs a running tokio runtime.
    pub fn new(options: Options) -> Self {
        Self::with_recorder(options, Arc::new(PrometheusRecorder::new()))
    }

    pub fn with_recorder(options: Options, recorder: Arc<dyn Recorder>) -> Self {
        let listener = if options.create_server {
            let (host, port) = options.scrape_addr();
            scrape::spawn(host, port, Arc::clone(&recorder))
        } else {
            None
        };

        Self {
            factory: options.matcher_factory(),
            options,
            recorder,
            catalog: OnceLock::new(),
            listener,
        }
    }

    pub fn options(&self) -> &Options { &self.options }
    pub fn recorder(&self) -> &Arc<dyn Recorder> { &self.recorder }

    /// The catalog, built from `source` on first call.
    ///
    /// A build failure is kept too: every later call returns the same error,
    /// so a broken route keeps failing loudly instead of mislabelling traffic.
    pub fn catalog<S>(&self, source: &S) -> Result<&RouteCatalog, &Error>
    where
        S: RouteSource + ?Sized,
    {
        self.catalog
            .get_or_init(|| RouteCatalog::build(source, self.factory.as_ref()))
            .as_ref()
    }

    /// The `path` label for one request. `target` is the request target as
    /// received, query string included.
    pub fn resolve<S>(&self, source: &S, method: &Method, target: &str) -> Result<Label, &Error>
    where
        S: RouteSource + ?Sized,
    {
        let catalog = self.catalog(source)?;
        Ok(normalize(method, target, catalog, &self.options))
    }

    /// Wraps `service` so every request it serves is timed and recorded.
    pub fn wrap<S>(self: &Arc<Self>, service: S) -> Metered<S>
    where
        S: Service + RouteSource,
    {
        Metered { inner: service, metrics: Arc::clone(self) }
    }
}

impl Drop for PatternMetrics {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

/// A service wrapped by [`PatternMetrics`].
pub struct Metered<S> {
    inner: S,
    metrics: Arc<PatternMetrics>,
}

impl<S> Metered<S> {
    pub fn inner(&self) -> &S { &self.inner }
}

impl<S> Service for Metered<S>
where
    S: Service + RouteSource,
{
    fn call(&self, req: Request) -> BoxFuture {
        let method = req.method().clone();
        let label = match self.metrics.resolve(&self.inner, &method, req.target()) {
            Ok(label) => label,
            Err(e) => {
                error!(method = %method, target_uri = req.target(), "route catalog unavailable: {e}");
                return Box::pin(async { Response::status(StatusCode::INTERNAL_SERVER_ERROR) });
            }
        };

        let metrics = Arc::clone(&self.metrics);
        let start = Instant::now();
        let response = self.inner.call(req);

        Box::pin(async move {
            let response = response.await;
            if let Some(path) = label.as_str() {
                metrics.recorder.observe(&method, path, response.status_code(), start.elapsed());
            }
            response
        })
    }
}
