//! # route-metrics
//!
//! Request-latency metrics labelled by route pattern, not by raw path.
//!
//! Label a histogram with `req.path()` and every user id, query string, and
//! trailing-slash variant becomes its own time series. route-metrics labels
//! `/users/42`, `/users/7/` and `/users/7?expand=1` all as `/users/:id`, the
//! template the route was registered under.
//!
//! ## How a request is labelled
//!
//! 1. On the first request, the wrapped router's route table is compiled into
//!    a [`RouteCatalog`]: catch-all routes (`*`, `/*`) dropped, one trailing
//!    slash stripped, each template compiled by a
//!    [`MatcherFactory`](pattern::MatcherFactory). This happens exactly once.
//! 2. Each request's path (query and fragment removed, one trailing slash
//!    stripped) is tried against the catalog in registration order. The first
//!    route that accepts the method and matches wins.
//! 3. No match: the cleaned path is used as the label, or the request is not
//!    recorded at all with [`Options::discard_unmatched`].
//!
//! Samples are scraped from a separate listener, `GET /metrics` on
//! `127.0.0.1:9991` by default.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use route_metrics::{Options, PatternMetrics, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), route_metrics::Error> {
//!     let metrics = Arc::new(PatternMetrics::new(Options::default()));
//!
//!     let app = Router::new()
//!         .get("/users/:id", get_user)
//!         .post("/users",    create_user);
//!
//!     Server::bind("0.0.0.0:3000").await?.serve(metrics.wrap(app)).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(_req: Request) -> Response {
//!     Response::json(r#"{"id":"99"}"#)
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod catalog;
pub mod config;
pub mod metrics;
pub mod middleware;
pub mod normalize;
pub mod pattern;
pub mod scrape;

pub use catalog::{RouteCatalog, RouteDescriptor, RouteEntry, RouteSource};
pub use config::Options;
pub use error::{Error, PatternError};
pub use handler::{BoxFuture, Handler, Service};
pub use metrics::{PrometheusRecorder, Recorder};
pub use middleware::{Metered, PatternMetrics};
pub use normalize::{Label, normalize};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
