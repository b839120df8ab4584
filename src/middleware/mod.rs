//! Middleware layer.
//!
//! Middleware wraps a [`Service`](crate::Service) and intercepts every
//! request it serves. The one built-in middleware records request latency
//! labelled by route pattern:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use route_metrics::{Options, PatternMetrics, Request, Router, Server};
//!
//! # async fn get_user(_: Request) -> &'static str { "" }
//! #[tokio::main]
//! async fn main() -> Result<(), route_metrics::Error> {
//!     // Starts the scrape listener on 127.0.0.1:9991.
//!     let metrics = Arc::new(PatternMetrics::new(Options::load()?));
//!     let app = Router::new().get("/users/:id", get_user);
//!
//!     // `/users/42` and `/users/7/` are both recorded as `/users/:id`.
//!     Server::bind("0.0.0.0:3000").await?.serve(metrics.wrap(app)).await
//! }
//! ```

mod pattern_metrics;

pub use pattern_metrics::{Metered, PatternMetrics};
