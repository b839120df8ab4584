//! Minimal route-metrics demo: a small JSON API with pattern-labelled metrics.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/users/7/?expand=1
//!   curl -X POST http://localhost:3000/users
//!   curl http://localhost:9991/metrics
//!
//! Both user lookups land in the same `path="/users/:id"` series.

use std::sync::Arc;

use http::StatusCode;
use route_metrics::{Options, PatternMetrics, Request, Response, Router, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), route_metrics::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Defaults, then route-metrics.yaml, then ROUTE_METRICS_* variables.
    let metrics = Arc::new(PatternMetrics::new(Options::load()?));

    let app = Router::new()
        .get("/users/:id",    get_user)
        .post("/users",       create_user)
        .delete("/users/:id", delete_user)
        .get("/healthz/",     healthz);

    Server::bind("0.0.0.0:3000").await?.serve(metrics.wrap(app)).await
}

async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

async fn create_user(_req: Request) -> Response {
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#)
}

async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn healthz(_req: Request) -> &'static str {
    "ok"
}
