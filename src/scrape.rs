//! The side-channel scrape listener.
//!
//! Serves `GET /metrics` and nothing else, on its own address, so the
//! application's port never exposes metrics.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::metrics::Recorder;
use crate::request::Request;
use crate::response::{Response, TEXT_PLAIN};
use crate::router::Router;
use crate::server::Server;

/// Router answering `GET /metrics` with `recorder`'s current samples.
pub fn router(recorder: Arc<dyn Recorder>) -> Router {
    Router::new().get("/metrics", move |_req: Request| {
        let recorder = Arc::clone(&recorder);
        async move { Response::builder().body(TEXT_PLAIN, recorder.render()) }
    })
}

/// Resolves `host`, binds `port` and serves [`router`] on a background task.
///
/// `host` may be a name (`localhost`) or an IPv4/IPv6 literal. Failures stay
/// on that task: an unresolvable host or a port already in use is logged and
/// the listener gives up, while request handling carries on unaffected.
/// Returns `None` when called outside a tokio runtime.
pub fn spawn(host: String, port: u16, recorder: Arc<dyn Recorder>) -> Option<JoinHandle<()>> {
    let Ok(runtime) = Handle::try_current() else {
        error!(host = %host, port, "metrics server not started: no tokio runtime");
        return None;
    };

    Some(runtime.spawn(async move {
        let server = match Server::bind((host.clone(), port)).await {
            Ok(server) => server,
            Err(e) => {
                error!(host = %host, port, "metrics server failed to bind: {e}");
                return;
            }
        };
        match server.local_addr() {
            Ok(addr) => info!(host = %host, addr = %addr, "metrics server listening"),
            Err(_) => info!(host = %host, port, "metrics server listening"),
        }
        if let Err(e) = server.serve(router(recorder)).await {
            error!(host = %host, port, "metrics server stopped: {e}");
        }
    }))
}
