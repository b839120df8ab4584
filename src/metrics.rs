//! Metrics recording and text exposition for Prometheus.

use std::time::Duration;

use http::{Method, StatusCode};
use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use tracing::error;

/// Latency buckets, in seconds.
pub const BUCKETS: [f64; 7] = [0.03, 0.3, 1.0, 1.5, 3.0, 5.0, 10.0];

/// Receives one observation per recorded request and renders the
/// accumulated samples for scraping.
pub trait Recorder: Send + Sync + 'static {
    /// Records one request. `path` is the already-resolved label.
    fn observe(&self, method: &Method, path: &str, status: StatusCode, elapsed: Duration);

    /// Current samples in the text exposition format.
    fn render(&self) -> String;
}

/// [`Recorder`] backed by a private [`prometheus::Registry`].
///
/// Exposes `http_request_duration_seconds{method,path,status_code}` and an
/// `up` gauge that reads `1` while the process is serving.
#[derive(Clone)]
pub struct PrometheusRecorder {
    registry: Registry,
    duration: HistogramVec,
}

impl PrometheusRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();

        let up = Gauge::with_opts(Opts::new("up", "1 = up, 0 = not up"))
            .expect("valid `up` gauge options");
        up.set(1.0);
        registry.register(Box::new(up))
            .expect("`up` registered once on a fresh registry");

        let duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "duration histogram of http responses labeled with: status_code, method, path",
            )
            .buckets(BUCKETS.to_vec()),
            &["status_code", "method", "path"],
        )
        .expect("valid request-duration histogram options");
        registry.register(Box::new(duration.clone()))
            .expect("histogram registered once on a fresh registry");

        Self { registry, duration }
    }

    /// The underlying registry, for registering application metrics that
    /// should be scraped alongside the request histogram.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for PrometheusRecorder {
    fn default() -> Self { Self::new() }
}

impl Recorder for PrometheusRecorder {
    fn observe(&self, method: &Method, path: &str, status: StatusCode, elapsed: Duration) {
        self.duration
            .with_label_values(&[status.as_str(), method.as_str(), path])
            .observe(elapsed.as_secs_f64());
    }

    fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            error!("metrics encoding failed: {e}");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
