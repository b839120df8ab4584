//! Middleware configuration.
//!
//! [`Options`] can be built in code or loaded with [`Options::load`], which
//! layers (lowest precedence first):
//!
//! 1. built-in defaults;
//! 2. `route-metrics.yaml` in the working directory, if present;
//! 3. `ROUTE_METRICS_*` environment variables, e.g. `ROUTE_METRICS_PORT=9100`.
//!
//! The matcher factory cannot come from a file. Set it with
//! [`Options::url_pattern_maker`].

use std::fmt;
use std::sync::Arc;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::pattern::{MatcherFactory, UrlPatternFactory};

pub const CONFIG_FILE: &str = "route-metrics.yaml";
pub const ENV_PREFIX: &str = "ROUTE_METRICS_";

/// Construction-time settings for [`PatternMetrics`](crate::PatternMetrics).
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Options {
    /// Scrape listener host.
    pub host: String,
    /// Scrape listener port.
    pub port: u16,
    /// When `false`, labels are the raw request target, query included.
    pub normalize_path: bool,
    /// When `true`, requests that match no route are not recorded at all.
    pub discard_unmatched: bool,
    /// Whether [`PatternMetrics::new`](crate::PatternMetrics::new) starts the
    /// scrape listener itself.
    pub create_server: bool,
    #[serde(skip)]
    url_pattern_maker: Option<Arc<dyn MatcherFactory>>,
}

impl Options {
    /// Defaults, then `route-metrics.yaml`, then `ROUTE_METRICS_*`.
    pub fn load() -> Result<Self, Error> {
        Self::from_figment(Self::figment())
    }

    /// The provider stack [`load`](Self::load) reads. Exposed so callers can
    /// merge their own providers on top.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Options::default()))
            .merge(Yaml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, Error> {
        Ok(figment.extract()?)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn normalize_path(mut self, on: bool) -> Self {
        self.normalize_path = on;
        self
    }

    pub fn discard_unmatched(mut self, on: bool) -> Self {
        self.discard_unmatched = on;
        self
    }

    pub fn create_server(mut self, on: bool) -> Self {
        self.create_server = on;
        self
    }

    /// Replaces the default [`UrlPatternFactory`].
    pub fn url_pattern_maker(mut self, factory: impl MatcherFactory + 'static) -> Self {
        self.url_pattern_maker = Some(Arc::new(factory));
        self
    }

    /// The configured factory, or a default [`UrlPatternFactory`].
    pub fn matcher_factory(&self) -> Arc<dyn MatcherFactory> {
        match &self.url_pattern_maker {
            Some(factory) => Arc::clone(factory),
            None => Arc::new(UrlPatternFactory::default()),
        }
    }

    /// `(host, port)` for the scrape listener. Host names are resolved when
    /// the listener binds, not here.
    pub fn scrape_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 9991,
            normalize_path: true,
            discard_unmatched: false,
            create_server: true,
            url_pattern_maker: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("normalize_path", &self.normalize_path)
            .field("discard_unmatched", &self.discard_unmatched)
            .field("create_server", &self.create_server)
            .field("url_pattern_maker", &self.url_pattern_maker.as_ref().map(|_| "custom"))
            .finish()
    }
}
