//! Request path → metric label.

use http::{Method, Uri};
use tracing::debug;

use crate::catalog::{RouteCatalog, strip_trailing_slash};
use crate::config::Options;

/// What a request's `path` label resolves to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Label {
    /// Canonical pattern of the first matching route, e.g. `/users/:id`.
    Matched(String),
    /// No route matched, or normalisation is off; carries the path as seen.
    Unmatched(String),
    /// Do not record this request.
    Discard,
}

impl Label {
    /// The label value, or `None` for [`Label::Discard`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Matched(s) | Self::Unmatched(s) => Some(s),
            Self::Discard => None,
        }
    }
}

/// Resolves `raw` (a request target, query string and all) to a [`Label`].
///
/// First registered route that accepts `method` and matches wins; there is
/// no specificity scoring.
pub fn normalize(method: &Method, raw: &str, catalog: &RouteCatalog, options: &Options) -> Label {
    if !options.normalize_path {
        return Label::Unmatched(raw.to_owned());
    }

    let path = path_component(raw);
    let path = strip_trailing_slash(&path);

    if let Some(route) = catalog.find(method, path) {
        return Label::Matched(route.canonical_path.clone());
    }
    if options.discard_unmatched {
        Label::Discard
    } else {
        Label::Unmatched(path.to_owned())
    }
}

/// The path of a request target, without query or fragment. Never empty:
/// a target with no path is `/`.
///
/// Targets `http::Uri` refuses are cut at the first `?` or `#` instead.
pub fn path_component(raw: &str) -> String {
    let path = match raw.parse::<Uri>() {
        Ok(uri) => uri.path().to_owned(),
        Err(e) => {
            debug!(target_uri = raw, "unparseable request target: {e}");
            let end = raw.find(['?', '#']).unwrap_or(raw.len());
            raw[..end].to_owned()
        }
    };
    if path.is_empty() { "/".to_owned() } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RouteEntry;
    use crate::pattern::UrlPatternFactory;

    fn catalog(entries: &[RouteEntry]) -> RouteCatalog {
        RouteCatalog::build(entries, &UrlPatternFactory::default()).unwrap()
    }

    fn get(path: &str) -> RouteEntry {
        RouteEntry::new(path, [Method::GET])
    }

    fn label(c: &RouteCatalog, method: Method, raw: &str) -> Label {
        normalize(&method, raw, c, &Options::default())
    }

    #[test]
    fn parameterised_route() {
        let c = catalog(&[get("/users/:id")]);
        assert_eq!(label(&c, Method::GET, "/users/42"), Label::Matched("/users/:id".into()));
        assert_eq!(label(&c, Method::GET, "/users/42?x=1"), Label::Matched("/users/:id".into()));
    }

    #[test]
    fn trailing_slash_invariance() {
        let c = catalog(&[get("/health/")]);
        assert_eq!(label(&c, Method::GET, "/health"), Label::Matched("/health".into()));
        assert_eq!(label(&c, Method::GET, "/health/"), Label::Matched("/health".into()));
    }

    #[test]
    fn root_stays_root() {
        let c = catalog(&[get("/")]);
        assert_eq!(label(&c, Method::GET, "/"), Label::Matched("/".into()));
        assert_eq!(label(&catalog(&[]), Method::GET, "/"), Label::Unmatched("/".into()));
    }

    #[test]
    fn first_registered_wins() {
        let c = catalog(&[get("/a/:x"), get("/a/b")]);
        assert_eq!(label(&c, Method::GET, "/a/b"), Label::Matched("/a/:x".into()));

        let c = catalog(&[get("/a/b"), get("/a/:x")]);
        assert_eq!(label(&c, Method::GET, "/a/b"), Label::Matched("/a/b".into()));
    }

    #[test]
    fn method_mismatch_falls_through() {
        let c = catalog(&[RouteEntry::new("/items/:id", [Method::POST]), get("/items/*")]);
        assert_eq!(label(&c, Method::GET, "/items/1"), Label::Matched("/items/*".into()));
        assert_eq!(label(&c, Method::POST, "/items/1"), Label::Matched("/items/:id".into()));
        assert_eq!(label(&c, Method::DELETE, "/items/1"), Label::Unmatched("/items/1".into()));
    }

    #[test]
    fn catch_alls_never_label() {
        let c = catalog(&[get("/*"), get("*")]);
        assert_eq!(label(&c, Method::GET, "/anything"), Label::Unmatched("/anything".into()));
    }

    #[test]
    fn unmatched_falls_back_to_cleaned_path() {
        let c = catalog(&[get("/a")]);
        assert_eq!(label(&c, Method::GET, "/nope/?q=1"), Label::Unmatched("/nope".into()));
    }

    #[test]
    fn discard_unmatched() {
        let c = catalog(&[get("/a")]);
        let opts = Options::default().discard_unmatched(true);
        assert_eq!(normalize(&Method::GET, "/b", &c, &opts), Label::Discard);
        assert_eq!(normalize(&Method::GET, "/a", &c, &opts), Label::Matched("/a".into()));
    }

    #[test]
    fn normalisation_off_returns_raw_target() {
        let c = catalog(&[get("/users/:id")]);
        let opts = Options::default().normalize_path(false).discard_unmatched(true);
        assert_eq!(
            normalize(&Method::GET, "/users/42/?page=2", &c, &opts),
            Label::Unmatched("/users/42/?page=2".into()),
        );
    }

    #[test]
    fn path_component_variants() {
        assert_eq!(path_component("/a/b?c=d"), "/a/b");
        assert_eq!(path_component("http://example.com/a?x"), "/a");
        assert_eq!(path_component("/a b?c"), "/a b");
        assert_eq!(path_component("/a b#frag"), "/a b");
    }

    #[test]
    fn empty_path_becomes_root() {
        assert_eq!(path_component("?x=1"), "/");
        assert_eq!(path_component("#top"), "/");
        assert_eq!(path_component(""), "/");

        let c = catalog(&[get("/")]);
        assert_eq!(label(&c, Method::GET, "?x=1"), Label::Matched("/".into()));
        assert_eq!(label(&catalog(&[]), Method::GET, "?x=1"), Label::Unmatched("/".into()));
    }

    #[test]
    fn label_as_str() {
        assert_eq!(Label::Matched("/a".into()).as_str(), Some("/a"));
        assert_eq!(Label::Unmatched("/b".into()).as_str(), Some("/b"));
        assert_eq!(Label::Discard.as_str(), None);
    }
}
