//! Route-template matchers.
//!
//! A [`Matcher`] answers one question: does this concrete path belong to the
//! route template it was compiled from? The catalog never cares how. It asks a
//! [`MatcherFactory`] for one matcher per route and calls [`Matcher::matches`]
//! at request time, so any engine can be swapped in without touching the
//! catalog, the normaliser, or the middleware.
//!
//! Two engines ship with the crate:
//!
//! | Factory | Engine | Template syntax |
//! |---|---|---|
//! | [`UrlPatternFactory`] (default) | anchored [`regex`] | `:name`, `*`, `(optional)` |
//! | [`MatchitFactory`] | [`matchit`] radix tree | `:name` segments, trailing `*` |
//!
//! ```rust
//! use route_metrics::pattern::{Matcher, MatcherFactory, UrlPatternFactory};
//!
//! let users = UrlPatternFactory::default().compile("/users/:id").unwrap();
//! assert!(users.matches("/users/42"));
//! assert!(!users.matches("/users/42/posts"));
//! ```

use std::collections::HashSet;
use std::fmt;

use regex::Regex;

use crate::error::PatternError;

/// Default character set for `:name` segment names.
pub const DEFAULT_NAME_CHARSET: &str = "a-zA-Z0-9_-";

/// Characters a named segment may capture. Never includes `/`.
const VALUE_CHARSET: &str = r"a-zA-Z0-9\-_~ %";

// ── Capability traits ─────────────────────────────────────────────────────────

/// A compiled route template.
pub trait Matcher: Send + Sync {
    fn matches(&self, path: &str) -> bool;
}

/// Compiles route templates into [`Matcher`]s.
///
/// Implemented for closures, so a one-off engine needs no named type:
///
/// ```rust
/// use route_metrics::pattern::{Matcher, MatcherFactory};
/// use route_metrics::PatternError;
///
/// struct Exact(String);
/// impl Matcher for Exact {
///     fn matches(&self, path: &str) -> bool { path == self.0 }
/// }
///
/// let exact = |template: &str| -> Result<Box<dyn Matcher>, PatternError> {
///     Ok(Box::new(Exact(template.to_owned())))
/// };
/// assert!(exact.compile("/a").unwrap().matches("/a"));
/// ```
pub trait MatcherFactory: Send + Sync {
    fn compile(&self, template: &str) -> Result<Box<dyn Matcher>, PatternError>;
}

impl<F> MatcherFactory for F
where
    F: Fn(&str) -> Result<Box<dyn Matcher>, PatternError> + Send + Sync,
{
    fn compile(&self, template: &str) -> Result<Box<dyn Matcher>, PatternError> {
        self(template)
    }
}

// ── Default engine: regex-backed url patterns ─────────────────────────────────

/// A template compiled to an anchored regular expression.
///
/// - literal text matches itself;
/// - `:name` captures one or more of `a-zA-Z0-9-_~ %` (never `/`);
/// - `*` matches anything, `/` included;
/// - `(...)` makes its contents optional.
pub struct UrlPattern {
    regex: Regex,
    names: Vec<String>,
}

impl UrlPattern {
    /// Compiles with the default segment-name charset.
    pub fn new(template: &str) -> Result<Self, PatternError> {
        UrlPatternFactory::default().build(template)
    }

    /// Segment names in template order. Wildcards are reported as `*`.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Named captures for `path`, or `None` when it does not match.
    /// Optional segments that did not participate are omitted.
    pub fn params<'p>(&self, path: &'p str) -> Option<Vec<(&str, &'p str)>> {
        let caps = self.regex.captures(path)?;
        let params = self.names.iter()
            .zip(caps.iter().skip(1))
            .filter_map(|(name, m)| m.map(|m| (name.as_str(), m.as_str())))
            .collect();
        Some(params)
    }
}

impl Matcher for UrlPattern {
    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

impl fmt::Debug for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlPattern")
            .field("regex", &self.regex.as_str())
            .field("names", &self.names)
            .finish()
    }
}

/// The default [`MatcherFactory`]: compiles [`UrlPattern`]s.
#[derive(Clone, Debug)]
pub struct UrlPatternFactory {
    name: Regex,
}

impl UrlPatternFactory {
    /// A factory whose `:name` segments accept the given regex character-class
    /// body, e.g. `"a-z_"`.
    pub fn with_name_charset(charset: &str) -> Result<Self, PatternError> {
        let name = Regex::new(&format!("^[{charset}]+"))
            .map_err(|e| PatternError::Engine(e.to_string()))?;
        Ok(Self { name })
    }

    pub fn build(&self, template: &str) -> Result<UrlPattern, PatternError> {
        let mut source = String::with_capacity(template.len() * 2 + 2);
        let mut names: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        // Offsets of open groups, paired with the output length at the `(`.
        let mut groups: Vec<(usize, usize)> = Vec::new();

        source.push('^');
        let mut chars = template.char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            match c {
                '(' => {
                    source.push_str("(?:");
                    groups.push((offset, source.len()));
                }
                ')' => {
                    let (open, body_start) = groups.pop()
                        .ok_or(PatternError::Unbalanced { offset })?;
                    if source.len() == body_start {
                        return Err(PatternError::EmptyGroup { offset: open });
                    }
                    source.push_str(")?");
                }
                '*' => {
                    source.push_str("(.*?)");
                    names.push("*".to_owned());
                }
                ':' => {
                    let rest = &template[offset + 1..];
                    let name = self.name.find(rest)
                        .map(|m| m.as_str())
                        .ok_or(PatternError::EmptyName { offset })?;
                    if !seen.insert(name) {
                        return Err(PatternError::DuplicateName(name.to_owned()));
                    }
                    // Skip the name; the charset is ASCII-only in practice but
                    // step by char to stay on boundaries regardless.
                    while chars.peek().is_some_and(|&(i, _)| i < offset + 1 + name.len()) {
                        chars.next();
                    }
                    source.push_str(&format!("([{VALUE_CHARSET}]+)"));
                    names.push(name.to_owned());
                }
                _ => source.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }

        if let Some(&(offset, _)) = groups.last() {
            return Err(PatternError::Unbalanced { offset });
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| PatternError::Engine(e.to_string()))?;
        Ok(UrlPattern { regex, names })
    }
}

impl Default for UrlPatternFactory {
    fn default() -> Self {
        Self::with_name_charset(DEFAULT_NAME_CHARSET)
            .expect("default segment-name charset is a valid character class")
    }
}

impl MatcherFactory for UrlPatternFactory {
    fn compile(&self, template: &str) -> Result<Box<dyn Matcher>, PatternError> {
        Ok(Box::new(self.build(template)?))
    }
}

// ── Alternative engine: matchit ───────────────────────────────────────────────

/// A single-route [`matchit`] tree.
///
/// Stricter than [`UrlPattern`]: parameters must span a whole segment and a
/// wildcard is only allowed as the final segment.
pub struct MatchitPattern {
    tree: matchit::Router<()>,
}

impl MatchitPattern {
    pub fn new(template: &str) -> Result<Self, PatternError> {
        let mut tree = matchit::Router::new();
        tree.insert(to_matchit(template), ())
            .map_err(|e| PatternError::Engine(e.to_string()))?;
        Ok(Self { tree })
    }
}

impl Matcher for MatchitPattern {
    fn matches(&self, path: &str) -> bool {
        self.tree.at(path).is_ok()
    }
}

/// [`MatcherFactory`] for [`MatchitPattern`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchitFactory;

impl MatcherFactory for MatchitFactory {
    fn compile(&self, template: &str) -> Result<Box<dyn Matcher>, PatternError> {
        Ok(Box::new(MatchitPattern::new(template)?))
    }
}

/// Rewrites `:name` / `*` template syntax into matchit's `{name}` / `{*rest}`.
///
/// Literal braces are doubled, which is how matchit escapes them.
pub(crate) fn to_matchit(template: &str) -> String {
    let segments: Vec<&str> = template.split('/').collect();
    let last = segments.len().saturating_sub(1);
    segments.iter()
        .enumerate()
        .map(|(i, seg)| match *seg {
            "*" if i == last => "{*rest}".to_owned(),
            s if s.len() > 1 && s.starts_with(':') => format!("{{{}}}", &s[1..]),
            s => s.replace('{', "{{").replace('}', "}}"),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(template: &str) -> UrlPattern {
        UrlPattern::new(template).unwrap()
    }

    #[test]
    fn named_segment_matches_one_segment() {
        let p = compile("/users/:id");
        assert!(p.matches("/users/42"));
        assert!(p.matches("/users/some-user_name"));
        assert!(!p.matches("/users"));
        assert!(!p.matches("/users/"));
        assert!(!p.matches("/users/42/posts"));
    }

    #[test]
    fn literals_are_escaped() {
        let p = compile("/files/report.pdf");
        assert!(p.matches("/files/report.pdf"));
        assert!(!p.matches("/files/reportXpdf"));
    }

    #[test]
    fn segment_names_accept_digits_dash_underscore() {
        let p = compile("/a/:user-id/:post_2");
        assert_eq!(p.names(), ["user-id", "post_2"]);
        assert_eq!(p.params("/a/7/9"), Some(vec![("user-id", "7"), ("post_2", "9")]));
    }

    #[test]
    fn named_segment_inside_a_segment() {
        let p = compile("/api/v:version/status");
        assert!(p.matches("/api/v2/status"));
        assert_eq!(p.params("/api/v2/status"), Some(vec![("version", "2")]));
    }

    #[test]
    fn wildcard_spans_slashes() {
        let p = compile("/static/*");
        assert!(p.matches("/static/css/site.css"));
        assert!(!p.matches("/other/css"));
    }

    #[test]
    fn optional_group() {
        let p = compile("/posts(/:slug)");
        assert!(p.matches("/posts"));
        assert!(p.matches("/posts/hello"));
        assert_eq!(p.params("/posts"), Some(vec![]));
    }

    #[test]
    fn root_matches_only_root() {
        let p = compile("/");
        assert!(p.matches("/"));
        assert!(!p.matches(""));
        assert!(!p.matches("/x"));
    }

    #[test]
    fn rejects_bad_templates() {
        assert_eq!(UrlPattern::new("/a/:").unwrap_err(), PatternError::EmptyName { offset: 3 });
        assert_eq!(
            UrlPattern::new("/a/:x/:x").unwrap_err(),
            PatternError::DuplicateName("x".to_owned()),
        );
        assert_eq!(UrlPattern::new("/a(/b").unwrap_err(), PatternError::Unbalanced { offset: 2 });
        assert_eq!(UrlPattern::new("/a)").unwrap_err(), PatternError::Unbalanced { offset: 2 });
        assert_eq!(UrlPattern::new("/a()").unwrap_err(), PatternError::EmptyGroup { offset: 2 });
    }

    #[test]
    fn custom_name_charset() {
        let factory = UrlPatternFactory::with_name_charset("a-z").unwrap();
        // `Id` stops the name at `I`, so `:` is followed by nothing usable.
        assert!(factory.build("/u/:Id").is_err());
        assert!(factory.build("/u/:id").is_ok());
        assert!(UrlPatternFactory::with_name_charset("z-a").is_err());
    }

    #[test]
    fn closures_are_factories() {
        let factory = |t: &str| -> Result<Box<dyn Matcher>, PatternError> {
            Ok(Box::new(MatchitPattern::new(t)?))
        };
        assert!(factory.compile("/x/:y").unwrap().matches("/x/1"));
    }

    #[test]
    fn matchit_engine() {
        let m = MatchitFactory.compile("/users/:id").unwrap();
        assert!(m.matches("/users/42"));
        assert!(!m.matches("/users/42/posts"));

        let m = MatchitFactory.compile("/assets/*").unwrap();
        assert!(m.matches("/assets/js/app.js"));
    }

    #[test]
    fn matchit_translation() {
        assert_eq!(to_matchit("/users/:id"), "/users/{id}");
        assert_eq!(to_matchit("/files/*"), "/files/{*rest}");
        assert_eq!(to_matchit("/x/{raw}"), "/x/{{raw}}");
        assert_eq!(to_matchit("/"), "/");
    }
}
