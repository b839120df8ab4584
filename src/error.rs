//! Unified error type.

use std::fmt;

/// The error type returned by route-metrics' fallible operations.
///
/// Unmatched request paths are not errors: they resolve to a
/// [`Label`](crate::Label) according to the configured policy. This type
/// surfaces infrastructure and configuration failures: binding a listener,
/// loading [`Options`](crate::Options), or compiling a registered route.
#[derive(Debug)]
pub enum Error {
    /// Binding or accepting on a socket failed.
    Io(std::io::Error),
    /// A registered route could not be compiled into a matcher.
    Pattern { path: String, source: PatternError },
    /// Configuration could not be extracted.
    Config(Box<figment::Error>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e)                   => write!(f, "io: {e}"),
            Self::Pattern { path, source } => write!(f, "route `{path}`: {source}"),
            Self::Config(e)               => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e)                 => Some(e),
            Self::Pattern { source, .. } => Some(source),
            Self::Config(e)             => Some(e.as_ref()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Self::Config(Box::new(e))
    }
}

/// Why a path template could not be compiled.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PatternError {
    /// `:` not followed by at least one segment-name character.
    EmptyName { offset: usize },
    /// The same segment name appears twice in one template.
    DuplicateName(String),
    /// `(` without `)` or the reverse.
    Unbalanced { offset: usize },
    /// `()` with nothing inside.
    EmptyGroup { offset: usize },
    /// The underlying matching engine rejected the template.
    Engine(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName { offset }  => write!(f, "empty segment name at offset {offset}"),
            Self::DuplicateName(name)   => write!(f, "segment name `{name}` used twice"),
            Self::Unbalanced { offset } => write!(f, "unbalanced parenthesis at offset {offset}"),
            Self::EmptyGroup { offset } => write!(f, "empty optional group at offset {offset}"),
            Self::Engine(msg)           => f.write_str(msg),
        }
    }
}

impl std::error::Error for PatternError {}
