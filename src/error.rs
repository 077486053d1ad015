use std::fmt;

/// Represents configuration mistakes caught during the registration phase.
///
/// Every variant is a programmer error in the route/constraint/CORS setup:
/// it can only be fixed by changing the registration code, so callers are
/// expected to fail fast (typically by propagating it out of startup).
/// Nothing at request time ever produces a `ConfigError`.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ConfigError {
    /// A pattern contained an unbalanced `{`/`}` pair or an empty
    /// parameter name.
    MalformedPattern {
        /// The offending pattern.
        pattern: String,
    },
    /// A handler was already registered for this method and pattern.
    DuplicateRoute {
        /// The offending pattern.
        pattern: String,
        /// The method that was registered twice.
        method: String,
    },
    /// A constraint was already registered under this name.
    DuplicateConstraint {
        /// The constraint name.
        name: String,
    },
    /// A pattern referenced a constraint name that is not in the registry.
    UnknownConstraint {
        /// The unknown constraint name.
        name: String,
    },
    /// A constraint expression had unbalanced parentheses.
    MalformedConstraint {
        /// The offending expression.
        expr: String,
    },
    /// `add_cors` was called before any global CORS policy was set.
    MissingGlobalCors,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPattern { pattern } => {
                write!(f, "malformed parameter syntax in pattern '{}'", pattern)
            }
            Self::DuplicateRoute { pattern, method } => {
                write!(
                    f,
                    "a {} handler is already registered for pattern '{}'",
                    method, pattern
                )
            }
            Self::DuplicateConstraint { name } => {
                write!(f, "a constraint named '{}' is already registered", name)
            }
            Self::UnknownConstraint { name } => {
                write!(f, "unknown constraint '{}'", name)
            }
            Self::MalformedConstraint { expr } => {
                write!(f, "malformed constraint expression '{}'", expr)
            }
            Self::MissingGlobalCors => {
                write!(f, "add_cors requires a global CORS policy to be set first")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A failed match attempt.
///
/// ```
/// use trailmap::{MatchError, Router};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
/// router.get("/home", "Welcome!")?;
///
/// // no routes match
/// if let Err(err) = router.resolve("/foobar") {
///     assert_eq!(err, MatchError::NotFound);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MatchError {
    /// No matching route was found.
    NotFound,
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matching route not found")
    }
}

impl std::error::Error for MatchError {}
