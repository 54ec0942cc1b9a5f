//! Error types for the injector tree.

use std::fmt;

/// Dependency injection errors
///
/// Every failure in ferrous-injector is a local, synchronous error. Caches are
/// only written after a successful resolution, so a failed `get` or `create`
/// never leaves partial state behind.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{DiError, Injector, InjectFlags, Token};
///
/// let injector = Injector::root(vec![], true).unwrap();
/// match injector.get_any(&Token::named("missing"), InjectFlags::DEFAULT) {
///     Err(DiError::NotFound(name)) => assert_eq!(name, "missing"),
///     _ => unreachable!(),
/// }
///
/// // Optional lookups come back empty instead
/// let empty = injector.get_any(&Token::named("missing"), InjectFlags::OPTIONAL).unwrap();
/// assert!(empty.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// No provider or cached value for the token anywhere in the searched chain
    NotFound(String),
    /// A provider bound to a narrower tier was requested from a broader injector
    ScopeViolation {
        token: String,
        provider_scope: u32,
        injector_scope: u32,
    },
    /// `tag()` targeted a token already bound to a non-tagged provider
    InvalidTag(String),
    /// "Provide self" was requested before the instance existed
    MissingSelf(String),
    /// Child scope below its parent, or a non-positive level
    InvalidScope { requested: i64, parent: u32 },
    /// Type downcast failed
    TypeMismatch(String),
    /// A constructor or method asked for an argument past the end of the list
    MissingArgument { index: usize, len: usize },
    /// The class has no such member or method
    UnknownMember { class: String, member: String },
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
    /// Invalid configuration
    Config(String),
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotFound(token) => {
                write!(f, "Could not retrieve the dependency for token {}", token)
            }
            DiError::ScopeViolation { token, provider_scope, injector_scope } => write!(
                f,
                "Cannot instantiate {} (scope {}) from an injector with broader scope {}",
                token, provider_scope, injector_scope
            ),
            DiError::InvalidTag(token) => write!(f, "Invalid tag provider {}", token),
            DiError::MissingSelf(class) => {
                write!(f, "Cannot provide self for a constructor dependency in {}", class)
            }
            DiError::InvalidScope { requested, parent } => write!(
                f,
                "Cannot create child scope {} for parent with scope {}",
                requested, parent
            ),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::MissingArgument { index, len } => {
                write!(f, "Argument {} requested but only {} supplied", index, len)
            }
            DiError::UnknownMember { class, member } => {
                write!(f, "Unknown member {}::{}", class, member)
            }
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            DiError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations
///
/// A convenience alias for `Result<T, DiError>` used throughout the crate.
///
/// ```rust
/// use ferrous_injector::{DiError, DiResult};
///
/// fn lookup() -> DiResult<u32> {
///     Err(DiError::NotFound("port".to_string()))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
