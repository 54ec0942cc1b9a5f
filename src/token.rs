//! Token types identifying what is being asked for.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// Key for provider storage and lookup.
///
/// A token is an opaque identity. Three kinds are supported:
///
/// - **Type**: the identity of a Rust type (`Token::of::<T>()`)
/// - **Named**: a string, equal to any other token with the same string
/// - **Symbol**: a process-unique identity; two symbols never compare equal
///   even when their descriptions match
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::Token;
///
/// struct Database;
///
/// assert_eq!(Token::of::<Database>(), Token::of::<Database>());
/// assert_eq!(Token::named("port"), Token::named("port"));
/// assert_ne!(Token::symbol("plugin"), Token::symbol("plugin"));
/// assert!(Token::of::<Database>().display_name().ends_with("Database"));
/// ```
#[derive(Clone)]
pub enum Token {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// String key
    Named(Cow<'static, str>),
    /// Unique symbol with a description for diagnostics
    Symbol(u64, &'static str),
}

impl Token {
    /// Token for a Rust type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Token::Type(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    /// Token for a string name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Token::Named(name.into())
    }

    /// Allocates a new unique symbol.
    pub fn symbol(description: &'static str) -> Self {
        Token::Symbol(NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed), description)
    }

    /// Human-readable name for error messages and logs.
    pub fn display_name(&self) -> &str {
        match self {
            Token::Type(_, name) => name,
            Token::Named(name) => name,
            Token::Symbol(_, description) => description,
        }
    }

    /// Returns true for type tokens.
    pub fn is_type(&self) -> bool {
        matches!(self, Token::Type(..))
    }
}

// Diagnostic names do not take part in identity
impl PartialEq for Token {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Type(a, _), Token::Type(b, _)) => a == b,
            (Token::Named(a), Token::Named(b)) => a == b,
            (Token::Symbol(a, _), Token::Symbol(b, _)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Token {}

impl Hash for Token {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Token::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Token::Named(name) => {
                1u8.hash(state);
                name.hash(state);
            }
            Token::Symbol(id, _) => {
                2u8.hash(state);
                id.hash(state);
            }
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Type(_, name) => write!(f, "Type({})", name),
            Token::Named(name) => write!(f, "Named({:?})", name),
            Token::Symbol(id, description) => write!(f, "Symbol({}#{})", description, id),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl From<&'static str> for Token {
    fn from(name: &'static str) -> Self {
        Token::named(name)
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Token::named(name)
    }
}
