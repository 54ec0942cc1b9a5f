//! Dependency descriptors consumed by the argument engine.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::class::{AnyArc, Argument, Class};
use crate::error::DiResult;
use crate::flags::InjectFlags;
use crate::provider::Provider;
use crate::token::Token;

/// Describes one injected value: a constructor or method parameter, or a
/// member assigned after construction.
///
/// Descriptors with a `parameter` index take part in argument lists; those
/// without one are member injections.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Dependency, InjectFlags, Provider, Token};
///
/// struct Config;
///
/// let dep = Dependency::on::<Config>()
///     .at(1)
///     .optional()
///     .or_default(Config)
///     .providing(Provider::value(Token::named("env"), "test"));
///
/// assert_eq!(dep.parameter, Some(1));
/// assert!(dep.flags.contains(InjectFlags::OPTIONAL));
/// assert!(dep.default_value.is_some());
/// assert_eq!(dep.provides.len(), 1);
/// ```
#[derive(Clone)]
pub struct Dependency {
    pub token: Token,
    pub flags: InjectFlags,
    /// Used when the lookup is optional and comes back empty
    pub default_value: Option<AnyArc>,
    pub parameter: Option<usize>,
    /// Extra providers seeded into an ephemeral child for this lookup only
    pub provides: Vec<Provider>,
    /// Make the instance under construction resolvable by its class token
    pub provide_self: bool,
    /// Build a fresh instance with these arguments instead of a lookup
    pub construct: Option<(Class, Vec<Argument>)>,
}

impl Dependency {
    /// Dependency on a Rust type.
    pub fn on<T: ?Sized + 'static>() -> Self {
        Self::token(Token::of::<T>())
    }

    /// Dependency on an arbitrary token.
    pub fn token(token: impl Into<Token>) -> Self {
        Dependency {
            token: token.into(),
            flags: InjectFlags::DEFAULT,
            default_value: None,
            parameter: None,
            provides: Vec::new(),
            provide_self: false,
            construct: None,
        }
    }

    /// Positional index in the argument list.
    pub fn at(mut self, parameter: usize) -> Self {
        self.parameter = Some(parameter);
        self
    }

    pub fn optional(mut self) -> Self {
        self.flags |= InjectFlags::OPTIONAL;
        self
    }

    pub fn with_flags(mut self, flags: InjectFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Fallback for an optional lookup that comes back empty.
    pub fn or_default<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.default_value = Some(Arc::new(value));
        self
    }

    pub fn providing(mut self, provider: Provider) -> Self {
        self.provides.push(provider);
        self
    }

    pub fn provide_self(mut self) -> Self {
        self.provide_self = true;
        self
    }

    /// Satisfy the dependency with `injector.create(class, args)`.
    pub fn construct(mut self, class: Class, args: Vec<Argument>) -> Self {
        self.token = class.token().clone();
        self.construct = Some((class, args));
        self
    }

    /// Folds a later descriptor for the same position into this one.
    ///
    /// Fields set on `later` win, and flags are combined.
    pub fn merge(mut self, later: Dependency) -> Self {
        self.token = later.token;
        self.flags |= later.flags;
        if later.default_value.is_some() {
            self.default_value = later.default_value;
        }
        if later.parameter.is_some() {
            self.parameter = later.parameter;
        }
        if !later.provides.is_empty() {
            self.provides = later.provides;
        }
        self.provide_self |= later.provide_self;
        if later.construct.is_some() {
            self.construct = later.construct;
        }
        self
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("token", &self.token)
            .field("flags", &self.flags)
            .field("parameter", &self.parameter)
            .field("has_default", &self.default_value.is_some())
            .field("provides", &self.provides.len())
            .field("provide_self", &self.provide_self)
            .field("construct", &self.construct.as_ref().map(|(class, _)| class.name()))
            .finish()
    }
}

type MemberFactory = dyn Fn(&AnyArc) -> DiResult<Argument> + Send + Sync;

/// Computes a member value from the freshly built instance.
#[derive(Clone)]
pub struct FactoryMember {
    pub member: String,
    factory: Arc<MemberFactory>,
}

impl FactoryMember {
    pub fn new<F>(member: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&AnyArc) -> DiResult<Argument> + Send + Sync + 'static,
    {
        FactoryMember { member: member.into(), factory: Arc::new(factory) }
    }

    pub fn produce(&self, instance: &AnyArc) -> DiResult<Argument> {
        (self.factory)(instance)
    }
}

impl fmt::Debug for FactoryMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryMember").field("member", &self.member).finish()
    }
}

/// Lifecycle hook bound to a method. Only `init` hooks run, after members
/// and factories are in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub name: String,
    pub member: String,
}

impl Hook {
    pub const INIT: &'static str = "init";

    pub fn new(name: impl Into<String>, member: impl Into<String>) -> Self {
        Hook { name: name.into(), member: member.into() }
    }

    /// Derives the hook name from the method name.
    ///
    /// ```rust
    /// use ferrous_injector::Hook;
    ///
    /// assert_eq!(Hook::named_after("on_init").name, "init");
    /// assert_eq!(Hook::named_after("onInit").name, "init");
    /// assert_eq!(Hook::named_after("setup").name, "setup");
    /// ```
    pub fn named_after(member: impl Into<String>) -> Self {
        let member = member.into();
        let name = if let Some(rest) = member.strip_prefix("on_").filter(|r| !r.is_empty()) {
            rest.to_string()
        } else if let Some(rest) = member
            .strip_prefix("on")
            .filter(|r| r.starts_with(|c: char| c.is_ascii_uppercase()))
        {
            let mut chars = rest.chars();
            match chars.next() {
                Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                None => rest.to_string(),
            }
        } else {
            member.clone()
        };
        Hook { name, member }
    }

    pub fn is_init(&self) -> bool {
        self.name == Self::INIT
    }
}
