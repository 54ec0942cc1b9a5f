//! Providers: recipes producing the value for a token.
//!
//! A [`Provider`] pairs a token with a declared [`Lifetime`], a cacheability
//! flag and one of six closed variants. Resolution always goes through
//! [`Provider::resolve`] with the injector chosen to instantiate it.

mod class;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::arguments::resolve_dependency;
use crate::class::{downcast, AnyArc, Argument, Arguments, Class};
use crate::descriptors::Dependency;
use crate::error::{DiError, DiResult};
use crate::flags::InjectFlags;
use crate::injector::Injector;
use crate::internal::Lock;
use crate::lifetime::Lifetime;
use crate::token::Token;

pub(crate) use class::instantiate;
use class::InstanceSlot;

type FactoryFn = dyn Fn(&Arguments) -> DiResult<Argument> + Send + Sync;

/// The recipe behind a provider.
#[derive(Clone)]
pub(crate) enum ProviderKind {
    /// A fixed value
    Value(Argument),
    /// Instantiate a class, then run its member, factory and hook passes
    Class {
        class: Class,
        args: Vec<Argument>,
        instance: Option<Arc<InstanceSlot>>,
    },
    /// Call a function with resolved dependencies
    Factory {
        dependencies: Vec<Dependency>,
        factory: Arc<FactoryFn>,
    },
    /// Resolve another token
    Alias { alias: Token, flags: InjectFlags },
    /// Resolve a set of tokens into a list
    Tagged { items: Arc<Lock<Vec<Token>>>, inherit: bool },
    /// Prefer whatever an ancestor provides, else fall back
    Default(Box<Provider>),
}

/// A registered recipe for a token.
///
/// Cloning a provider shares the singleton slot of a class provider and the
/// item set of a tagged provider.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Injector, InjectFlags, Provider, Resolver, Token};
///
/// let injector = Injector::root(vec![
///     Provider::value(Token::named("port"), 8080u16),
///     Provider::alias(Token::named("http.port"), Token::named("port")),
/// ], true).unwrap();
///
/// let port = injector.get_token::<u16>(&Token::named("http.port"), InjectFlags::DEFAULT).unwrap();
/// assert_eq!(port.as_deref(), Some(&8080));
/// ```
#[derive(Clone)]
pub struct Provider {
    token: Token,
    lifetime: Lifetime,
    cacheable: bool,
    kind: ProviderKind,
}

impl Provider {
    fn new(token: Token, lifetime: Lifetime, cacheable: bool, kind: ProviderKind) -> Self {
        Provider { token, lifetime, cacheable, kind }
    }

    /// A fixed value. Always cacheable, unscoped.
    pub fn value<T: Any + Send + Sync>(token: impl Into<Token>, value: T) -> Self {
        Self::value_arg(token, Some(Arc::new(value)))
    }

    /// A fixed value keyed by its own type.
    pub fn value_of<T: Any + Send + Sync>(value: T) -> Self {
        Self::value(Token::of::<T>(), value)
    }

    /// A fixed, already shared value (possibly empty).
    pub fn value_arg(token: impl Into<Token>, value: Argument) -> Self {
        Self::new(token.into(), Lifetime::Unscoped, true, ProviderKind::Value(value))
    }

    /// A class bound to its own token. Cacheable, inheriting the scope of the
    /// injector it is registered on.
    pub fn class(class: Class) -> Self {
        Self::class_as(class.token().clone(), class)
    }

    /// A class bound to another token.
    pub fn class_as(token: impl Into<Token>, class: Class) -> Self {
        Self::new(
            token.into(),
            Lifetime::Inherit,
            true,
            ProviderKind::Class { class, args: Vec::new(), instance: None },
        )
    }

    /// A factory called with its resolved dependencies. Not cacheable unless
    /// set with [`cacheable`](Self::cacheable).
    pub fn factory<F>(token: impl Into<Token>, dependencies: Vec<Dependency>, factory: F) -> Self
    where
        F: Fn(&Arguments) -> DiResult<Argument> + Send + Sync + 'static,
    {
        Self::new(
            token.into(),
            Lifetime::Unscoped,
            false,
            ProviderKind::Factory { dependencies, factory: Arc::new(factory) },
        )
    }

    /// A dependency-free factory keyed by the type it returns.
    pub fn factory_of<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::factory(Token::of::<T>(), Vec::new(), move |args: &Arguments| {
            factory(args).map(|v| Some(Arc::new(v) as AnyArc))
        })
    }

    /// Resolves `alias` whenever `token` is requested.
    pub fn alias(token: impl Into<Token>, alias: impl Into<Token>) -> Self {
        Self::alias_with(token, alias, InjectFlags::DEFAULT)
    }

    pub fn alias_with(token: impl Into<Token>, alias: impl Into<Token>, flags: InjectFlags) -> Self {
        Self::new(
            token.into(),
            Lifetime::Unscoped,
            false,
            ProviderKind::Alias { alias: alias.into(), flags },
        )
    }

    /// A tag group resolving to `Arc<Vec<Argument>>`.
    ///
    /// With `inherit`, the groups of ancestors come first.
    pub fn tagged(token: impl Into<Token>, items: Vec<Token>, inherit: bool) -> Self {
        let mut unique: Vec<Token> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Self::new(
            token.into(),
            Lifetime::Inherit,
            false,
            ProviderKind::Tagged { items: Arc::new(Lock::new(unique)), inherit },
        )
    }

    /// Defers to an ancestor's provider for the same token, falling back to
    /// `provider` when there is none. Never cacheable.
    pub fn default_for(provider: Provider) -> Self {
        Self::new(
            provider.token.clone(),
            Lifetime::Unscoped,
            false,
            ProviderKind::Default(Box::new(provider)),
        )
    }

    pub fn with_lifetime(mut self, lifetime: impl Into<Lifetime>) -> Self {
        self.lifetime = lifetime.into();
        self
    }

    pub fn cacheable(mut self, cacheable: bool) -> Self {
        self.cacheable = cacheable;
        self
    }

    /// Never caches the produced value.
    pub fn transient(self) -> Self {
        self.cacheable(false)
    }

    /// Gives a class provider one instance shared by every injector that
    /// resolves it, whatever its resolving injector.
    pub fn singleton(mut self) -> Self {
        if let ProviderKind::Class { instance, .. } = &mut self.kind {
            *instance = Some(Arc::new(InstanceSlot::default()));
        }
        self
    }

    /// Explicit trailing arguments for a class provider's constructor.
    pub fn with_args(mut self, explicit: Vec<Argument>) -> Self {
        if let ProviderKind::Class { args, .. } = &mut self.kind {
            *args = explicit;
        }
        self
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Concrete scope level. `Inherit` reads as 0 until registered.
    pub fn scope(&self) -> u32 {
        self.lifetime.level(0)
    }

    pub fn is_cacheable(&self) -> bool {
        match self.kind {
            ProviderKind::Default(_) => false,
            _ => self.cacheable,
        }
    }

    pub(crate) fn kind(&self) -> &ProviderKind {
        &self.kind
    }

    /// Binds `Inherit` to the level of the registering injector.
    pub(crate) fn registered_at(self, level: u32) -> Self {
        let Provider { token, mut lifetime, cacheable, kind } = self;
        if lifetime == Lifetime::Inherit {
            lifetime = Lifetime::Tier(level);
        }
        let kind = match kind {
            ProviderKind::Default(fallback) => {
                ProviderKind::Default(Box::new(fallback.registered_at(level)))
            }
            other => other,
        };
        Provider { token, lifetime, cacheable, kind }
    }

    /// Adds tokens to a tag group, skipping ones already present.
    pub(crate) fn add_tagged(&self, tokens: impl IntoIterator<Item = Token>) -> DiResult<()> {
        match &self.kind {
            ProviderKind::Tagged { items, .. } => {
                items.with(|items| {
                    for token in tokens {
                        if !items.contains(&token) {
                            items.push(token);
                        }
                    }
                });
                Ok(())
            }
            _ => Err(DiError::InvalidTag(self.token.display_name().to_string())),
        }
    }

    /// Produces the value using `injector` as the resolving injector.
    pub fn resolve(&self, injector: &Injector) -> DiResult<Argument> {
        match &self.kind {
            ProviderKind::Value(value) => Ok(value.clone()),
            ProviderKind::Class { class, args, instance } => match instance {
                Some(slot) => slot.get_or_create(|| instantiate(injector, class, args)).map(Some),
                None => instantiate(injector, class, args).map(Some),
            },
            ProviderKind::Factory { dependencies, factory } => {
                let mut values = Vec::with_capacity(dependencies.len());
                for dependency in dependencies {
                    values.push(resolve_dependency(injector, None, dependency, None)?);
                }
                factory(&Arguments::new(values))
            }
            ProviderKind::Alias { alias, flags } => injector.get_any(alias, *flags),
            ProviderKind::Tagged { items, inherit } => {
                let mut values: Vec<Argument> = Vec::new();
                if *inherit {
                    let parent = injector
                        .get_any(&self.token, InjectFlags::OPTIONAL | InjectFlags::SKIP_SELF)?;
                    if let Some(parent) = parent {
                        values.extend(downcast::<Vec<Argument>>(parent)?.iter().cloned());
                    }
                }
                let tokens = items.with(|items| items.clone());
                for token in &tokens {
                    values.push(injector.get_any(token, InjectFlags::DEFAULT)?);
                }
                Ok(Some(Arc::new(values)))
            }
            ProviderKind::Default(fallback) => {
                match injector.get_any(&self.token, InjectFlags::OPTIONAL | InjectFlags::SKIP_SELF)? {
                    Some(value) => Ok(Some(value)),
                    None => fallback.resolve(injector),
                }
            }
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ProviderKind::Value(_) => "value",
            ProviderKind::Class { .. } => "class",
            ProviderKind::Factory { .. } => "factory",
            ProviderKind::Alias { .. } => "alias",
            ProviderKind::Tagged { .. } => "tagged",
            ProviderKind::Default(_) => "default",
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("token", &self.token)
            .field("kind", &self.kind_name())
            .field("lifetime", &self.lifetime)
            .field("cacheable", &self.is_cacheable())
            .finish()
    }
}

impl From<Class> for Provider {
    fn from(class: Class) -> Self {
        Provider::class(class)
    }
}
