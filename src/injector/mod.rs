//! Hierarchical injectors.
//!
//! An [`Injector`] is a node in a tree. Each node owns a scope, its local
//! providers and two caches (resolved values and providers located at an
//! ancestor). Nodes only point to their parent; lookups walk root-ward.

mod builder;

pub use builder::InjectorBuilder;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::arguments::{mix_arguments, resolve_all};
use crate::class::{AnyArc, Argument, Arguments, CallTarget, Class};
use crate::config::InjectorConfig;
use crate::error::{DiError, DiResult};
use crate::flags::InjectFlags;
use crate::internal::{DepthGuard, Lock, TokenMap};
use crate::metadata::MetadataSource;
use crate::observer::Observers;
use crate::provider::{instantiate, Provider};
use crate::scope::{Scope, ScopeRequest};
use crate::token::Token;

#[cfg(feature = "smallvec")]
type Path = smallvec::SmallVec<[Injector; 8]>;
#[cfg(not(feature = "smallvec"))]
type Path = Vec<Injector>;

static NEXT_INJECTOR: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InjectorId(u64);

impl fmt::Display for InjectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "injector#{}", self.0)
    }
}

/// State shared by every injector of one tree.
pub(crate) struct Shared {
    pub(crate) metadata: Arc<dyn MetadataSource>,
    pub(crate) observers: Observers,
    pub(crate) config: InjectorConfig,
}

impl Shared {
    fn scope_request(&self, request: ScopeRequest) -> DiResult<ScopeRequest> {
        match request {
            ScopeRequest::Named(name) => self.config.tier(&name).map(ScopeRequest::Exact),
            other => Ok(other),
        }
    }
}

#[derive(Clone)]
struct CachedValue {
    owner: InjectorId,
    value: Argument,
}

#[derive(Clone)]
struct CachedProvider {
    owner: Injector,
    provider: Arc<Provider>,
}

struct InjectorInner {
    id: InjectorId,
    parent: Option<Injector>,
    scope: Scope,
    shared: Arc<Shared>,
    providers: Lock<TokenMap<Arc<Provider>>>,
    provider_cache: Lock<TokenMap<CachedProvider>>,
    value_cache: Lock<TokenMap<CachedValue>>,
}

/// A node of the injector tree.
///
/// Cloning is cheap and yields a handle to the same node. Children keep their
/// parent alive; parents never reference their children.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Injector, Lifetime, Provider, Resolver};
///
/// struct Database(&'static str);
/// struct Session;
///
/// let root = Injector::root(vec![Provider::value_of(Database("postgres://"))], true).unwrap();
/// let request = root.create_child(vec![], true).unwrap();
/// request.add(Provider::factory_of(|_| Ok(Session)).cacheable(true));
///
/// assert_eq!(request.get::<Database>().unwrap().0, "postgres://");
/// assert!(request.get::<Session>().is_ok());
/// assert!(root.get_optional::<Session>().unwrap().is_none());
/// assert_eq!(request.scope().id(), 2);
/// ```
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

/// Where a lookup was satisfied.
#[derive(Debug, Clone)]
pub enum Found {
    /// A cached value
    Value { value: Argument, owner: InjectorId },
    /// A provider still to be resolved
    Provider {
        provider: Arc<Provider>,
        /// Injector the provider is registered on
        owner: Injector,
        /// The hit came from a provider cache
        cached: bool,
    },
}

/// Result of [`Injector::locate`].
#[derive(Debug, Clone)]
pub struct Located {
    /// Injector whose table or cache produced the hit
    pub found_at: Injector,
    /// Injector a provider hit would be instantiated with
    pub resolver: Injector,
    pub found: Found,
}

/// Position of the resolving injector on a lookup path.
///
/// `levels` lists scope levels from the caller (first) up to the injector
/// where the provider was found (last). Unscoped providers resolve at the
/// caller. Otherwise the result is the first position, walking from the found
/// end down to the caller, whose level is at least
/// `max(provider_scope, owner_level)`. Without one the caller is used and the
/// scope check fails afterwards.
pub(crate) fn resolving_position<I>(levels: I, provider_scope: u32, owner_level: u32) -> usize
where
    I: DoubleEndedIterator<Item = u32> + ExactSizeIterator,
{
    if provider_scope == 0 {
        return 0;
    }
    let required = provider_scope.max(owner_level);
    levels
        .enumerate()
        .rev()
        .find(|(_, level)| *level >= required)
        .map_or(0, |(index, _)| index)
}

fn resolving_injector(path: &[Injector], provider_scope: u32, owner_level: u32) -> Injector {
    let position =
        resolving_position(path.iter().map(|i| i.scope().id()), provider_scope, owner_level);
    path[position].clone()
}

fn not_found(token: &Token, flags: InjectFlags) -> DiResult<Argument> {
    if flags.contains(InjectFlags::OPTIONAL) {
        Ok(None)
    } else {
        Err(DiError::NotFound(token.display_name().to_string()))
    }
}

impl Injector {
    /// Builds a root injector with `providers` and the requested scope.
    ///
    /// `true` and `false` both give level 1 for a root; an explicit level must
    /// be at least 1.
    pub fn root(providers: Vec<Provider>, scope: impl Into<ScopeRequest>) -> DiResult<Injector> {
        InjectorBuilder::new().providers(providers).scope(scope).build()
    }

    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    fn node(parent: Option<Injector>, scope: Scope, shared: Arc<Shared>) -> Injector {
        Injector {
            inner: Arc::new(InjectorInner {
                id: InjectorId(NEXT_INJECTOR.fetch_add(1, Ordering::Relaxed)),
                parent,
                scope,
                shared,
                providers: Lock::new(TokenMap::default()),
                provider_cache: Lock::new(TokenMap::default()),
                value_cache: Lock::new(TokenMap::default()),
            }),
        }
    }

    /// Creates a child seeded with `providers`.
    ///
    /// ```rust
    /// use ferrous_injector::{DiError, Injector};
    ///
    /// let root = Injector::root(vec![], true).unwrap();
    /// let child = root.create_child(vec![], true).unwrap();
    /// assert_eq!(child.scope().id(), 2);
    /// assert_eq!(child.parent().unwrap().id(), root.id());
    ///
    /// let sibling_scope = child.create_child(vec![], false).unwrap();
    /// assert_eq!(sibling_scope.scope(), child.scope());
    ///
    /// assert!(matches!(
    ///     child.create_child(vec![], 1),
    ///     Err(DiError::InvalidScope { requested: 1, parent: 2 })
    /// ));
    /// ```
    pub fn create_child(
        &self,
        providers: Vec<Provider>,
        scope: impl Into<ScopeRequest>,
    ) -> DiResult<Injector> {
        let shared = &self.inner.shared;
        let request = shared.scope_request(scope.into())?;
        let scope = Scope::create_child(request, Some(self.scope()))?;

        let child = Injector::node(Some(self.clone()), scope, shared.clone());
        for provider in providers {
            child.add(provider);
        }
        shared.observers.child_created(self, &child);
        Ok(child)
    }

    pub fn id(&self) -> InjectorId {
        self.inner.id
    }

    pub fn scope(&self) -> Scope {
        self.inner.scope
    }

    pub fn parent(&self) -> Option<&Injector> {
        self.inner.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    pub fn config(&self) -> &InjectorConfig {
        &self.inner.shared.config
    }

    /// Descriptor source shared by the tree.
    pub fn metadata(&self) -> &dyn MetadataSource {
        &*self.inner.shared.metadata
    }

    /// Registers a provider on this injector, replacing any local provider
    /// for the same token. `Inherit` lifetimes bind to this injector's level.
    pub fn add(&self, provider: Provider) {
        let provider = provider.registered_at(self.scope().id());
        let token = provider.token().clone();
        self.inner.providers.with(|providers| {
            providers.insert(token, Arc::new(provider));
        });
    }

    /// Registers a class under its own token.
    pub fn add_class(&self, class: Class) {
        self.add(Provider::class(class));
    }

    /// Registers a class under another token.
    pub fn set(&self, token: impl Into<Token>, class: Class) {
        self.add(Provider::class_as(token, class));
    }

    /// Adds `tokens` to the local tag group `tag`, creating it if needed.
    ///
    /// ```rust
    /// use ferrous_injector::{DiError, Injector, Provider, Resolver, Token};
    ///
    /// let root = Injector::root(vec![
    ///     Provider::value(Token::named("a"), 1u8),
    ///     Provider::value(Token::named("b"), 2u8),
    /// ], true).unwrap();
    /// root.tag("numbers", ["a", "b", "a"]).unwrap();
    ///
    /// let numbers = root.get_tagged::<u8>(&Token::named("numbers")).unwrap();
    /// assert_eq!(numbers.len(), 2);
    ///
    /// assert!(matches!(root.tag("a", ["b"]), Err(DiError::InvalidTag(_))));
    /// ```
    pub fn tag<T: Into<Token>>(
        &self,
        tag: impl Into<Token>,
        tokens: impl IntoIterator<Item = T>,
    ) -> DiResult<()> {
        let tag = tag.into();
        let level = self.scope().id();
        let provider = self.inner.providers.with(|providers| {
            providers
                .entry(tag.clone())
                .or_insert_with(|| Arc::new(Provider::tagged(tag.clone(), Vec::new(), true).registered_at(level)))
                .clone()
        });
        provider.add_tagged(tokens.into_iter().map(Into::into))
    }

    /// Finds where `token` would be answered from, without resolving it.
    pub fn locate(&self, token: &Token, flags: InjectFlags) -> Option<Located> {
        let use_cache = !flags.contains(InjectFlags::SKIP_CACHE);
        let self_only = flags.contains(InjectFlags::SELF);
        let mut path = Path::new();
        let mut current = self.clone();

        loop {
            path.push(current.clone());

            if use_cache {
                let value = current.inner.value_cache.with(|cache| cache.get(token).cloned());
                if let Some(hit) = value {
                    if !self_only || hit.owner == self.id() {
                        return Some(Located {
                            found_at: current.clone(),
                            resolver: current,
                            found: Found::Value { value: hit.value, owner: hit.owner },
                        });
                    }
                }

                let provider = current.inner.provider_cache.with(|cache| cache.get(token).cloned());
                if let Some(hit) = provider {
                    if !self_only || hit.owner == *self {
                        // Only unscoped providers are cached here, and those
                        // resolve at the caller
                        return Some(Located {
                            found_at: current,
                            resolver: self.clone(),
                            found: Found::Provider { provider: hit.provider, owner: hit.owner, cached: true },
                        });
                    }
                }
            }

            let local = current.inner.providers.with(|providers| providers.get(token).cloned());
            if let Some(provider) = local {
                let resolver = resolving_injector(&path, provider.scope(), current.scope().id());
                return Some(Located {
                    found_at: current.clone(),
                    resolver,
                    found: Found::Provider { provider, owner: current, cached: false },
                });
            }

            if self_only {
                return None;
            }
            match current.inner.parent.clone() {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Resolves `token`, returning `None` only for optional lookups.
    ///
    /// Requesting `Token::of::<Injector>()` yields this injector. It is never
    /// cached.
    pub fn get_any(&self, token: &Token, flags: InjectFlags) -> DiResult<Argument> {
        let _guard = DepthGuard::enter(self.inner.shared.config.max_resolution_depth)?;

        if flags.contains(InjectFlags::SKIP_SELF) {
            return match (&self.inner.parent, flags.contains(InjectFlags::SELF)) {
                (Some(parent), false) => parent.get_any(token, flags.without(InjectFlags::SKIP_SELF)),
                _ => not_found(token, flags),
            };
        }

        if *token == Token::of::<Injector>() {
            return Ok(Some(Arc::new(self.clone()) as AnyArc));
        }

        let observers = &self.inner.shared.observers;
        if !observers.has_observers() {
            return self.resolve_located(token, flags);
        }

        observers.resolving(token, self);
        let started = Instant::now();
        let result = self.resolve_located(token, flags);
        match &result {
            Ok(_) => observers.resolved(token, self, started.elapsed()),
            Err(error) => observers.failed(token, self, error),
        }
        result
    }

    fn resolve_located(&self, token: &Token, flags: InjectFlags) -> DiResult<Argument> {
        let Located { found_at, resolver, found } = match self.locate(token, flags) {
            Some(located) => located,
            None => return not_found(token, flags),
        };
        let use_cache = !flags.contains(InjectFlags::SKIP_CACHE);

        match found {
            Found::Value { value, owner } => {
                if use_cache && found_at != *self {
                    return Ok(self.cache_value(token, CachedValue { owner, value }));
                }
                Ok(value)
            }
            Found::Provider { provider, owner, cached } => {
                let scope = provider.scope();
                let level = resolver.scope().id();
                if level < scope {
                    return Err(DiError::ScopeViolation {
                        token: token.display_name().to_string(),
                        provider_scope: scope,
                        injector_scope: level,
                    });
                }

                let value = provider.resolve(&resolver)?;
                if !use_cache {
                    return Ok(value);
                }

                if scope == 0 && owner != *self && !(cached && found_at == *self) {
                    self.inner.provider_cache.with(|cache| {
                        cache.entry(token.clone()).or_insert_with(|| CachedProvider {
                            owner: owner.clone(),
                            provider: provider.clone(),
                        });
                    });
                }

                if !provider.is_cacheable() {
                    return Ok(value);
                }

                let mut entry = CachedValue { owner: owner.id(), value };
                if scope > 0 && resolver != *self {
                    entry.value = resolver.cache_value(token, entry.clone());
                }
                Ok(self.cache_value(token, entry))
            }
        }
    }

    /// Stores a value unless this injector already holds one from the same
    /// owner, returning the value now cached.
    fn cache_value(&self, token: &Token, entry: CachedValue) -> Argument {
        self.inner.value_cache.with(|cache| match cache.get(token) {
            Some(existing) if existing.owner == entry.owner => existing.value.clone(),
            _ => {
                let value = entry.value.clone();
                cache.insert(token.clone(), entry);
                value
            }
        })
    }

    /// Builds a new instance of `class`, bypassing providers and caches.
    ///
    /// `args` fill the positions not claimed by constructor descriptors.
    pub fn create(&self, class: &Class, args: Vec<Argument>) -> DiResult<AnyArc> {
        let _guard = DepthGuard::enter(self.inner.shared.config.max_resolution_depth)?;
        instantiate(self, class, &args)
    }

    /// Calls a constructor or a method with its descriptors mixed with `args`.
    ///
    /// Constructor calls skip the member, factory and hook passes. Method
    /// calls may use "provide self".
    pub fn call(&self, target: CallTarget<'_>, args: Vec<Argument>) -> DiResult<Argument> {
        let _guard = DepthGuard::enter(self.inner.shared.config.max_resolution_depth)?;
        let metadata = self.metadata();

        match target {
            CallTarget::Constructor(class) => {
                let dependencies = metadata.constructor_dependencies(class);
                let resolved = resolve_all(self, class, &dependencies, None)?;
                let instance = class.construct(&Arguments::new(mix_arguments(resolved, args)))?;
                Ok(Some(instance))
            }
            CallTarget::Method { class, instance, method } => {
                let dependencies = metadata.method_dependencies(class, method);
                let resolved = resolve_all(self, class, &dependencies, Some(instance))?;
                class.invoke(instance, method, &Arguments::new(mix_arguments(resolved, args)))
            }
        }
    }

    /// Tokens registered locally, in no particular order.
    pub fn local_tokens(&self) -> Vec<Token> {
        self.inner.providers.with(|providers| providers.keys().cloned().collect())
    }

    /// Multi-line dump of this injector and its ancestors.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let mut current = Some(self);
        let mut depth = 0;
        while let Some(injector) = current {
            let indent = "  ".repeat(depth);
            let inner = &injector.inner;
            let _ = writeln!(
                out,
                "{}{} {} (values cached: {}, providers cached: {})",
                indent,
                inner.id,
                inner.scope,
                inner.value_cache.with(|c| c.len()),
                inner.provider_cache.with(|c| c.len()),
            );
            let mut providers: Vec<String> = inner.providers.with(|providers| {
                providers
                    .values()
                    .map(|p| format!("{} [{}, scope {}]", p.token(), p.kind_name(), p.scope()))
                    .collect()
            });
            providers.sort();
            for provider in providers {
                let _ = writeln!(out, "{}  - {}", indent, provider);
            }
            current = injector.parent();
            depth += 1;
        }
        out
    }
}

impl PartialEq for Injector {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Injector {}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("id", &self.inner.id)
            .field("scope", &self.inner.scope.id())
            .field("parent", &self.inner.parent.as_ref().map(Injector::id))
            .field("providers", &self.inner.providers.with(|p| p.len()))
            .field("observers", &self.inner.shared.observers.len())
            .finish()
    }
}
