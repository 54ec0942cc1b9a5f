//! Resolver traits for typed resolution.

use std::any::Any;
use std::sync::Arc;

use crate::class::{downcast, Argument};
use crate::error::{DiError, DiResult};
use crate::flags::InjectFlags;
use crate::injector::Injector;
use crate::token::Token;

/// Object-safe resolution entry point.
///
/// Values come back type-erased; an empty result is only possible for
/// optional lookups or providers producing an empty value.
pub trait ResolverCore: Send + Sync {
    fn resolve_any(&self, token: &Token, flags: InjectFlags) -> DiResult<Argument>;
}

/// Typed helpers over [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use ferrous_injector::{Injector, InjectFlags, Provider, Resolver, Token};
///
/// struct Greeting(&'static str);
///
/// let injector = Injector::root(vec![
///     Provider::value_of(Greeting("hello")),
///     Provider::value(Token::named("retries"), 3u32),
/// ], true).unwrap();
///
/// assert_eq!(injector.get::<Greeting>().unwrap().0, "hello");
/// assert_eq!(injector.get_required::<Greeting>().0, "hello");
/// assert!(injector.get_optional::<u64>().unwrap().is_none());
///
/// let retries = injector
///     .get_token::<u32>(&Token::named("retries"), InjectFlags::DEFAULT)
///     .unwrap();
/// assert_eq!(retries.as_deref(), Some(&3));
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the provider registered for type `T`.
    fn get<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let token = Token::of::<T>();
        self.get_token::<T>(&token, InjectFlags::DEFAULT)?
            .ok_or_else(|| DiError::NotFound(token.display_name().to_string()))
    }

    /// Like [`get`](Self::get), but empty when nothing provides `T`.
    fn get_optional<T: Any + Send + Sync>(&self) -> DiResult<Option<Arc<T>>> {
        self.get_token::<T>(&Token::of::<T>(), InjectFlags::OPTIONAL)
    }

    /// Resolves any token and downcasts the value to `T`.
    fn get_token<T: Any + Send + Sync>(
        &self,
        token: &Token,
        flags: InjectFlags,
    ) -> DiResult<Option<Arc<T>>> {
        self.resolve_any(token, flags)?.map(downcast::<T>).transpose()
    }

    /// Resolves `T`, panicking on failure.
    ///
    /// # Panics
    ///
    /// When `T` cannot be resolved.
    fn get_required<T: Any + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {:?}", std::any::type_name::<T>(), e))
    }

    /// Resolves a tag group, downcasting every item to `T`.
    fn get_tagged<T: Any + Send + Sync>(&self, tag: &Token) -> DiResult<Vec<Option<Arc<T>>>> {
        let items = match self.get_token::<Vec<Argument>>(tag, InjectFlags::DEFAULT)? {
            Some(items) => items,
            None => return Ok(Vec::new()),
        };
        items
            .iter()
            .map(|item| item.clone().map(downcast::<T>).transpose())
            .collect()
    }
}

impl ResolverCore for Injector {
    fn resolve_any(&self, token: &Token, flags: InjectFlags) -> DiResult<Argument> {
        self.get_any(token, flags)
    }
}

impl Resolver for Injector {}
