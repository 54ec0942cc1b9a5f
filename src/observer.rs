//! Resolution observers.
//!
//! Observers are registered on the root injector and shared by the whole
//! tree. Timing is only taken when at least one observer is registered.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::injector::Injector;
use crate::token::Token;

/// Hooks into resolution events.
///
/// Calls are made synchronously on the resolving thread, so implementations
/// should stay cheap.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{Injector, InjectorObserver, Provider, Resolver, Token};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder(Mutex<Vec<String>>);
///
/// impl InjectorObserver for Recorder {
///     fn resolved(&self, token: &Token, _injector: &Injector, _elapsed: Duration) {
///         self.0.lock().unwrap().push(token.to_string());
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let injector = Injector::builder()
///     .provide(Provider::value(Token::named("answer"), 42u32))
///     .observer(recorder.clone())
///     .build()
///     .unwrap();
///
/// injector.get_token::<u32>(&Token::named("answer"), Default::default()).unwrap();
/// assert_eq!(*recorder.0.lock().unwrap(), vec!["answer".to_string()]);
/// ```
pub trait InjectorObserver: Send + Sync {
    /// A lookup is starting.
    fn resolving(&self, token: &Token, injector: &Injector) {
        let _ = (token, injector);
    }

    /// A lookup succeeded, including optional lookups that came back empty.
    fn resolved(&self, token: &Token, injector: &Injector, elapsed: Duration) {
        let _ = (token, injector, elapsed);
    }

    /// A lookup failed.
    fn failed(&self, token: &Token, injector: &Injector, error: &DiError) {
        let _ = (token, injector, error);
    }

    /// A child injector was created.
    fn child_created(&self, parent: &Injector, child: &Injector) {
        let _ = (parent, child);
    }
}

/// Observers shared by an injector tree.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn InjectorObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn InjectorObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, token: &Token, injector: &Injector) {
        for observer in &self.observers {
            observer.resolving(token, injector);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, token: &Token, injector: &Injector, elapsed: Duration) {
        for observer in &self.observers {
            observer.resolved(token, injector, elapsed);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, token: &Token, injector: &Injector, error: &DiError) {
        for observer in &self.observers {
            observer.failed(token, injector, error);
        }
    }

    #[inline]
    pub(crate) fn child_created(&self, parent: &Injector, child: &Injector) {
        for observer in &self.observers {
            observer.child_created(parent, child);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

/// Observer emitting `tracing` events.
///
/// Resolutions are logged at debug level and failures at warn level, with
/// `token`, `injector`, `scope` and `elapsed_us` fields.
///
/// ```
/// use ferrous_injector::{Injector, LoggingObserver};
/// use std::sync::Arc;
///
/// let injector = Injector::builder()
///     .observer(Arc::new(LoggingObserver::new()))
///     .build()
///     .unwrap();
/// assert!(injector.is_root());
/// ```
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    target: &'static str,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self { target: "ferrous_injector" }
    }

    /// Label attached to every event as the `source` field.
    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl InjectorObserver for LoggingObserver {
    fn resolving(&self, token: &Token, injector: &Injector) {
        tracing::trace!(
            source = self.target,
            token = %token,
            injector = %injector.id(),
            scope = injector.scope().id(),
            "resolving"
        );
    }

    fn resolved(&self, token: &Token, injector: &Injector, elapsed: Duration) {
        tracing::debug!(
            source = self.target,
            token = %token,
            injector = %injector.id(),
            scope = injector.scope().id(),
            elapsed_us = elapsed.as_micros() as u64,
            "resolved"
        );
    }

    fn failed(&self, token: &Token, injector: &Injector, error: &DiError) {
        tracing::warn!(
            source = self.target,
            token = %token,
            injector = %injector.id(),
            scope = injector.scope().id(),
            error = %error,
            "resolution failed"
        );
    }

    fn child_created(&self, parent: &Injector, child: &Injector) {
        tracing::debug!(
            source = self.target,
            parent = %parent.id(),
            injector = %child.id(),
            scope = child.scope().id(),
            "child injector created"
        );
    }
}
