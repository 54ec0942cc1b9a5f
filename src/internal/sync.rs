//! Lock and map aliases switched by cargo features.

use std::collections::HashMap;

use crate::token::Token;

#[cfg(feature = "ahash")]
pub(crate) type TokenMap<V> = HashMap<Token, V, ahash::RandomState>;

#[cfg(not(feature = "ahash"))]
pub(crate) type TokenMap<V> = HashMap<Token, V>;

/// Mutex wrapper hiding the lock implementation.
///
/// Poisoning is ignored: every critical section in the crate is a plain map
/// read or insert that cannot leave the data half-written.
#[derive(Default)]
pub(crate) struct Lock<T> {
    #[cfg(feature = "parking-lot")]
    inner: parking_lot::Mutex<T>,
    #[cfg(not(feature = "parking-lot"))]
    inner: std::sync::Mutex<T>,
}

impl<T> Lock<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            #[cfg(feature = "parking-lot")]
            inner: parking_lot::Mutex::new(value),
            #[cfg(not(feature = "parking-lot"))]
            inner: std::sync::Mutex::new(value),
        }
    }

    /// Runs `f` with the lock held. Never call back into an injector from `f`.
    #[inline]
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        #[cfg(feature = "parking-lot")]
        {
            let mut guard = self.inner.lock();
            f(&mut guard)
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            let mut guard = match self.inner.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            f(&mut guard)
        }
    }
}

