//! Provider lifetime declarations.

/// The tier a provider declares when it is built.
///
/// The declared lifetime decides which injector in the tree instantiates a
/// provider and where the result is cached:
///
/// - **Inherit**: adopt the level of the injector the provider is registered
///   on. Rewritten to a concrete level at registration time.
/// - **Unscoped**: level 0. Resolvable from anywhere; the value is cached at
///   the injector that first asked for it.
/// - **Tier(n)**: only instantiable by an injector at level `n` or narrower.
///   The instance lives at the first injector of that tier on the way from the
///   owner down to the caller, so sibling injectors of that tier get distinct
///   instances.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Injector, Lifetime, Provider, Resolver};
/// use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
///
/// struct RequestId(usize);
///
/// let counter = Arc::new(AtomicUsize::new(0));
/// let c = counter.clone();
/// let root = Injector::root(vec![
///     Provider::factory_of::<RequestId, _>(move |_| {
///         Ok(RequestId(c.fetch_add(1, Ordering::SeqCst)))
///     })
///     .cacheable(true)
///     .with_lifetime(Lifetime::SCOPED),
/// ], true).unwrap();
///
/// let first = root.create_child(vec![], Lifetime::SCOPED).unwrap();
/// let second = root.create_child(vec![], Lifetime::SCOPED).unwrap();
///
/// let a = first.get::<RequestId>().unwrap();
/// let b = first.get::<RequestId>().unwrap();
/// let c = second.get::<RequestId>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert!(!Arc::ptr_eq(&a, &c));
///
/// // The root is broader than the provider's tier
/// assert!(root.get::<RequestId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Adopt the scope of the declaring injector
    Inherit,
    /// Level 0, instantiable from anywhere
    Unscoped,
    /// A concrete tier, 1 being the broadest
    Tier(u32),
}

impl Lifetime {
    pub const TRANSIENT: Lifetime = Lifetime::Unscoped;
    pub const SINGLETON: Lifetime = Lifetime::Tier(1);
    pub const SCOPED: Lifetime = Lifetime::Tier(2);

    /// Resolves the lifetime to a level, using `declaring` for `Inherit`.
    pub fn level(self, declaring: u32) -> u32 {
        match self {
            Lifetime::Inherit => declaring,
            Lifetime::Unscoped => 0,
            Lifetime::Tier(level) => level,
        }
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Lifetime::Unscoped
    }
}

impl From<i32> for Lifetime {
    fn from(level: i32) -> Self {
        match level {
            l if l < 0 => Lifetime::Inherit,
            0 => Lifetime::Unscoped,
            l => Lifetime::Tier(l.unsigned_abs()),
        }
    }
}

impl From<u32> for Lifetime {
    fn from(level: u32) -> Self {
        match level {
            0 => Lifetime::Unscoped,
            l => Lifetime::Tier(l),
        }
    }
}

impl From<Lifetime> for crate::ScopeRequest {
    fn from(lifetime: Lifetime) -> Self {
        match lifetime {
            Lifetime::Inherit => crate::ScopeRequest::Parent,
            Lifetime::Unscoped => crate::ScopeRequest::Level(0),
            Lifetime::Tier(level) => crate::ScopeRequest::Level(i64::from(level)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_levels_inherit() {
        assert_eq!(Lifetime::from(-1), Lifetime::Inherit);
        assert_eq!(Lifetime::from(0), Lifetime::Unscoped);
        assert_eq!(Lifetime::from(2), Lifetime::SCOPED);
        assert_eq!(Lifetime::from(1u32), Lifetime::SINGLETON);
    }

    #[test]
    fn inherit_adopts_declaring_level() {
        assert_eq!(Lifetime::Inherit.level(3), 3);
        assert_eq!(Lifetime::Unscoped.level(3), 0);
        assert_eq!(Lifetime::Tier(2).level(3), 2);
    }
}
