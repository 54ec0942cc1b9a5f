//! Scope levels for injector trees.

use std::borrow::Cow;
use std::fmt;

use crate::{DiError, DiResult};

/// A lifetime tier owned by an injector.
///
/// Levels start at 1 (the broadest, singleton-like tier) and grow towards
/// narrower, request-like tiers. A child injector's level is never below its
/// parent's. Level 0 is reserved for unscoped providers and is never the
/// level of an injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scope {
    id: u32,
}

impl Scope {
    /// The broadest tier, used by root injectors by default.
    pub const ROOT: Scope = Scope { id: 1 };

    /// Creates a scope with the given level. Fails for level 0.
    pub fn new(id: u32) -> DiResult<Self> {
        if id < 1 {
            return Err(DiError::InvalidScope { requested: i64::from(id), parent: 0 });
        }
        Ok(Scope { id })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Computes the scope of a child injector.
    ///
    /// - `New` (`true`): one level above the parent, or 1 without a parent
    /// - `Parent` (`false`): the parent's scope, or 1 without a parent
    /// - `Level(n)` / `Exact(scope)`: that level, which must be at least 1
    ///   and at least the parent's level
    ///
    /// ```rust
    /// use ferrous_injector::Scope;
    ///
    /// let root = Scope::create_child(true, None).unwrap();
    /// assert_eq!(root.id(), 1);
    ///
    /// let child = Scope::create_child(true, Some(root)).unwrap();
    /// assert_eq!(child.id(), 2);
    ///
    /// assert_eq!(Scope::create_child(false, Some(child)).unwrap(), child);
    /// assert!(Scope::create_child(1, Some(child)).is_err());
    /// assert!(Scope::create_child(-3, None).is_err());
    /// ```
    pub fn create_child(request: impl Into<ScopeRequest>, parent: Option<Scope>) -> DiResult<Scope> {
        let parent_id = parent.map_or(0, |p| p.id);
        let requested: i64 = match request.into() {
            ScopeRequest::New => {
                return parent_id.checked_add(1).map(|id| Scope { id }).ok_or(
                    DiError::InvalidScope { requested: i64::from(parent_id) + 1, parent: parent_id },
                )
            }
            ScopeRequest::Parent => return Ok(parent.unwrap_or(Scope::ROOT)),
            ScopeRequest::Level(level) => level,
            ScopeRequest::Exact(scope) => i64::from(scope.id),
            ScopeRequest::Named(name) => {
                return Err(DiError::Config(format!("unresolved scope tier {:?}", name)))
            }
        };

        if requested < 1 || requested < i64::from(parent_id) {
            return Err(DiError::InvalidScope { requested, parent: parent_id });
        }
        let id = u32::try_from(requested)
            .map_err(|_| DiError::InvalidScope { requested, parent: parent_id })?;
        Ok(Scope { id })
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::ROOT
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.id)
    }
}

/// How a new injector picks its scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRequest {
    /// A fresh tier one level above the parent
    New,
    /// Share the parent's tier
    Parent,
    /// An explicit level
    Level(i64),
    /// An existing scope value
    Exact(Scope),
    /// A tier name looked up in the injector configuration
    Named(Cow<'static, str>),
}

impl ScopeRequest {
    /// Tier looked up by name in [`InjectorConfig`](crate::InjectorConfig).
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        ScopeRequest::Named(name.into())
    }
}

impl From<bool> for ScopeRequest {
    fn from(new_tier: bool) -> Self {
        if new_tier {
            ScopeRequest::New
        } else {
            ScopeRequest::Parent
        }
    }
}

impl From<i32> for ScopeRequest {
    fn from(level: i32) -> Self {
        ScopeRequest::Level(i64::from(level))
    }
}

impl From<u32> for ScopeRequest {
    fn from(level: u32) -> Self {
        ScopeRequest::Level(i64::from(level))
    }
}

impl From<i64> for ScopeRequest {
    fn from(level: i64) -> Self {
        ScopeRequest::Level(level)
    }
}

impl From<Scope> for ScopeRequest {
    fn from(scope: Scope) -> Self {
        ScopeRequest::Exact(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn false_without_parent_is_root() {
        assert_eq!(Scope::create_child(false, None).unwrap(), Scope::ROOT);
    }

    #[test]
    fn explicit_level_may_skip_tiers() {
        let parent = Scope::new(1).unwrap();
        assert_eq!(Scope::create_child(5, Some(parent)).unwrap().id(), 5);
        assert_eq!(Scope::create_child(1, Some(parent)).unwrap().id(), 1);
    }

    #[test]
    fn zero_and_negative_levels_are_rejected() {
        assert_eq!(
            Scope::create_child(0, None),
            Err(DiError::InvalidScope { requested: 0, parent: 0 })
        );
        assert!(Scope::create_child(-1, None).is_err());
        assert!(Scope::new(0).is_err());
    }

    #[test]
    fn new_child_past_the_last_level_is_rejected() {
        let last = Scope::new(u32::MAX).unwrap();
        assert_eq!(
            Scope::create_child(true, Some(last)),
            Err(DiError::InvalidScope { requested: i64::from(u32::MAX) + 1, parent: u32::MAX })
        );
        assert_eq!(Scope::create_child(false, Some(last)).unwrap(), last);
    }

    #[test]
    fn narrower_parent_rejects_broader_child() {
        let parent = Scope::new(3).unwrap();
        assert_eq!(
            Scope::create_child(Scope::new(2).unwrap(), Some(parent)),
            Err(DiError::InvalidScope { requested: 2, parent: 3 })
        );
    }

    #[test]
    fn named_tiers_need_configuration() {
        assert!(matches!(
            Scope::create_child(ScopeRequest::named("request"), None),
            Err(DiError::Config(_))
        ));
    }
}
