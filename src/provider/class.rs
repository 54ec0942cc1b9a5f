//! Class instantiation and its side-effect passes.

use crate::arguments::{mix_arguments, resolve_all, resolve_dependency};
use crate::class::{AnyArc, Argument, Arguments, Class};
use crate::error::DiResult;
use crate::injector::Injector;

/// Builds a class instance and runs its member, factory and init-hook passes,
/// in that order.
pub(crate) fn instantiate(injector: &Injector, class: &Class, args: &[Argument]) -> DiResult<AnyArc> {
    let metadata = injector.metadata();

    let resolved = resolve_all(injector, class, &metadata.constructor_dependencies(class), None)?;
    let instance = class.construct(&Arguments::new(mix_arguments(resolved, args.to_vec())))?;

    let hooks = metadata.hooks(class);

    for (member, dependency) in metadata.member_dependencies(class) {
        if hooks.iter().any(|hook| hook.member == member) {
            continue;
        }
        let value = resolve_dependency(injector, Some(class), &dependency, Some(&instance))?;
        class.assign(&instance, &member, value)?;
    }

    for factory in metadata.factories(class) {
        let value = factory.produce(&instance)?;
        class.assign(&instance, &factory.member, value)?;
    }

    for hook in hooks.iter().filter(|hook| hook.is_init()) {
        let dependencies = metadata.method_dependencies(class, &hook.member);
        let resolved = resolve_all(injector, class, &dependencies, Some(&instance))?;
        class.invoke(&instance, &hook.member, &Arguments::new(mix_arguments(resolved, Vec::new())))?;
    }

    tracing::trace!(class = class.name(), injector = %injector.id(), "instantiated");
    Ok(instance)
}

/// Instance shared by every resolution of a singleton class provider.
///
/// The slot is never locked while the instance is built, so a class that
/// re-enters its own provider hits the depth guard instead of a deadlock.
/// When two threads race, the first stored instance wins.
#[derive(Default)]
pub(crate) struct InstanceSlot {
    #[cfg(feature = "once-cell")]
    cell: once_cell::sync::OnceCell<AnyArc>,
    #[cfg(not(feature = "once-cell"))]
    cell: crate::internal::Lock<Option<AnyArc>>,
}

impl InstanceSlot {
    pub(crate) fn get_or_create(
        &self,
        create: impl FnOnce() -> DiResult<AnyArc>,
    ) -> DiResult<AnyArc> {
        if let Some(existing) = self.get() {
            return Ok(existing);
        }
        let created = create()?;
        Ok(self.store(created))
    }

    #[cfg(feature = "once-cell")]
    fn get(&self) -> Option<AnyArc> {
        self.cell.get().cloned()
    }

    #[cfg(feature = "once-cell")]
    fn store(&self, value: AnyArc) -> AnyArc {
        match self.cell.try_insert(value) {
            Ok(stored) => stored.clone(),
            Err((existing, _)) => existing.clone(),
        }
    }

    #[cfg(not(feature = "once-cell"))]
    fn get(&self) -> Option<AnyArc> {
        self.cell.with(|slot| slot.clone())
    }

    #[cfg(not(feature = "once-cell"))]
    fn store(&self, value: AnyArc) -> AnyArc {
        self.cell.with(|slot| slot.get_or_insert(value).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn slot_keeps_first_instance() {
        let slot = InstanceSlot::default();
        let first = slot.get_or_create(|| Ok(Arc::new(1u8) as AnyArc)).unwrap();
        let second = slot.get_or_create(|| Ok(Arc::new(2u8) as AnyArc)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.downcast_ref::<u8>(), Some(&1));
    }

    #[test]
    fn failed_creation_leaves_slot_empty() {
        let slot = InstanceSlot::default();
        assert!(slot
            .get_or_create(|| Err(crate::DiError::NotFound("x".into())))
            .is_err());
        assert!(slot.get_or_create(|| Ok(Arc::new(3u8) as AnyArc)).is_ok());
    }
}
