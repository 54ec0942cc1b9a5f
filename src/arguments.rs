//! Dependency resolution and argument mixing.

use crate::class::{AnyArc, Argument, Class};
use crate::descriptors::Dependency;
use crate::error::{DiError, DiResult};
use crate::flags::InjectFlags;
use crate::injector::Injector;
use crate::provider::Provider;
use crate::scope::ScopeRequest;

/// Resolves one descriptor against `injector`.
///
/// `provide_self` makes `instance` resolvable by the class token in an
/// ephemeral child, and `provides` seeds another child with extra providers.
/// Both children share the caller's scope and are dropped afterwards.
pub(crate) fn resolve_dependency(
    injector: &Injector,
    class: Option<&Class>,
    dependency: &Dependency,
    instance: Option<&AnyArc>,
) -> DiResult<Argument> {
    let mut target = injector.clone();

    if dependency.provide_self {
        let (class, instance) = match (class, instance) {
            (Some(class), Some(instance)) => (class, instance),
            _ => {
                let owner = class.map_or(dependency.token.display_name(), |c| c.name());
                return Err(DiError::MissingSelf(owner.to_string()));
            }
        };
        let own = Provider::value_arg(class.token().clone(), Some(instance.clone()));
        target = target.create_child(vec![own], ScopeRequest::Parent)?;
    }

    if !dependency.provides.is_empty() {
        target = target.create_child(dependency.provides.clone(), ScopeRequest::Parent)?;
    }

    let value = match &dependency.construct {
        Some((class, args)) => Some(target.create(class, args.clone())?),
        None => target.get_any(&dependency.token, dependency.flags)?,
    };

    if value.is_none() && dependency.flags.contains(InjectFlags::OPTIONAL) {
        if let Some(default) = &dependency.default_value {
            return Ok(Some(default.clone()));
        }
    }
    Ok(value)
}

/// Resolves every descriptor, pairing each value with its position.
pub(crate) fn resolve_all(
    injector: &Injector,
    class: &Class,
    dependencies: &[Dependency],
    instance: Option<&AnyArc>,
) -> DiResult<Vec<(Option<usize>, Argument)>> {
    dependencies
        .iter()
        .map(|dep| Ok((dep.parameter, resolve_dependency(injector, Some(class), dep, instance)?)))
        .collect()
}

/// Interleaves resolved dependencies with explicit arguments.
///
/// Resolved values land on their declared positions. Unclaimed positions up
/// to the highest claimed one take explicit arguments in order, or an empty
/// slot once those run out, and leftover explicit arguments are appended.
/// Entries without a position are ignored.
///
/// ```rust
/// use ferrous_injector::{arg, mix_arguments};
///
/// let mixed = mix_arguments(
///     vec![(Some(2), arg("b")), (Some(0), arg("a"))],
///     vec![arg("x"), arg("y")],
/// );
/// let names: Vec<&str> = mixed
///     .iter()
///     .map(|v| *v.as_ref().unwrap().downcast_ref::<&str>().unwrap())
///     .collect();
/// assert_eq!(names, ["a", "x", "b", "y"]);
/// ```
pub fn mix_arguments(resolved: Vec<(Option<usize>, Argument)>, explicit: Vec<Argument>) -> Vec<Argument> {
    let mut positioned: Vec<(usize, Argument)> = resolved
        .into_iter()
        .filter_map(|(index, value)| index.map(|index| (index, value)))
        .collect();
    positioned.sort_by_key(|(index, _)| *index);

    let mut explicit = explicit.into_iter();
    let mut mixed = Vec::with_capacity(positioned.len() + explicit.len());
    let mut next = 0;

    for (index, value) in positioned {
        while next < index {
            mixed.push(explicit.next().flatten());
            next += 1;
        }
        mixed.push(value);
        next += 1;
    }

    mixed.extend(explicit);
    mixed
}
