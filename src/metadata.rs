//! Descriptor lookup for classes.
//!
//! The injector never inspects types. It asks a [`MetadataSource`] for the
//! descriptors of a class: constructor parameters, method parameters, injected
//! members, factory members and hooks. [`MetadataRegistry`] is the in-memory
//! source used by default; it falls back to what each class declares through
//! [`Injectable::metadata`](crate::Injectable::metadata).

use std::collections::HashMap;

use crate::class::{AnyArc, Argument, Class};
use crate::descriptors::{Dependency, FactoryMember, Hook};
use crate::error::DiResult;
use crate::internal::TokenMap;

/// Descriptor query used by injectors. Implementations must be side-effect free.
pub trait MetadataSource: Send + Sync {
    /// Constructor parameter descriptors, in declaration order.
    fn constructor_dependencies(&self, class: &Class) -> Vec<Dependency>;

    /// Parameter descriptors of a method.
    fn method_dependencies(&self, class: &Class, method: &str) -> Vec<Dependency>;

    /// Members assigned after construction, one descriptor per member.
    fn member_dependencies(&self, class: &Class) -> Vec<(String, Dependency)> {
        let _ = class;
        Vec::new()
    }

    fn factories(&self, class: &Class) -> Vec<FactoryMember> {
        let _ = class;
        Vec::new()
    }

    fn hooks(&self, class: &Class) -> Vec<Hook> {
        let _ = class;
        Vec::new()
    }
}

/// Descriptors of one class.
///
/// Annotation rules:
/// - a parameter descriptor without an index takes `max + 1`
/// - a second descriptor at an existing index merges into the first
/// - the first descriptor registered for a member wins
///
/// ```rust
/// use ferrous_injector::{ClassMetadata, Dependency, InjectFlags};
///
/// let mut meta = ClassMetadata::default();
/// meta.inject(Dependency::token("a"))
///     .inject(Dependency::token("b"))
///     .inject(Dependency::token("c").at(0).optional());
///
/// let deps = meta.constructor();
/// assert_eq!(deps.len(), 2);
/// assert_eq!(deps[0].parameter, Some(0));
/// assert!(deps[0].flags.contains(InjectFlags::OPTIONAL));
/// assert_eq!(deps[1].parameter, Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClassMetadata {
    constructor: Vec<Dependency>,
    methods: HashMap<String, Vec<Dependency>>,
    members: Vec<(String, Dependency)>,
    factories: Vec<FactoryMember>,
    hooks: Vec<Hook>,
}

impl ClassMetadata {
    /// Adds a constructor parameter descriptor.
    pub fn inject(&mut self, dependency: Dependency) -> &mut Self {
        add_parameter(&mut self.constructor, dependency);
        self
    }

    /// Adds a parameter descriptor to a method.
    pub fn method(&mut self, method: impl Into<String>, dependency: Dependency) -> &mut Self {
        add_parameter(self.methods.entry(method.into()).or_default(), dependency);
        self
    }

    /// Adds a member injection. Later descriptors for the same member are ignored.
    pub fn member(&mut self, member: impl Into<String>, dependency: Dependency) -> &mut Self {
        let member = member.into();
        if !self.members.iter().any(|(name, _)| *name == member) {
            let mut dependency = dependency;
            dependency.parameter = None;
            self.members.push((member, dependency));
        }
        self
    }

    pub fn factory<F>(&mut self, member: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&AnyArc) -> DiResult<Argument> + Send + Sync + 'static,
    {
        self.factories.push(FactoryMember::new(member, factory));
        self
    }

    pub fn hook(&mut self, hook: Hook) -> &mut Self {
        self.hooks.push(hook);
        self
    }

    pub fn constructor(&self) -> &[Dependency] {
        &self.constructor
    }

    pub fn method_parameters(&self, method: &str) -> &[Dependency] {
        self.methods.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn members(&self) -> &[(String, Dependency)] {
        &self.members
    }

    pub fn factory_members(&self) -> &[FactoryMember] {
        &self.factories
    }

    pub fn hook_list(&self) -> &[Hook] {
        &self.hooks
    }
}

fn add_parameter(list: &mut Vec<Dependency>, mut dependency: Dependency) {
    let index = match dependency.parameter {
        Some(index) => index,
        None => list.iter().filter_map(|d| d.parameter).max().map_or(0, |max| max + 1),
    };
    dependency.parameter = Some(index);

    match list.iter().position(|d| d.parameter == Some(index)) {
        Some(existing) => {
            let merged = list.remove(existing).merge(dependency);
            list.insert(existing, merged);
        }
        None => list.push(dependency),
    }
}

/// In-memory [`MetadataSource`] keyed by class token.
///
/// ```rust
/// use ferrous_injector::{Class, Dependency, MetadataRegistry, MetadataSource, Hook};
///
/// struct Service;
/// let class = Class::from_fn(|_| Ok(Service));
///
/// let mut registry = MetadataRegistry::new();
/// registry
///     .class(&class)
///     .inject(Dependency::token("db"))
///     .member("cache", Dependency::token("cache"))
///     .hook(Hook::named_after("on_init"));
///
/// assert_eq!(registry.constructor_dependencies(&class).len(), 1);
/// assert_eq!(registry.member_dependencies(&class)[0].0, "cache");
/// assert!(registry.hooks(&class)[0].is_init());
/// ```
#[derive(Default)]
pub struct MetadataRegistry {
    classes: TokenMap<ClassMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptors of `class`, seeded from what the class declares.
    pub fn class(&mut self, class: &Class) -> &mut ClassMetadata {
        self.classes
            .entry(class.token().clone())
            .or_insert_with(|| class.declared_metadata().clone())
    }

    fn lookup<'a>(&'a self, class: &'a Class) -> &'a ClassMetadata {
        self.classes.get(class.token()).unwrap_or_else(|| class.declared_metadata())
    }
}

impl MetadataSource for MetadataRegistry {
    fn constructor_dependencies(&self, class: &Class) -> Vec<Dependency> {
        self.lookup(class).constructor().to_vec()
    }

    fn method_dependencies(&self, class: &Class, method: &str) -> Vec<Dependency> {
        self.lookup(class).method_parameters(method).to_vec()
    }

    fn member_dependencies(&self, class: &Class) -> Vec<(String, Dependency)> {
        self.lookup(class).members().to_vec()
    }

    fn factories(&self, class: &Class) -> Vec<FactoryMember> {
        self.lookup(class).factory_members().to_vec()
    }

    fn hooks(&self, class: &Class) -> Vec<Hook> {
        self.lookup(class).hook_list().to_vec()
    }
}
