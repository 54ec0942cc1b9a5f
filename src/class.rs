//! Type-erased constructors, member setters and methods.
//!
//! Rust has no runtime classes, so the injector works on [`Class`] values: a
//! token plus three erased functions building an instance, assigning a member
//! and invoking a method. [`Class::of`] derives them from an [`Injectable`]
//! implementation; [`Class::from_fn`] wraps a plain constructor closure.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::metadata::ClassMetadata;
use crate::token::Token;

/// Shared, type-erased value handed out by injectors.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// One entry of an argument list. `None` stands for an empty slot.
pub type Argument = Option<AnyArc>;

/// Wraps a value as a filled argument.
///
/// ```rust
/// use ferrous_injector::arg;
///
/// let a = arg(42u32);
/// assert_eq!(a.unwrap().downcast_ref::<u32>(), Some(&42));
/// ```
pub fn arg<T: Any + Send + Sync>(value: T) -> Argument {
    Some(Arc::new(value))
}

/// Positional arguments passed to a constructor or method.
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<Argument>,
}

impl Arguments {
    pub fn new(values: Vec<Argument>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw slot at `index`, failing past the end of the list.
    pub fn raw(&self, index: usize) -> DiResult<&Argument> {
        self.values
            .get(index)
            .ok_or(DiError::MissingArgument { index, len: self.values.len() })
    }

    /// A filled slot of type `T`.
    ///
    /// Fails with `MissingArgument` past the end, and with `TypeMismatch`
    /// when the slot is empty or holds another type.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
        match self.raw(index)? {
            Some(value) => downcast::<T>(value.clone()),
            None => Err(DiError::TypeMismatch(format!(
                "empty argument {} for {}",
                index,
                std::any::type_name::<T>()
            ))),
        }
    }

    /// A slot of type `T` that may be empty or absent.
    pub fn optional<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Option<Arc<T>>> {
        match self.values.get(index) {
            Some(Some(value)) => downcast::<T>(value.clone()).map(Some),
            _ => Ok(None),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<Argument> {
        self.values
    }
}

impl From<Vec<Argument>> for Arguments {
    fn from(values: Vec<Argument>) -> Self {
        Arguments::new(values)
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.values.iter().map(|v| if v.is_some() { "<value>" } else { "<empty>" }))
            .finish()
    }
}

pub(crate) fn downcast<T: Any + Send + Sync>(value: AnyArc) -> DiResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>().to_string()))
}

/// A type the injector can build, fill and call into.
///
/// Members injected after construction are assigned through `&self`, so
/// late-bound fields use interior mutability (`OnceLock`, `Mutex`, ...).
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Arguments, ClassMetadata, DiResult, Dependency, Injectable};
/// use std::sync::Arc;
///
/// struct Port(u16);
///
/// struct Server {
///     port: Arc<Port>,
/// }
///
/// impl Injectable for Server {
///     fn construct(args: &Arguments) -> DiResult<Self> {
///         Ok(Server { port: args.get::<Port>(0)? })
///     }
///
///     fn metadata() -> ClassMetadata {
///         let mut meta = ClassMetadata::default();
///         meta.inject(Dependency::on::<Port>());
///         meta
///     }
/// }
/// ```
pub trait Injectable: Any + Send + Sync + Sized {
    /// Builds the instance from its mixed argument list.
    fn construct(args: &Arguments) -> DiResult<Self>;

    /// Descriptors declared by the type itself.
    fn metadata() -> ClassMetadata {
        ClassMetadata::default()
    }

    /// Assigns an injected member.
    fn assign(&self, member: &str, _value: Argument) -> DiResult<()> {
        Err(unknown_member(std::any::type_name::<Self>(), member))
    }

    /// Invokes a method with its mixed argument list.
    fn invoke(&self, method: &str, _args: &Arguments) -> DiResult<Argument> {
        Err(unknown_member(std::any::type_name::<Self>(), method))
    }
}

fn unknown_member(class: &str, member: &str) -> DiError {
    DiError::UnknownMember { class: class.to_string(), member: member.to_string() }
}

type ConstructFn = dyn Fn(&Arguments) -> DiResult<AnyArc> + Send + Sync;
type AssignFn = dyn Fn(&AnyArc, &str, Argument) -> DiResult<()> + Send + Sync;
type InvokeFn = dyn Fn(&AnyArc, &str, &Arguments) -> DiResult<Argument> + Send + Sync;

/// A constructible type as seen by the injector.
///
/// Two classes are equal when their tokens are equal.
#[derive(Clone)]
pub struct Class {
    token: Token,
    name: &'static str,
    metadata: Arc<ClassMetadata>,
    construct: Arc<ConstructFn>,
    assign: Arc<AssignFn>,
    invoke: Arc<InvokeFn>,
}

impl Class {
    /// Class backed by an [`Injectable`] type.
    pub fn of<T: Injectable>() -> Self {
        let name = std::any::type_name::<T>();
        Class {
            token: Token::of::<T>(),
            name,
            metadata: Arc::new(T::metadata()),
            construct: Arc::new(|args: &Arguments| {
                T::construct(args).map(|v| Arc::new(v) as AnyArc)
            }),
            assign: Arc::new(move |instance: &AnyArc, member: &str, value: Argument| {
                match instance.downcast_ref::<T>() {
                    Some(instance) => instance.assign(member, value),
                    None => Err(DiError::TypeMismatch(name.to_string())),
                }
            }),
            invoke: Arc::new(move |instance: &AnyArc, method: &str, args: &Arguments| {
                match instance.downcast_ref::<T>() {
                    Some(instance) => instance.invoke(method, args),
                    None => Err(DiError::TypeMismatch(name.to_string())),
                }
            }),
        }
    }

    /// Class built by a closure, with no members or methods.
    ///
    /// ```rust
    /// use ferrous_injector::{Class, Injector, Resolver};
    ///
    /// struct Clock;
    ///
    /// let injector = Injector::root(vec![], true).unwrap();
    /// injector.add_class(Class::from_fn(|_| Ok(Clock)));
    /// assert!(injector.get::<Clock>().is_ok());
    /// ```
    pub fn from_fn<T, F>(construct: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        let name = std::any::type_name::<T>();
        Class {
            token: Token::of::<T>(),
            name,
            metadata: Arc::new(ClassMetadata::default()),
            construct: Arc::new(move |args: &Arguments| {
                construct(args).map(|v| Arc::new(v) as AnyArc)
            }),
            assign: Arc::new(move |_: &AnyArc, member: &str, _: Argument| {
                Err(unknown_member(name, member))
            }),
            invoke: Arc::new(move |_: &AnyArc, method: &str, _: &Arguments| {
                Err(unknown_member(name, method))
            }),
        }
    }

    /// Replaces the descriptors declared by the type.
    pub fn with_metadata(mut self, metadata: ClassMetadata) -> Self {
        self.metadata = Arc::new(metadata);
        self
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Descriptors declared alongside the type.
    pub fn declared_metadata(&self) -> &ClassMetadata {
        &self.metadata
    }

    pub fn construct(&self, args: &Arguments) -> DiResult<AnyArc> {
        (self.construct)(args)
    }

    pub fn assign(&self, instance: &AnyArc, member: &str, value: Argument) -> DiResult<()> {
        (self.assign)(instance, member, value)
    }

    pub fn invoke(&self, instance: &AnyArc, method: &str, args: &Arguments) -> DiResult<Argument> {
        (self.invoke)(instance, method, args)
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Class").field(&self.name).finish()
    }
}

/// What [`Injector::call`](crate::Injector::call) invokes.
#[derive(Debug, Clone, Copy)]
pub enum CallTarget<'a> {
    /// Build a new instance from constructor descriptors only
    Constructor(&'a Class),
    /// Call a method on an existing instance
    Method {
        class: &'a Class,
        instance: &'a AnyArc,
        method: &'a str,
    },
}
