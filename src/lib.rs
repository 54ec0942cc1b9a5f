//! # ferrous-injector
//!
//! Hierarchical dependency injection with scope tiers, for Rust.
//!
//! ## Features
//!
//! - **Injector trees**: children see their ancestors' providers and can
//!   override them locally
//! - **Scope tiers**: providers declare the tier they live in; instances are
//!   shared per injector of that tier
//! - **Six provider kinds**: values, classes, factories, aliases, tag groups
//!   and defaults deferring to ancestors
//! - **Argument mixing**: injected constructor and method parameters
//!   interleave with explicit arguments
//! - **Member injection and init hooks** driven by pluggable metadata
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_injector::{
//!     Arguments, Class, ClassMetadata, Dependency, DiResult, Injectable, Injector,
//!     Provider, Resolver, Token,
//! };
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//!     table: Arc<&'static str>,
//! }
//!
//! impl Injectable for UserService {
//!     fn construct(args: &Arguments) -> DiResult<Self> {
//!         Ok(UserService { db: args.get(0)?, table: args.get(1)? })
//!     }
//!
//!     fn metadata() -> ClassMetadata {
//!         let mut meta = ClassMetadata::default();
//!         meta.inject(Dependency::on::<Database>());
//!         meta
//!     }
//! }
//!
//! let root = Injector::root(vec![
//!     Provider::value_of(Database { url: "postgres://localhost".to_string() }),
//!     Provider::class(Class::of::<UserService>()).with_args(vec![ferrous_injector::arg("users")]),
//! ], true).unwrap();
//!
//! let users = root.get::<UserService>().unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! assert_eq!(*users.table, "users");
//!
//! // Class providers are cached per tier: the same instance comes back
//! assert!(Arc::ptr_eq(&users, &root.get::<UserService>().unwrap()));
//! ```
//!
//! ## Scopes
//!
//! Every injector has a scope level, 1 being the broadest. A provider with
//! [`Lifetime::SCOPED`] registered on the root is instantiated once per
//! level-2 child, and cannot be resolved from the root itself.
//!
//! ```rust
//! use ferrous_injector::{DiError, Injector, Lifetime, Provider, Resolver};
//! use std::sync::Arc;
//!
//! struct RequestState;
//!
//! let root = Injector::root(vec![
//!     Provider::factory_of(|_| Ok(RequestState)).cacheable(true).with_lifetime(Lifetime::SCOPED),
//! ], true).unwrap();
//!
//! let a = root.create_child(vec![], true).unwrap();
//! let b = root.create_child(vec![], true).unwrap();
//! assert!(!Arc::ptr_eq(&a.get::<RequestState>().unwrap(), &b.get::<RequestState>().unwrap()));
//! assert!(matches!(root.get::<RequestState>(), Err(DiError::ScopeViolation { .. })));
//! ```

pub mod arguments;
pub mod class;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod flags;
pub mod injector;
pub mod lifetime;
pub mod metadata;
pub mod observer;
pub mod provider;
pub mod scope;
pub mod token;
pub mod traits;

mod internal;

pub use arguments::mix_arguments;
pub use class::{arg, AnyArc, Argument, Arguments, CallTarget, Class, Injectable};
pub use config::{InjectorConfig, DEFAULT_MAX_DEPTH};
pub use descriptors::{Dependency, FactoryMember, Hook};
pub use error::{DiError, DiResult};
pub use flags::InjectFlags;
pub use injector::{Found, Injector, InjectorBuilder, InjectorId, Located};
pub use lifetime::Lifetime;
pub use metadata::{ClassMetadata, MetadataRegistry, MetadataSource};
pub use observer::{InjectorObserver, LoggingObserver};
pub use provider::Provider;
pub use scope::{Scope, ScopeRequest};
pub use token::Token;
pub use traits::{Resolver, ResolverCore};
