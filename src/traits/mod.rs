//! Core traits.

pub mod resolver;

pub use resolver::{Resolver, ResolverCore};
