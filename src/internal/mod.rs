//! Internal implementation details.

pub(crate) mod depth;
pub(crate) mod sync;

pub(crate) use depth::DepthGuard;
pub(crate) use sync::{Lock, TokenMap};
