//! Recursion bound for nested resolution.

use std::cell::Cell;

use crate::error::{DiError, DiResult};

// Thread-local nesting depth of get/create calls
thread_local! {
    static RESOLUTION_DEPTH: Cell<usize> = Cell::new(0);
}

/// Guard bounding the nesting depth of resolution on the current thread.
///
/// Default and tagged providers legitimately ask their parent for their own
/// token, so a repeated token is not a cycle. Only the depth is bounded.
pub(crate) struct DepthGuard {
    _private: (),
}

impl DepthGuard {
    pub(crate) fn enter(max_depth: usize) -> DiResult<Self> {
        RESOLUTION_DEPTH.with(|depth| {
            let current = depth.get();
            if current >= max_depth {
                return Err(DiError::DepthExceeded(current));
            }
            depth.set(current + 1);
            Ok(DepthGuard { _private: () })
        })
    }

    #[cfg(test)]
    pub(crate) fn current() -> usize {
        RESOLUTION_DEPTH.with(Cell::get)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        RESOLUTION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_unwinds_on_drop() {
        let before = DepthGuard::current();
        {
            let _a = DepthGuard::enter(8).unwrap();
            let _b = DepthGuard::enter(8).unwrap();
            assert_eq!(DepthGuard::current(), before + 2);
        }
        assert_eq!(DepthGuard::current(), before);
    }

    #[test]
    fn exceeding_max_depth_fails() {
        let _a = DepthGuard::enter(2).unwrap();
        let _b = DepthGuard::enter(2).unwrap();
        assert_eq!(DepthGuard::enter(2).err(), Some(DiError::DepthExceeded(2)));
    }
}
