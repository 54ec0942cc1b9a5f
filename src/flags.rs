//! Lookup flags modifying a single resolution call.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Bitset of lookup modifiers.
///
/// - `OPTIONAL`: return empty instead of failing with `NotFound`
/// - `SKIP_SELF`: start the search at the parent injector
/// - `SELF`: never look past the injector the call was made on
/// - `SKIP_CACHE`: neither read nor populate the caches
///
/// `SKIP_SELF | SELF`, and `SKIP_SELF` on a root injector, can never be
/// satisfied and are reported as a missing token.
///
/// ```rust
/// use ferrous_injector::InjectFlags;
///
/// let flags = InjectFlags::OPTIONAL | InjectFlags::SKIP_SELF;
/// assert!(flags.contains(InjectFlags::OPTIONAL));
/// assert!(!flags.without(InjectFlags::SKIP_SELF).contains(InjectFlags::SKIP_SELF));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InjectFlags(u8);

impl InjectFlags {
    pub const DEFAULT: InjectFlags = InjectFlags(0);
    pub const OPTIONAL: InjectFlags = InjectFlags(1 << 0);
    pub const SKIP_SELF: InjectFlags = InjectFlags(1 << 1);
    pub const SELF: InjectFlags = InjectFlags(1 << 2);
    pub const SKIP_CACHE: InjectFlags = InjectFlags(1 << 3);

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Builds flags from raw bits, dropping unknown ones.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        InjectFlags(bits & 0b1111)
    }

    /// True when every bit of `other` is set.
    pub const fn contains(self, other: InjectFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Copy with the bits of `other` cleared.
    pub const fn without(self, other: InjectFlags) -> Self {
        InjectFlags(self.0 & !other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for InjectFlags {
    type Output = InjectFlags;

    fn bitor(self, rhs: Self) -> Self {
        InjectFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for InjectFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for InjectFlags {
    type Output = InjectFlags;

    fn bitand(self, rhs: Self) -> Self {
        InjectFlags(self.0 & rhs.0)
    }
}

impl fmt::Debug for InjectFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("DEFAULT");
        }
        let names = [
            (InjectFlags::OPTIONAL, "OPTIONAL"),
            (InjectFlags::SKIP_SELF, "SKIP_SELF"),
            (InjectFlags::SELF, "SELF"),
            (InjectFlags::SKIP_CACHE, "SKIP_CACHE"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&set.join(" | "))
    }
}
