//! Arena handles.
//!
//! # Design
//! Nodes and scopes live in flat vectors owned by [`Ast`](crate::Ast). A
//! handle is a `u32` index into one of them. Handles never dangle while the
//! arena lives, so a "weak" edge is simply a handle that traversal does not
//! follow; shared declarations are one slot aliased by many handles.

use std::fmt;

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "interchange", serde(transparent))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Index into the owning vector.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

define_index!(
    /// Handle to a node in the arena.
    NodeId,
    "NodeId"
);

define_index!(
    /// Handle to a scope segment in the arena.
    ScopeId,
    "ScopeId"
);

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{NodeId, ScopeId};
    crate::static_assert_size!(NodeId, 4);
    crate::static_assert_size!(Option<NodeId>, 8);
    crate::static_assert_size!(ScopeId, 4);
}

#[cfg(test)]
mod tests;
