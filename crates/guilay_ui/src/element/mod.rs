//! Element types and the tree that owns them.
//!
//! Elements live in an arena and are addressed by [`ElementId`]. Ownership is
//! membership in exactly one child list: the window root list or a section's
//! list. Handles held anywhere else (the quadtree, placements) never own.

mod core;
mod tree;

pub use self::core::{Button, Callback, Element, ElementId, ElementKind, Section, Text};
pub use self::tree::{ElementTree, ParentRef, SectionMut, DEFAULT_MAX_ELEMENTS};
