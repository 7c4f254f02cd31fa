//! # UI Error Types
//!
//! Errors raised by the element tree, the spatial index and glyph loading.

use guilay_core::{Rect, SlotListError};
use thiserror::Error;

use crate::element::ElementId;

/// Errors raised by element tree operations.
///
/// Every failing operation leaves the tree exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    /// No storage left for another element.
    #[error("element allocation failed: {live} of {capacity} elements in use")]
    Allocation {
        /// Elements currently alive.
        live: usize,
        /// Configured upper bound.
        capacity: usize,
    },

    /// A child list could not grow.
    #[error("out of memory: could not grow child list to {requested} slots")]
    OutOfMemory {
        /// The slot count that was requested.
        requested: usize,
    },

    /// The handle does not name a live element.
    #[error("unknown element {0:?}")]
    UnknownElement(ElementId),

    /// Only sections (and the window root) hold children.
    #[error("element {0:?} cannot hold children")]
    NotAContainer(ElementId),

    /// The element already has an owner.
    #[error("element {0:?} is already attached to a parent")]
    AlreadyAttached(ElementId),

    /// Attaching would make a section its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle {
        /// The intended parent.
        parent: ElementId,
        /// The element being attached.
        child: ElementId,
    },

    /// Index past the end of a child list.
    #[error("index {index} out of bounds for child list of {len}")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Current list length.
        len: usize,
    },

    /// The slot already holds an element.
    #[error("child slot {index} is already occupied")]
    SlotOccupied {
        /// The occupied index.
        index: usize,
    },
}

impl From<SlotListError> for ElementError {
    fn from(err: SlotListError) -> Self {
        match err {
            SlotListError::OutOfMemory { requested } => Self::OutOfMemory { requested },
            SlotListError::IndexOutOfBounds { index, len } => {
                Self::IndexOutOfBounds { index, len }
            }
            SlotListError::SlotOccupied { index } => Self::SlotOccupied { index },
        }
    }
}

/// Result type for element tree operations.
pub type ElementResult<T> = Result<T, ElementError>;

/// Errors raised by the spatial index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    /// The target region is reserved (or, for reservations, already holds items).
    #[error("capacity exceeded: region {bounds:?} is fully occupied")]
    CapacityExceeded {
        /// Bounds of the rejected request.
        bounds: Rect,
    },

    /// The bounds are not inside the indexed region.
    #[error("bounds {bounds:?} lie outside the indexed region")]
    OutOfBounds {
        /// Bounds of the rejected request.
        bounds: Rect,
    },
}

/// Result type for spatial index operations.
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Errors raised while producing glyphs.
///
/// None of these abort a frame: a glyph that cannot be produced is skipped
/// and the pen still advances.
#[derive(Error, Debug)]
pub enum GlyphError {
    /// The source has no glyph for this character.
    #[error("no glyph for {0:?}")]
    Missing(char),

    /// The font backend failed on one character.
    #[error("failed to load glyph {character:?}: {reason}")]
    Load {
        /// The character that failed.
        character: char,
        /// Backend-supplied reason.
        reason: String,
    },

    /// The font itself could not be parsed.
    #[error("invalid font: {0}")]
    Font(String),

    /// The render backend rejected a glyph bitmap.
    #[error("glyph upload failed: {0}")]
    Upload(String),

    /// The font file could not be read.
    #[error("font i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for glyph operations.
pub type GlyphResult<T> = Result<T, GlyphError>;
