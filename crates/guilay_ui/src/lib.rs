//! # Guilay UI
//!
//! The retained half of the toolkit:
//! - An element tree with strict single ownership
//! - A quadtree answering "what sits at this point / in this region"
//! - Glyph sources and the rasterizer that turns strings into triangles
//! - Flow placement and texture-batched vertex output
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       FRAME PIPELINE                      │
//! ├──────────────────────────────────────────────────────────┤
//! │  ElementTree → FlowLayout → Rasterize → FrameBuilder     │
//! │       ↓             ↓                         ↓          │
//! │   Quadtree     Placements                DrawBatches     │
//! │  (hit-test)                            (backend submit)  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in here talks to a window or a GPU. Backends consume
//! [`render::DrawBatch`]es and implement [`text::GlyphUploader`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod element;
pub mod error;
pub mod layout;
pub mod render;
pub mod spatial;
pub mod text;

pub use element::{
    Button, Element, ElementId, ElementKind, ElementTree, ParentRef, Section, Text,
    DEFAULT_MAX_ELEMENTS,
};
pub use error::{
    ElementError, ElementResult, GlyphError, GlyphResult, SpatialError, SpatialResult,
};
pub use layout::{FlowLayout, Placement};
pub use render::{DrawBatch, FrameBuilder, UiVertex};
pub use spatial::{NodeStatus, Quadtree, QuadtreeNode, SpatialEntry, DEFAULT_MAX_DEPTH};
pub use text::{
    rasterize, AtlasFont, BitmapFont, FontBackend, Glyph, GlyphKind, GlyphSource, GlyphUploader,
    RasterizedGlyph, TextureHandle, Triangle,
};
