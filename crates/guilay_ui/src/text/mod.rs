//! Glyph sources and text rasterization.
//!
//! Two sources share one contract: the procedural [`BitmapFont`], which
//! needs nothing from the backend, and the [`AtlasFont`], whose bitmaps are
//! rasterized by a [`FontBackend`] and uploaded through a [`GlyphUploader`].

mod atlas;
mod bitmap;
mod glyph;
mod raster;

pub use atlas::{AtlasFont, FontBackend, GlyphUploader, RasterizedGlyph};
pub use bitmap::{BitmapFont, FONT_CHAR_HEIGHT, FONT_CHAR_WIDTH, FONT_FIRST_CHAR, FONT_GLYPH_COUNT};
pub use glyph::{Glyph, GlyphKind, GlyphSource, TextureHandle};
pub use raster::{rasterize, Rasterize, Triangle};
