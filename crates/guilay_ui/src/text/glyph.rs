//! Glyph descriptors and the glyph source contract.

use guilay_core::{Extent, Point};

/// Backend texture holding one glyph bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// How a glyph is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlyphKind {
    /// Procedural bit rows, most significant of `width` bits is the left-most pixel.
    Bitmap {
        /// One byte per row, top row first.
        rows: &'static [u8],
        /// Significant bits per row.
        width: u8,
    },
    /// A pre-rasterized bitmap uploaded to the backend.
    Atlas {
        /// The texture holding the bitmap.
        texture: TextureHandle,
        /// Bitmap size in pixels.
        size: Extent,
    },
}

/// The immutable shape and metrics of one character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// The character this glyph draws.
    pub code: char,
    /// Unscaled distance from this glyph's origin to the next, in pixels.
    pub advance: f32,
    /// Offset from the pen to the bitmap's left edge (x) and top edge (y).
    pub bearing: Point,
    /// Drawing data.
    pub kind: GlyphKind,
}

impl Glyph {
    /// Returns true if the procedural cell at `(row, col)` is set.
    ///
    /// Atlas glyphs carry coverage in their texture and report false.
    #[must_use]
    pub fn covers(&self, row: usize, col: usize) -> bool {
        match self.kind {
            GlyphKind::Bitmap { rows, width } => {
                let width = usize::from(width);
                col < width
                    && rows
                        .get(row)
                        .is_some_and(|bits| (bits >> (width - 1 - col)) & 1 == 1)
            }
            GlyphKind::Atlas { .. } => false,
        }
    }
}

/// Supplies glyphs to the rasterizer.
///
/// Implementations own whatever tables or textures back their glyphs and are
/// passed to the rasterizer explicitly.
pub trait GlyphSource {
    /// Returns the glyph for `c`, or None if the source does not cover it.
    fn glyph(&self, c: char) -> Option<Glyph>;

    /// Unscaled advance used for characters the source does not cover.
    fn fallback_advance(&self) -> f32;

    /// Unscaled distance between consecutive baselines.
    fn line_height(&self) -> f32;

    /// Returns the width of `text` at `scale`, missing glyphs included.
    fn measure(&self, text: &str, scale: f32) -> f32 {
        text.chars()
            .map(|c| self.glyph(c).map_or_else(|| self.fallback_advance(), |g| g.advance))
            .sum::<f32>()
            * scale
    }
}

impl<S: GlyphSource + ?Sized> GlyphSource for &S {
    fn glyph(&self, c: char) -> Option<Glyph> {
        (**self).glyph(c)
    }

    fn fallback_advance(&self) -> f32 {
        (**self).fallback_advance()
    }

    fn line_height(&self) -> f32 {
        (**self).line_height()
    }
}

impl<S: GlyphSource + ?Sized> GlyphSource for Box<S> {
    fn glyph(&self, c: char) -> Option<Glyph> {
        (**self).glyph(c)
    }

    fn fallback_advance(&self) -> f32 {
        (**self).fallback_advance()
    }

    fn line_height(&self) -> f32 {
        (**self).line_height()
    }
}
