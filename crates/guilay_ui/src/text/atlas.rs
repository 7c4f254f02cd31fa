//! Atlas font: glyph bitmaps rasterized once by a font backend and uploaded
//! to textures owned by the render backend.

use std::collections::BTreeMap;

use guilay_core::{Extent, Point};
use tracing::{debug, info, warn};

use super::glyph::{Glyph, GlyphKind, GlyphSource, TextureHandle};
use crate::error::{GlyphError, GlyphResult};

/// A single glyph bitmap as produced by a font backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizedGlyph {
    /// The rasterized character.
    pub character: char,
    /// Bitmap size in pixels.
    pub size: Extent,
    /// Horizontal offset from the pen to the bitmap's left edge.
    pub bearing_x: i32,
    /// Vertical offset from the baseline to the bitmap's top edge.
    pub bearing_y: i32,
    /// Advance in 1/64 pixel units.
    pub advance: i32,
    /// One coverage byte per pixel, rows top to bottom.
    pub coverage: Vec<u8>,
}

/// Turns characters into coverage bitmaps at a fixed pixel size.
pub trait FontBackend {
    /// The rasterization size in pixels.
    fn pixel_size(&self) -> u32;

    /// Rasterizes one character.
    ///
    /// # Errors
    ///
    /// Returns a [`GlyphError`] if the character cannot be produced.
    fn rasterize(&mut self, c: char) -> GlyphResult<RasterizedGlyph>;
}

/// Stores glyph bitmaps where the renderer can sample them.
pub trait GlyphUploader {
    /// Uploads a coverage bitmap and returns the texture holding it.
    ///
    /// # Errors
    ///
    /// Returns [`GlyphError::Upload`] if the backend rejects the bitmap.
    fn upload_glyph(&mut self, glyph: &RasterizedGlyph) -> GlyphResult<TextureHandle>;

    /// Frees a texture returned by [`upload_glyph`](Self::upload_glyph).
    fn release_glyph(&mut self, texture: TextureHandle);
}

/// A glyph source backed by uploaded bitmaps.
///
/// Descriptors are produced once at load time and never change.
#[derive(Debug, Clone)]
pub struct AtlasFont {
    glyphs: BTreeMap<char, Glyph>,
    pixel_size: u32,
}

impl AtlasFont {
    /// Rasterizes and uploads every code point in `0..glyph_count`.
    ///
    /// Characters that fail to rasterize or upload are skipped; the
    /// rasterizer later advances past them. Characters the font lacks
    /// altogether are only logged at debug level.
    ///
    /// # Errors
    ///
    /// Returns [`GlyphError::Font`] if no glyph at all could be loaded.
    pub fn load<B, U>(backend: &mut B, uploader: &mut U, glyph_count: u32) -> GlyphResult<Self>
    where
        B: FontBackend + ?Sized,
        U: GlyphUploader + ?Sized,
    {
        let mut glyphs = BTreeMap::new();
        let mut skipped = 0usize;

        for character in (0..glyph_count).filter_map(char::from_u32) {
            let loaded = backend.rasterize(character).and_then(|bitmap| {
                let texture = uploader.upload_glyph(&bitmap)?;
                Ok(Self::descriptor(&bitmap, texture))
            });
            match loaded {
                Ok(glyph) => {
                    glyphs.insert(character, glyph);
                }
                Err(GlyphError::Missing(_)) => {
                    skipped += 1;
                    debug!(?character, "font has no glyph");
                }
                Err(err) => {
                    skipped += 1;
                    warn!(?character, %err, "skipping glyph");
                }
            }
        }

        if glyphs.is_empty() {
            return Err(GlyphError::Font(format!(
                "none of {glyph_count} glyphs could be loaded"
            )));
        }

        info!(
            loaded = glyphs.len(),
            skipped,
            pixel_size = backend.pixel_size(),
            "atlas font loaded"
        );
        Ok(Self {
            glyphs,
            pixel_size: backend.pixel_size(),
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn descriptor(bitmap: &RasterizedGlyph, texture: TextureHandle) -> Glyph {
        Glyph {
            code: bitmap.character,
            // 26.6 fixed point to whole pixels
            advance: (bitmap.advance >> 6) as f32,
            bearing: Point::new(bitmap.bearing_x as f32, bitmap.bearing_y as f32),
            kind: GlyphKind::Atlas {
                texture,
                size: bitmap.size,
            },
        }
    }

    /// Returns the rasterization size in pixels.
    #[must_use]
    pub const fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// Returns the number of loaded glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true if no glyph is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Iterates over the textures owned by this font.
    pub fn textures(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.glyphs.values().filter_map(|glyph| match glyph.kind {
            GlyphKind::Atlas { texture, .. } => Some(texture),
            GlyphKind::Bitmap { .. } => None,
        })
    }

    /// Drops the font and frees its textures through `uploader`.
    pub fn release<U>(self, uploader: &mut U)
    where
        U: GlyphUploader + ?Sized,
    {
        let mut released = 0usize;
        for texture in self.textures() {
            uploader.release_glyph(texture);
            released += 1;
        }
        debug!(released, "released atlas font");
    }
}

impl GlyphSource for AtlasFont {
    fn glyph(&self, c: char) -> Option<Glyph> {
        self.glyphs.get(&c).copied()
    }

    #[allow(clippy::cast_precision_loss)]
    fn fallback_advance(&self) -> f32 {
        self.glyphs
            .get(&' ')
            .map_or(self.pixel_size as f32 * 0.5, |space| space.advance)
    }

    #[allow(clippy::cast_precision_loss)]
    fn line_height(&self) -> f32 {
        self.pixel_size as f32
    }
}
