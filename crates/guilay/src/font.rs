//! Font backend built on `ab_glyph`.

use std::path::Path;

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use guilay_core::Extent;
use guilay_ui::{FontBackend, GlyphError, GlyphResult, RasterizedGlyph};

/// Rasterizes glyphs from a TrueType/OpenType face at a fixed pixel size.
#[derive(Clone)]
pub struct AbGlyphBackend {
    font: FontArc,
    pixel_size: u32,
}

impl std::fmt::Debug for AbGlyphBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbGlyphBackend")
            .field("glyphs", &self.font.glyph_count())
            .field("pixel_size", &self.pixel_size)
            .finish()
    }
}

impl AbGlyphBackend {
    /// Loads a face from a file.
    ///
    /// # Errors
    ///
    /// [`GlyphError::Io`] if the file cannot be read, [`GlyphError::Font`]
    /// if it is not a usable face.
    pub fn from_file(path: impl AsRef<Path>, pixel_size: u32) -> GlyphResult<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data, pixel_size)
    }

    /// Loads a face from memory.
    ///
    /// # Errors
    ///
    /// [`GlyphError::Font`] if the data is not a usable face.
    pub fn from_bytes(data: Vec<u8>, pixel_size: u32) -> GlyphResult<Self> {
        let font = FontArc::try_from_vec(data).map_err(|err| GlyphError::Font(err.to_string()))?;
        Ok(Self { font, pixel_size })
    }

    #[allow(clippy::cast_precision_loss)]
    fn scale(&self) -> PxScale {
        PxScale::from(self.pixel_size as f32)
    }
}

impl FontBackend for AbGlyphBackend {
    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss
    )]
    fn rasterize(&mut self, c: char) -> GlyphResult<RasterizedGlyph> {
        let id = self.font.glyph_id(c);
        if id == GlyphId(0) {
            return Err(GlyphError::Missing(c));
        }

        let scaled = self.font.as_scaled(self.scale());
        // 26.6 fixed point
        let advance = (scaled.h_advance(id) * 64.0).round() as i32;

        let positioned = id.with_scale_and_position(self.scale(), point(0.0, 0.0));
        let Some(outline) = self.font.outline_glyph(positioned) else {
            // Whitespace: metrics only
            return Ok(RasterizedGlyph {
                character: c,
                size: Extent::new(0, 0),
                bearing_x: 0,
                bearing_y: 0,
                advance,
                coverage: Vec::new(),
            });
        };

        // Pixel bounds are y-down with the baseline at 0
        let bounds = outline.px_bounds();
        let width = bounds.width() as u32;
        let height = bounds.height() as u32;
        let mut coverage = vec![0u8; width as usize * height as usize];
        outline.draw(|x, y, value| {
            if let Some(cell) = coverage.get_mut(y as usize * width as usize + x as usize) {
                *cell = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        });

        Ok(RasterizedGlyph {
            character: c,
            size: Extent::new(width as i32, height as i32),
            bearing_x: bounds.min.x as i32,
            bearing_y: -bounds.min.y as i32,
            advance,
            coverage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        let err = AbGlyphBackend::from_bytes(b"not a font".to_vec(), 32).unwrap_err();
        assert!(matches!(err, GlyphError::Font(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = AbGlyphBackend::from_file("/nonexistent/face.ttf", 32).unwrap_err();
        assert!(matches!(err, GlyphError::Io(_)));
    }
}
