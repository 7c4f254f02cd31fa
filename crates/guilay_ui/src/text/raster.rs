//! Text to triangles.
//!
//! Single line, left to right, fixed advance. Output is lazy: nothing is
//! allocated per glyph.

use std::str::Chars;

use guilay_core::{Color, Extent, Point};
use tracing::trace;

use super::glyph::{Glyph, GlyphKind, GlyphSource, TextureHandle};
use crate::render::UiVertex;

/// One output triangle in window pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Corners, counter-clockwise.
    pub vertices: [UiVertex; 3],
    /// Texture to sample, or None for solid fill.
    pub texture: Option<TextureHandle>,
}

/// Lazily rasterizes `text` starting at pen position `origin`.
///
/// `origin.y` is the baseline for atlas glyphs and the bottom edge of the
/// cell for bitmap glyphs. Characters the source lacks are skipped and
/// the pen moves on by the source's fallback advance.
pub fn rasterize<'a, S>(
    text: &'a str,
    origin: Point,
    scale: f32,
    color: Color,
    source: &'a S,
) -> Rasterize<'a, S>
where
    S: GlyphSource + ?Sized,
{
    Rasterize {
        chars: text.chars(),
        source,
        pen: origin,
        scale,
        color: color.to_array(),
        current: None,
        pending: None,
    }
}

#[derive(Debug, Clone, Copy)]
struct GlyphCursor {
    glyph: Glyph,
    origin: Point,
    /// Next cell to examine (bitmap) or 0/1 for emitted-or-not (atlas).
    cell: usize,
}

/// Iterator returned by [`rasterize`].
pub struct Rasterize<'a, S: ?Sized> {
    chars: Chars<'a>,
    source: &'a S,
    pen: Point,
    scale: f32,
    color: [f32; 4],
    current: Option<GlyphCursor>,
    /// Second half of the quad whose first half was just returned.
    pending: Option<Triangle>,
}

impl<S: GlyphSource + ?Sized> Rasterize<'_, S> {
    /// Returns the pen position. After the iterator is exhausted this is
    /// where a following run would start.
    #[must_use]
    pub fn pen(&self) -> Point {
        self.pen
    }

    /// Drains the iterator and returns the final pen position.
    #[must_use]
    pub fn finish(mut self) -> Point {
        for _ in self.by_ref() {}
        self.pen
    }

    fn next_quad(&mut self) -> Option<[Triangle; 2]> {
        loop {
            let Some(cursor) = self.current.as_mut() else {
                let c = self.chars.next()?;
                match self.source.glyph(c) {
                    Some(glyph) => {
                        self.current = Some(GlyphCursor {
                            glyph,
                            origin: self.pen,
                            cell: 0,
                        });
                    }
                    None => {
                        trace!(character = ?c, "no glyph, advancing");
                        self.pen.x += self.source.fallback_advance() * self.scale;
                    }
                }
                continue;
            };

            let quad = match cursor.glyph.kind {
                GlyphKind::Bitmap { rows, width } => {
                    bitmap_quad(cursor, rows.len(), usize::from(width), self.scale, self.color)
                }
                GlyphKind::Atlas { texture, size } => {
                    atlas_quad(cursor, texture, size, self.scale, self.color)
                }
            };
            if quad.is_some() {
                return quad;
            }

            self.pen.x += cursor.glyph.advance * self.scale;
            self.current = None;
        }
    }
}

impl<S: GlyphSource + ?Sized> Iterator for Rasterize<'_, S> {
    type Item = Triangle;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(second) = self.pending.take() {
            return Some(second);
        }
        let [first, second] = self.next_quad()?;
        self.pending = Some(second);
        Some(first)
    }
}

/// Emits the quad for the next set cell, or None once the glyph is done.
#[allow(clippy::cast_precision_loss)]
fn bitmap_quad(
    cursor: &mut GlyphCursor,
    height: usize,
    width: usize,
    scale: f32,
    color: [f32; 4],
) -> Option<[Triangle; 2]> {
    while cursor.cell < height * width {
        let (row, col) = (cursor.cell / width, cursor.cell % width);
        cursor.cell += 1;
        if !cursor.glyph.covers(row, col) {
            continue;
        }

        // Row 0 is the top of the glyph while y grows upward
        let x0 = cursor.origin.x + col as f32 * scale;
        let y0 = cursor.origin.y + (height - 1 - row) as f32 * scale;
        let (x1, y1) = (x0 + scale, y0 + scale);

        let v = |x, y| UiVertex::new(x, y, 0.0, 0.0, color);
        return Some([
            Triangle {
                vertices: [v(x0, y0), v(x0, y1), v(x1, y1)],
                texture: None,
            },
            Triangle {
                vertices: [v(x0, y0), v(x1, y1), v(x1, y0)],
                texture: None,
            },
        ]);
    }
    None
}

/// Emits the single textured quad of an atlas glyph.
#[allow(clippy::cast_precision_loss)]
fn atlas_quad(
    cursor: &mut GlyphCursor,
    texture: TextureHandle,
    size: Extent,
    scale: f32,
    color: [f32; 4],
) -> Option<[Triangle; 2]> {
    if cursor.cell > 0 || !size.is_positive() {
        return None;
    }
    cursor.cell = 1;

    let bearing = cursor.glyph.bearing;
    let xpos = cursor.origin.x + bearing.x * scale;
    let ypos = cursor.origin.y - (size.height as f32 - bearing.y) * scale;
    let w = size.width as f32 * scale;
    let h = size.height as f32 * scale;

    let v = |x, y, u, t| UiVertex::new(x, y, u, t, color);
    let texture = Some(texture);
    Some([
        Triangle {
            vertices: [
                v(xpos, ypos + h, 0.0, 0.0),
                v(xpos, ypos, 0.0, 1.0),
                v(xpos + w, ypos, 1.0, 1.0),
            ],
            texture,
        },
        Triangle {
            vertices: [
                v(xpos, ypos + h, 0.0, 0.0),
                v(xpos + w, ypos, 1.0, 1.0),
                v(xpos + w, ypos + h, 1.0, 0.0),
            ],
            texture,
        },
    ])
}
