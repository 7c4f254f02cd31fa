//! Frame geometry.
//!
//! Turns placed elements into vertex batches for backend submission. A new
//! batch starts whenever the bound texture changes.

use guilay_core::{Color, Point, Rect};

use crate::element::{Element, ElementTree};
use crate::layout::Placement;
use crate::text::{rasterize, GlyphSource, TextureHandle, Triangle};

/// Vertex for UI rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UiVertex {
    /// Position (x, y) in window pixels.
    pub position: [f32; 2],
    /// UV coordinates.
    pub uv: [f32; 2],
    /// Color (RGBA).
    pub color: [f32; 4],
}

impl UiVertex {
    /// Creates a new vertex.
    #[must_use]
    pub const fn new(x: f32, y: f32, u: f32, v: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
            color,
        }
    }
}

/// A triangle list drawn with one texture binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawBatch {
    /// Texture to sample, or None for solid fill.
    pub texture: Option<TextureHandle>,
    /// Triangle list, three vertices per triangle.
    pub vertices: Vec<UiVertex>,
}

impl DrawBatch {
    /// Returns the number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Collects triangles for one frame.
#[derive(Debug, Default)]
pub struct FrameBuilder {
    batches: Vec<DrawBatch>,
}

impl FrameBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            batches: Vec::with_capacity(16),
        }
    }

    /// Begins a new frame.
    pub fn begin_frame(&mut self) {
        self.batches.clear();
    }

    /// Adds one triangle, extending the last batch when the texture matches.
    pub fn push_triangle(&mut self, triangle: Triangle) {
        match self.batches.last_mut() {
            Some(batch) if batch.texture == triangle.texture => {
                batch.vertices.extend_from_slice(&triangle.vertices);
            }
            _ => self.batches.push(DrawBatch {
                texture: triangle.texture,
                vertices: triangle.vertices.to_vec(),
            }),
        }
    }

    /// Adds a solid rectangle as two triangles.
    pub fn push_rect(&mut self, rect: Rect, color: Color) {
        let color = color.to_array();
        let (x0, y0, x1, y1) = (rect.x, rect.y, rect.right(), rect.top());
        let v = |x, y| UiVertex::new(x, y, 0.0, 0.0, color);

        self.push_triangle(Triangle {
            vertices: [v(x0, y0), v(x0, y1), v(x1, y1)],
            texture: None,
        });
        self.push_triangle(Triangle {
            vertices: [v(x0, y0), v(x1, y1), v(x1, y0)],
            texture: None,
        });
    }

    /// Adds a text run. Returns the pen position after the run.
    pub fn push_text<S>(
        &mut self,
        text: &str,
        origin: Point,
        scale: f32,
        color: Color,
        glyphs: &S,
    ) -> Point
    where
        S: GlyphSource + ?Sized,
    {
        let mut run = rasterize(text, origin, scale, color, glyphs);
        for triangle in run.by_ref() {
            self.push_triangle(triangle);
        }
        run.pen()
    }

    /// Adds every placed element in placement order.
    pub fn push_placements<S>(&mut self, tree: &ElementTree, placements: &[Placement], glyphs: &S)
    where
        S: GlyphSource + ?Sized,
    {
        for placement in placements {
            match tree.get(placement.id) {
                Some(Element::Text(text)) => {
                    if let Some(origin) = placement.text_origin {
                        self.push_text(&text.content, origin, text.scale(), text.color, glyphs);
                    }
                }
                Some(Element::Section(section)) => self.push_rect(placement.rect, section.color),
                Some(Element::Button(button)) => {
                    self.push_rect(placement.rect, button.color);
                    if let Some(origin) = placement.text_origin {
                        let label = &button.label;
                        self.push_text(&label.content, origin, label.scale(), label.color, glyphs);
                    }
                }
                None => {}
            }
        }
    }

    /// Ends the frame and returns the batches in draw order.
    #[must_use]
    pub fn end_frame(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// Returns the number of triangles collected this frame.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.batches.iter().map(DrawBatch::triangle_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(texture: Option<TextureHandle>) -> Triangle {
        Triangle {
            vertices: [UiVertex::default(); 3],
            texture,
        }
    }

    #[test]
    fn test_rect_is_two_triangles() {
        let mut builder = FrameBuilder::new();
        builder.begin_frame();
        builder.push_rect(Rect::new(0.0, 0.0, 100.0, 50.0), Color::WHITE);

        let batches = builder.end_frame();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].triangle_count(), 2);
        assert_eq!(batches[0].vertices[1].position, [0.0, 50.0]);
        assert_eq!(batches[0].vertices[5].position, [100.0, 0.0]);
    }

    #[test]
    fn test_batches_split_on_texture_change() {
        let mut builder = FrameBuilder::new();
        builder.push_triangle(textured(None));
        builder.push_triangle(textured(None));
        builder.push_triangle(textured(Some(TextureHandle(1))));
        builder.push_triangle(textured(Some(TextureHandle(2))));
        builder.push_triangle(textured(None));

        let textures: Vec<_> = builder.end_frame().iter().map(|b| b.texture).collect();
        assert_eq!(
            textures,
            vec![None, Some(TextureHandle(1)), Some(TextureHandle(2)), None]
        );
        assert_eq!(builder.triangle_count(), 5);

        builder.begin_frame();
        assert!(builder.end_frame().is_empty());
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<UiVertex>(), 32);
        let vertex = UiVertex::new(1.0, 2.0, 0.5, 0.25, [1.0; 4]);
        assert_eq!(bytemuck::bytes_of(&vertex).len(), 32);
    }
}
