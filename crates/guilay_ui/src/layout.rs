//! Flow placement.
//!
//! Not a layout engine. Sections and buttons sit at their explicit bounds;
//! text runs stack downward from the top of their container in the order
//! they were added.

use guilay_core::{Extent, Point, Rect};

use crate::element::{Element, ElementId, ElementTree, ParentRef};
use crate::text::GlyphSource;

/// Where an element ended up this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// The placed element.
    pub id: ElementId,
    /// Window-space box: explicit bounds, or the line box of a text run.
    pub rect: Rect,
    /// Pen origin for the element's text (text runs and button labels).
    pub text_origin: Option<Point>,
    /// Nesting depth, root children are 0.
    pub depth: usize,
}

/// Stacks text runs top-down inside their container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowLayout {
    /// Inset from the container edges, in pixels.
    pub margin: f32,
    /// Vertical gap between consecutive text runs, in pixels.
    pub line_gap: f32,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self {
            margin: 4.0,
            line_gap: 2.0,
        }
    }
}

impl FlowLayout {
    /// Creates a layout with the given margin and line gap.
    #[must_use]
    pub const fn new(margin: f32, line_gap: f32) -> Self {
        Self { margin, line_gap }
    }

    /// Places every attached element in depth-first child order.
    ///
    /// A section's placement precedes its children's, so drawing the result
    /// in order paints containers underneath their contents.
    #[must_use]
    pub fn place<S>(&self, tree: &ElementTree, viewport: Extent, glyphs: &S) -> Vec<Placement>
    where
        S: GlyphSource + ?Sized,
    {
        let mut placements = Vec::with_capacity(tree.element_count());
        let root = Rect::from_origin_size(Point::ZERO, viewport.to_size());
        self.place_children(tree, ParentRef::Root, root, 0, glyphs, &mut placements);
        placements
    }

    fn place_children<S>(
        &self,
        tree: &ElementTree,
        parent: ParentRef,
        container: Rect,
        depth: usize,
        glyphs: &S,
        out: &mut Vec<Placement>,
    ) where
        S: GlyphSource + ?Sized,
    {
        let inner = container.inset(self.margin);
        let mut cursor = inner.top();

        for id in tree.children(parent) {
            let Some(element) = tree.get(id) else {
                continue;
            };
            match element {
                Element::Text(text) => {
                    let height = glyphs.line_height() * text.scale();
                    let width = glyphs.measure(&text.content, text.scale());
                    let rect = Rect::new(inner.x, cursor - height, width, height);
                    cursor = rect.y - self.line_gap;
                    out.push(Placement {
                        id,
                        rect,
                        text_origin: Some(rect.origin()),
                        depth,
                    });
                }
                Element::Section(section) => {
                    let bounds = section.bounds.normalized();
                    out.push(Placement {
                        id,
                        rect: bounds,
                        text_origin: None,
                        depth,
                    });
                    self.place_children(
                        tree,
                        ParentRef::Section(id),
                        bounds,
                        depth + 1,
                        glyphs,
                        out,
                    );
                }
                Element::Button(button) => {
                    let label = &button.label;
                    let bounds = button.bounds.normalized();
                    let width = glyphs.measure(&label.content, label.scale());
                    let height = glyphs.line_height() * label.scale();
                    let center = bounds.center();
                    out.push(Placement {
                        id,
                        rect: bounds,
                        text_origin: Some(Point::new(center.x - width * 0.5, center.y - height * 0.5)),
                        depth,
                    });
                }
            }
        }
    }
}
