//! Windows: one element tree, one viewport, one surface.

use guilay_core::{Color, Extent, Mat4, Point, Rect};
use guilay_ui::{
    Element, ElementId, ElementTree, FlowLayout, FrameBuilder, GlyphSource, ParentRef, Placement,
    Quadtree,
};
use tracing::{debug, trace, warn};

use crate::backend::{PlatformEvent, RenderBackend, SurfaceId};
use crate::config::GuilayConfig;
use crate::error::{GuilayError, GuilayResult};

/// Per-frame statistics returned by `update_window`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Live elements in the window's tree.
    pub elements: usize,
    /// Elements placed this frame.
    pub placements: usize,
    /// Draw calls issued.
    pub batches: usize,
    /// Triangles submitted.
    pub triangles: usize,
    /// Platform events handled after presenting.
    pub events: usize,
    /// Buttons activated by those events.
    pub activated: usize,
}

/// A window and everything drawn in it.
///
/// Owns its element tree exclusively. The spatial index is derived from the
/// tree and rebuilt lazily after any mutation, resize or font change.
#[derive(Debug)]
pub struct Window {
    surface: SurfaceId,
    name: String,
    size: Extent,
    projection: Mat4,
    clear_color: Color,
    elements: ElementTree,
    layout: FlowLayout,
    max_depth: u32,
    placements: Vec<Placement>,
    index: Option<Quadtree>,
    indexed_font: u64,
    close_requested: bool,
    frame: FrameBuilder,
    frames_rendered: u64,
}

impl Window {
    pub(crate) fn new(surface: SurfaceId, name: &str, size: Extent, config: &GuilayConfig) -> Self {
        Self {
            surface,
            name: name.to_string(),
            size,
            projection: Mat4::for_viewport(size),
            clear_color: config.window.clear_color,
            elements: ElementTree::with_max_elements(config.elements.max_elements),
            layout: FlowLayout::new(config.window.margin, config.window.line_gap),
            max_depth: config.spatial.max_depth,
            placements: Vec::new(),
            index: None,
            indexed_font: 0,
            close_requested: false,
            frame: FrameBuilder::new(),
            frames_rendered: 0,
        }
    }

    /// Returns the backend surface.
    #[must_use]
    pub const fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Returns the window name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the viewport size.
    #[must_use]
    pub const fn size(&self) -> Extent {
        self.size
    }

    /// Returns the pixel-to-device transform for the current size.
    #[must_use]
    pub const fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Returns the frame clear color.
    #[must_use]
    pub const fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Sets the frame clear color.
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Returns the element tree.
    #[must_use]
    pub const fn elements(&self) -> &ElementTree {
        &self.elements
    }

    /// Returns the element tree for mutation. Invalidates the spatial index.
    pub fn elements_mut(&mut self) -> &mut ElementTree {
        self.invalidate();
        &mut self.elements
    }

    /// Creates an element and appends it to `parent`.
    ///
    /// # Errors
    ///
    /// [`GuilayError::Element`] if the tree is full or `parent` cannot take
    /// children. The tree is unchanged on failure.
    pub fn add_element(
        &mut self,
        parent: ParentRef,
        element: impl Into<Element>,
    ) -> GuilayResult<ElementId> {
        let id = self.elements.add_element(parent, element)?;
        self.invalidate();
        Ok(id)
    }

    /// Changes the viewport size and recomputes the projection.
    ///
    /// Elements are kept; only the derived index is dropped.
    ///
    /// # Errors
    ///
    /// [`GuilayError::InvalidDimensions`] unless both sides are positive.
    pub fn resize(&mut self, size: Extent) -> GuilayResult<()> {
        if !size.is_positive() {
            return Err(GuilayError::InvalidDimensions {
                width: size.width,
                height: size.height,
            });
        }
        if size != self.size {
            self.size = size;
            self.projection = Mat4::for_viewport(size);
            self.invalidate();
            debug!(window = %self.name, ?size, "window resized");
        }
        Ok(())
    }

    /// Returns true once the platform asked for this window to close.
    #[must_use]
    pub const fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Returns the number of frames drawn.
    #[must_use]
    pub const fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Returns the placements of the last layout pass.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Returns the spatial index if it is current.
    #[must_use]
    pub const fn spatial_index(&self) -> Option<&Quadtree> {
        self.index.as_ref()
    }

    fn invalidate(&mut self) {
        self.index = None;
    }

    fn viewport_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.size.to_size())
    }

    /// Re-runs placement and rebuilds the index if anything changed.
    fn refresh(&mut self, glyphs: &dyn GlyphSource, font_generation: u64) -> &Quadtree {
        let index = match self.index.take() {
            Some(index) if self.indexed_font == font_generation => index,
            _ => {
                self.placements = self.layout.place(&self.elements, self.size, glyphs);
                self.indexed_font = font_generation;
                self.build_index()
            }
        };
        self.index.insert(index)
    }

    fn build_index(&self) -> Quadtree {
        let viewport = self.viewport_rect();
        let mut index = Quadtree::new(viewport, self.max_depth);

        for placement in &self.placements {
            // Offscreen parts can never be hit
            let Some(visible) = placement.rect.intersection(&viewport) else {
                continue;
            };
            if let Err(err) = index.insert(placement.id, visible) {
                warn!(id = ?placement.id, %err, "element left out of spatial index");
            }
        }

        debug!(
            window = %self.name,
            indexed = index.len(),
            placed = self.placements.len(),
            "spatial index rebuilt"
        );
        index
    }

    pub(crate) fn element_at(
        &mut self,
        point: Point,
        glyphs: &dyn GlyphSource,
        font_generation: u64,
    ) -> Option<ElementId> {
        self.refresh(glyphs, font_generation).hit_test(point)
    }

    /// Runs the callback of the top-most button under `point`.
    pub(crate) fn activate_at(
        &mut self,
        point: Point,
        glyphs: &dyn GlyphSource,
        font_generation: u64,
    ) -> Option<ElementId> {
        let stack = self.refresh(glyphs, font_generation).elements_at(point);
        let button = stack
            .into_iter()
            .rev()
            .find(|&id| matches!(self.elements.get(id), Some(Element::Button(_))))?;

        self.elements.activate(button).then(|| {
            debug!(id = ?button, ?point, "button activated");
            button
        })
    }

    /// Draws one frame: begin, clear, bind projection, place, draw.
    pub(crate) fn render<R>(
        &mut self,
        renderer: &mut R,
        glyphs: &dyn GlyphSource,
        font_generation: u64,
    ) -> GuilayResult<FrameStats>
    where
        R: RenderBackend + ?Sized,
    {
        renderer.begin_frame(self.surface, self.size)?;
        renderer.clear(self.clear_color);
        renderer.set_transform(&self.projection);

        self.refresh(glyphs, font_generation);
        self.frame.begin_frame();
        self.frame
            .push_placements(&self.elements, &self.placements, glyphs);

        let batches = self.frame.end_frame();
        for batch in batches {
            renderer.draw(batch)?;
        }

        let stats = FrameStats {
            frame: self.frames_rendered,
            elements: self.elements.element_count(),
            placements: self.placements.len(),
            batches: batches.len(),
            triangles: self.frame.triangle_count(),
            events: 0,
            activated: 0,
        };
        self.frames_rendered += 1;
        Ok(stats)
    }

    /// Applies one platform event. Returns the activated button, if any.
    pub(crate) fn handle_event(
        &mut self,
        event: PlatformEvent,
        glyphs: &dyn GlyphSource,
        font_generation: u64,
    ) -> Option<ElementId> {
        trace!(window = %self.name, ?event, "platform event");
        match event {
            PlatformEvent::Resized(size) => {
                // Minimised windows report a zero size; keep the last good one
                if let Err(err) = self.resize(size) {
                    debug!(window = %self.name, %err, "ignoring resize");
                }
                None
            }
            PlatformEvent::CloseRequested => {
                self.close_requested = true;
                None
            }
            PlatformEvent::PointerPressed(point) => self.activate_at(point, glyphs, font_generation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guilay_ui::{BitmapFont, Button, Text};
    use std::cell::Cell;
    use std::rc::Rc;

    fn window() -> Window {
        Window::new(
            SurfaceId(0),
            "test",
            Extent::new(800, 600),
            &GuilayConfig::default(),
        )
    }

    #[test]
    fn test_resize_keeps_elements() {
        let mut window = window();
        let label = window
            .add_element(ParentRef::Root, Element::text("Hello", 1.0, Color::WHITE))
            .unwrap();

        window.resize(Extent::new(1024, 768)).unwrap();
        assert_eq!(window.projection(), &Mat4::for_viewport(Extent::new(1024, 768)));
        assert_eq!(window.elements().child_at(ParentRef::Root, 0), Some(label));

        let err = window.resize(Extent::new(0, 768)).unwrap_err();
        assert!(matches!(err, GuilayError::InvalidDimensions { width: 0, .. }));
        assert_eq!(window.size(), Extent::new(1024, 768));
    }

    #[test]
    fn test_index_rebuilt_after_mutation() {
        let mut window = window();
        let panel = window
            .add_element(
                ParentRef::Root,
                Element::section(Rect::new(0.0, 0.0, 100.0, 100.0), Color::WHITE),
            )
            .unwrap();
        assert_eq!(window.element_at(Point::new(50.0, 50.0), &BitmapFont, 0), Some(panel));
        assert!(window.spatial_index().is_some());

        let cover = window
            .add_element(
                ParentRef::Root,
                Element::section(Rect::new(25.0, 25.0, 50.0, 50.0), Color::BLACK),
            )
            .unwrap();
        assert!(window.spatial_index().is_none());
        assert_eq!(window.element_at(Point::new(50.0, 50.0), &BitmapFont, 0), Some(cover));
    }

    #[test]
    fn test_offscreen_elements_not_hit() {
        let mut window = window();
        window
            .add_element(
                ParentRef::Root,
                Element::section(Rect::new(900.0, 700.0, 50.0, 50.0), Color::WHITE),
            )
            .unwrap();
        let partly = window
            .add_element(
                ParentRef::Root,
                Element::section(Rect::new(780.0, 10.0, 100.0, 20.0), Color::WHITE),
            )
            .unwrap();

        assert_eq!(window.element_at(Point::new(790.0, 15.0), &BitmapFont, 0), Some(partly));
        assert_eq!(window.spatial_index().map(Quadtree::len), Some(1));
    }

    #[test]
    fn test_press_skips_non_buttons() {
        let mut window = window();
        let pressed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&pressed);

        let button = window
            .add_element(
                ParentRef::Root,
                Button::new(
                    Rect::new(10.0, 10.0, 200.0, 100.0),
                    Color::WHITE,
                    Text::new("Go", 1.0, Color::BLACK),
                )
                .on_activate(move || counter.set(counter.get() + 1)),
            )
            .unwrap();
        // Overlapping section added later sits on top but cannot be activated
        window
            .add_element(
                ParentRef::Root,
                Element::section(Rect::new(50.0, 50.0, 20.0, 20.0), Color::BLACK),
            )
            .unwrap();

        let hit = window.handle_event(
            PlatformEvent::PointerPressed(Point::new(60.0, 60.0)),
            &BitmapFont,
            0,
        );
        assert_eq!(hit, Some(button));
        assert_eq!(pressed.get(), 1);

        let miss = window.handle_event(
            PlatformEvent::PointerPressed(Point::new(500.0, 500.0)),
            &BitmapFont,
            0,
        );
        assert_eq!(miss, None);
        assert_eq!(pressed.get(), 1);
    }
}
