//! Integration tests for the context lifecycle and the frame loop, driven
//! through the headless backends.

use std::cell::Cell;
use std::rc::Rc;

use guilay::backend::{
    HeadlessPlatform, PlatformHandle, RecordingRenderer, RenderOp, RendererHandle,
};
use guilay::{
    BackendError, FontConfig, Guilay, GuilayConfig, GuilayError, PlatformEvent, Window,
};
use guilay_core::{Color, Extent, Mat4, Point, Rect};
use guilay_ui::{
    Button, Element, FontBackend, GlyphError, GlyphResult, ParentRef, RasterizedGlyph, Text,
};

type Gui = Guilay<HeadlessPlatform, RecordingRenderer>;

fn start(config: GuilayConfig) -> (Gui, PlatformHandle, RendererHandle) {
    let platform = HeadlessPlatform::new();
    let renderer = RecordingRenderer::new();
    let (input, output) = (platform.handle(), renderer.handle());
    let gui = Guilay::init(platform, renderer, config).unwrap();
    (gui, input, output)
}

/// "Hello" at the root, then a panel holding one button.
fn sample_scene(window: &mut Window, presses: &Rc<Cell<u32>>) {
    window
        .add_element(ParentRef::Root, Element::text("Hello", 2.0, Color::WHITE))
        .unwrap();
    let panel = window
        .add_element(
            ParentRef::Root,
            Element::section(Rect::new(100.0, 100.0, 300.0, 200.0), Color::rgb(40, 40, 48)),
        )
        .unwrap();
    let counter = Rc::clone(presses);
    window
        .add_element(
            ParentRef::Section(panel),
            Button::new(
                Rect::new(150.0, 150.0, 120.0, 40.0),
                Color::rgb(200, 60, 60),
                Text::new("Press", 1.0, Color::WHITE),
            )
            .on_activate(move || counter.set(counter.get() + 1)),
        )
        .unwrap();
}

#[test]
fn test_platform_failure_is_fatal() {
    let result = Guilay::init(
        HeadlessPlatform::failing("no display"),
        RecordingRenderer::new(),
        GuilayConfig::default(),
    );

    let err = result.unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        GuilayError::BackendInit(BackendError::Init(ref reason)) if reason == "no display"
    ));
}

#[test]
fn test_invalid_config_rejected_before_platform() {
    let platform = HeadlessPlatform::new();
    let input = platform.handle();
    let mut config = GuilayConfig::default();
    config.spatial.max_depth = 0;

    let err = Guilay::init(platform, RecordingRenderer::new(), config).unwrap_err();
    assert!(matches!(err, GuilayError::Config(_)));
    assert!(!err.is_fatal());
    assert!(!input.is_initialized());
}

#[test]
fn test_invalid_dimensions_make_no_backend_call() {
    let (mut gui, input, _) = start(GuilayConfig::default());

    for size in [Extent::new(0, 600), Extent::new(800, -1), Extent::new(0, 0)] {
        let err = gui.create_window(size, "bad").unwrap_err();
        assert!(matches!(err, GuilayError::InvalidDimensions { .. }));
    }
    assert_eq!(input.surface_requests(), 0);

    let window = gui.create_window(Extent::new(800, 600), "good").unwrap();
    assert_eq!(input.surface_requests(), 1);
    assert_eq!(input.title(window.surface()).as_deref(), Some("good"));
}

#[test]
fn test_frame_order_and_projection() {
    let mut config = GuilayConfig::default();
    config.window.clear_color = Color::rgb(16, 16, 20);
    let (mut gui, input, output) = start(config);
    let mut window = gui.create_window(Extent::new(800, 600), "frame").unwrap();
    sample_scene(&mut window, &Rc::new(Cell::new(0)));

    let stats = gui.update_window(&mut window).unwrap();
    assert_eq!(stats.frame, 0);
    assert_eq!(stats.elements, 3);
    assert_eq!(stats.placements, 3);

    let frame = output.last_frame().unwrap();
    assert_eq!(frame.viewport, Extent::new(800, 600));
    assert_eq!(frame.clear, Some(Color::rgb(16, 16, 20)));
    assert_eq!(frame.transform, Some(Mat4::for_viewport(Extent::new(800, 600))));
    assert_eq!(&frame.ops[..3], &[RenderOp::Begin, RenderOp::Clear, RenderOp::SetTransform]);
    assert!(frame.ops[3..].iter().all(|op| matches!(op, RenderOp::Draw(_))));
    assert_eq!(frame.triangle_count(), stats.triangles);
    assert_eq!(input.frames_presented(window.surface()), 1);
}

#[test]
fn test_empty_window_still_clears_and_presents() {
    let (mut gui, input, output) = start(GuilayConfig::default());
    let mut window = gui.create_window(Extent::new(320, 240), "empty").unwrap();

    let stats = gui.update_window(&mut window).unwrap();
    assert_eq!(stats.triangles, 0);
    assert_eq!(stats.batches, 0);
    assert_eq!(
        output.last_frame().unwrap().ops,
        vec![RenderOp::Begin, RenderOp::Clear, RenderOp::SetTransform]
    );
    assert_eq!(input.frames_presented(window.surface()), 1);
}

#[test]
fn test_resize_event_keeps_elements() {
    let (mut gui, input, output) = start(GuilayConfig::default());
    let mut window = gui.create_window(Extent::new(800, 600), "resize").unwrap();
    sample_scene(&mut window, &Rc::new(Cell::new(0)));
    let before: Vec<_> = window.elements().children(ParentRef::Root).collect();

    input.push_event(window.surface(), PlatformEvent::Resized(Extent::new(1024, 768)));
    gui.update_window(&mut window).unwrap();
    assert_eq!(window.size(), Extent::new(1024, 768));

    // A minimised window reports zero; the last good size is kept
    input.push_event(window.surface(), PlatformEvent::Resized(Extent::new(0, 0)));
    let stats = gui.update_window(&mut window).unwrap();
    assert_eq!(window.size(), Extent::new(1024, 768));
    assert_eq!(stats.elements, 3);

    let frame = output.last_frame().unwrap();
    assert_eq!(frame.viewport, Extent::new(1024, 768));
    assert_eq!(frame.transform, Some(Mat4::for_viewport(Extent::new(1024, 768))));
    let after: Vec<_> = window.elements().children(ParentRef::Root).collect();
    assert_eq!(before, after);
}

#[test]
fn test_pointer_press_activates_button() {
    let (mut gui, input, _) = start(GuilayConfig::default());
    let mut window = gui.create_window(Extent::new(800, 600), "press").unwrap();
    let presses = Rc::new(Cell::new(0));
    sample_scene(&mut window, &presses);

    // On the button, then on the bare panel, then on nothing
    for point in [Point::new(200.0, 170.0), Point::new(350.0, 250.0), Point::new(700.0, 500.0)] {
        input.push_event(window.surface(), PlatformEvent::PointerPressed(point));
    }
    let stats = gui.update_window(&mut window).unwrap();

    assert_eq!(stats.events, 3);
    assert_eq!(stats.activated, 1);
    assert_eq!(presses.get(), 1);
}

#[test]
fn test_element_at_tracks_mutation() {
    let (mut gui, _, _) = start(GuilayConfig::default());
    let mut window = gui.create_window(Extent::new(800, 600), "hit").unwrap();
    sample_scene(&mut window, &Rc::new(Cell::new(0)));

    let panel = window.elements().child_at(ParentRef::Root, 1).unwrap();
    let button = window.elements().child_at(ParentRef::Section(panel), 0).unwrap();
    assert_eq!(gui.element_at(&mut window, Point::new(200.0, 170.0)), Some(button));

    // Removing the button must not leave a stale hit behind
    assert!(window.elements_mut().remove(ParentRef::Section(panel), 0).unwrap());
    assert_eq!(gui.element_at(&mut window, Point::new(200.0, 170.0)), Some(panel));
    assert!(!window.elements().contains(button));
}

#[test]
fn test_close_request() {
    let (mut gui, input, _) = start(GuilayConfig::default());
    let mut window = gui.create_window(Extent::new(800, 600), "close").unwrap();

    gui.update_window(&mut window).unwrap();
    assert!(!gui.should_close(&window));

    input.push_event(window.surface(), PlatformEvent::CloseRequested);
    gui.update_window(&mut window).unwrap();
    assert!(gui.should_close(&window));
    assert!(window.close_requested());

    let surface = window.surface();
    gui.close_window(window).unwrap();
    assert_eq!(input.open_surfaces(), 0);
    assert_eq!(input.frames_presented(surface), 0);

    gui.shutdown();
    assert!(input.is_terminated());
}

#[test]
fn test_missing_atlas_falls_back_to_bitmap() {
    let config = GuilayConfig {
        font: FontConfig::Atlas {
            path: "/nonexistent/font.ttf".into(),
            pixel_size: 32,
            glyph_count: 128,
        },
        ..GuilayConfig::default()
    };
    let (gui, _, output) = start(config);

    assert_eq!(gui.font().kind(), "bitmap");
    assert_eq!(output.uploads(), 0);
}

/// Square 6x8 glyphs for printable ASCII, nothing else.
struct BlockFont;

impl FontBackend for BlockFont {
    fn pixel_size(&self) -> u32 {
        8
    }

    fn rasterize(&mut self, c: char) -> GlyphResult<RasterizedGlyph> {
        if !c.is_ascii_graphic() && c != ' ' {
            return Err(GlyphError::Missing(c));
        }
        let size = if c == ' ' { Extent::new(0, 0) } else { Extent::new(6, 8) };
        Ok(RasterizedGlyph {
            character: c,
            size,
            bearing_x: 0,
            bearing_y: 8,
            advance: 7 << 6,
            coverage: vec![255; 48],
        })
    }
}

#[test]
fn test_loaded_atlas_draws_textured_text() {
    let (mut gui, _, output) = start(GuilayConfig::default());
    let mut window = gui.create_window(Extent::new(800, 600), "atlas").unwrap();
    window
        .add_element(ParentRef::Root, Element::text("Hi", 1.0, Color::WHITE))
        .unwrap();

    let bitmap = gui.update_window(&mut window).unwrap();
    gui.load_font(&mut BlockFont, 128).unwrap();
    assert_eq!(gui.font().kind(), "atlas");
    assert_eq!(output.uploads(), 95);

    // One quad per glyph instead of one per lit cell
    let atlas = gui.update_window(&mut window).unwrap();
    assert_eq!(atlas.triangles, 4);
    assert!(bitmap.triangles > atlas.triangles);

    let frame = output.last_frame().unwrap();
    assert_eq!(frame.batches.len(), 2);
    assert!(frame.batches.iter().all(|batch| batch.texture.is_some()));
}

#[test]
fn test_failed_font_load_keeps_previous_font() {
    let (mut gui, _, output) = start(GuilayConfig::default());
    output.reject_uploads(true);

    let err = gui.load_font(&mut BlockFont, 128).unwrap_err();
    assert!(matches!(err, GuilayError::Glyph(GlyphError::Font(_))));
    assert_eq!(gui.font().kind(), "bitmap");
}

#[test]
fn test_replaced_atlas_releases_its_textures() {
    let (mut gui, input, output) = start(GuilayConfig::default());

    gui.load_font(&mut BlockFont, 128).unwrap();
    gui.load_font(&mut BlockFont, 128).unwrap();
    assert_eq!(output.uploads(), 190);
    assert_eq!(output.releases(), 95);
    assert_eq!(output.live_textures(), 95);

    gui.use_bitmap_font();
    assert_eq!(output.releases(), 190);
    assert_eq!(output.live_textures(), 0);

    gui.load_font(&mut BlockFont, 128).unwrap();
    gui.shutdown();
    assert_eq!(output.live_textures(), 0);
    assert!(input.is_terminated());
}
