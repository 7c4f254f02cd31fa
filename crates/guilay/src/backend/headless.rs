//! In-memory backends.
//!
//! [`HeadlessPlatform`] keeps surfaces in a table and delivers events queued
//! through its [`PlatformHandle`]. [`RecordingRenderer`] records every frame
//! it is asked to draw so callers can inspect the output through its
//! [`RendererHandle`]. Handles share state with their backend, so they stay
//! usable after the backend has been moved into a `Guilay` context.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use guilay_core::{Color, Extent, Mat4};
use guilay_ui::{DrawBatch, GlyphError, GlyphResult, GlyphUploader, RasterizedGlyph, TextureHandle};
use parking_lot::Mutex;
use tracing::debug;

use super::{BackendError, BackendResult, PlatformEvent, RenderBackend, SurfaceId, WindowBackend};

#[derive(Debug)]
struct Surface {
    size: Extent,
    title: String,
    pending: Vec<PlatformEvent>,
    close: bool,
    presented: u64,
}

#[derive(Debug, Default)]
struct PlatformState {
    init_failure: Option<String>,
    initialized: bool,
    terminated: bool,
    next_surface: u32,
    surface_requests: usize,
    surfaces: BTreeMap<SurfaceId, Surface>,
}

impl PlatformState {
    fn surface_mut(&mut self, id: SurfaceId) -> BackendResult<&mut Surface> {
        self.surfaces
            .get_mut(&id)
            .ok_or(BackendError::UnknownSurface(id))
    }
}

/// A window backend with no display.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    state: Arc<Mutex<PlatformState>>,
}

impl HeadlessPlatform {
    /// Creates a platform that initialises successfully.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a platform whose [`init`](WindowBackend::init) fails with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        let platform = Self::default();
        platform.state.lock().init_failure = Some(reason.into());
        platform
    }

    /// Returns a handle sharing this platform's state.
    #[must_use]
    pub fn handle(&self) -> PlatformHandle {
        PlatformHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl WindowBackend for HeadlessPlatform {
    fn init(&mut self) -> BackendResult<()> {
        let mut state = self.state.lock();
        if let Some(reason) = state.init_failure.clone() {
            return Err(BackendError::Init(reason));
        }
        state.initialized = true;
        Ok(())
    }

    fn create_surface(&mut self, size: Extent, title: &str) -> BackendResult<SurfaceId> {
        let mut state = self.state.lock();
        state.surface_requests += 1;
        if !state.initialized || state.terminated {
            return Err(BackendError::Surface("platform is not running".to_string()));
        }

        let id = SurfaceId(state.next_surface);
        state.next_surface += 1;
        state.surfaces.insert(
            id,
            Surface {
                size,
                title: title.to_string(),
                pending: Vec::new(),
                close: false,
                presented: 0,
            },
        );
        Ok(id)
    }

    fn destroy_surface(&mut self, surface: SurfaceId) -> BackendResult<()> {
        self.state
            .lock()
            .surfaces
            .remove(&surface)
            .map(|_| ())
            .ok_or(BackendError::UnknownSurface(surface))
    }

    fn poll_events(&mut self, surface: SurfaceId) -> Vec<PlatformEvent> {
        let mut state = self.state.lock();
        let Ok(entry) = state.surface_mut(surface) else {
            return Vec::new();
        };

        let events = std::mem::take(&mut entry.pending);
        for event in &events {
            match *event {
                PlatformEvent::Resized(size) => entry.size = size,
                PlatformEvent::CloseRequested => entry.close = true,
                PlatformEvent::PointerPressed(_) => {}
            }
        }
        events
    }

    fn should_close(&self, surface: SurfaceId) -> bool {
        self.state
            .lock()
            .surfaces
            .get(&surface)
            .map_or(true, |entry| entry.close)
    }

    fn swap_buffers(&mut self, surface: SurfaceId) -> BackendResult<()> {
        self.state.lock().surface_mut(surface)?.presented += 1;
        Ok(())
    }

    fn terminate(&mut self) {
        let mut state = self.state.lock();
        state.surfaces.clear();
        state.terminated = true;
    }
}

/// Test-side view of a [`HeadlessPlatform`].
#[derive(Debug, Clone)]
pub struct PlatformHandle {
    state: Arc<Mutex<PlatformState>>,
}

impl PlatformHandle {
    /// Queues an event for the next poll. Returns false for an unknown surface.
    pub fn push_event(&self, surface: SurfaceId, event: PlatformEvent) -> bool {
        let mut state = self.state.lock();
        let Ok(entry) = state.surface_mut(surface) else {
            return false;
        };
        entry.pending.push(event);
        true
    }

    /// Returns true after a successful `init`.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    /// Returns true after `terminate`.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state.lock().terminated
    }

    /// Returns how many times a surface was requested, successful or not.
    #[must_use]
    pub fn surface_requests(&self) -> usize {
        self.state.lock().surface_requests
    }

    /// Returns the number of open surfaces.
    #[must_use]
    pub fn open_surfaces(&self) -> usize {
        self.state.lock().surfaces.len()
    }

    /// Returns a surface's title.
    #[must_use]
    pub fn title(&self, surface: SurfaceId) -> Option<String> {
        self.state
            .lock()
            .surfaces
            .get(&surface)
            .map(|entry| entry.title.clone())
    }

    /// Returns a surface's size as last reported to the toolkit.
    #[must_use]
    pub fn size(&self, surface: SurfaceId) -> Option<Extent> {
        self.state.lock().surfaces.get(&surface).map(|entry| entry.size)
    }

    /// Returns how many frames were presented on a surface.
    #[must_use]
    pub fn frames_presented(&self, surface: SurfaceId) -> u64 {
        self.state
            .lock()
            .surfaces
            .get(&surface)
            .map_or(0, |entry| entry.presented)
    }
}

/// One draw operation, in the order the renderer received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOp {
    /// `begin_frame`
    Begin,
    /// `clear`
    Clear,
    /// `set_transform`
    SetTransform,
    /// `draw`, with the batch's triangle count.
    Draw(usize),
}

/// Everything a renderer received for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Target surface.
    pub surface: SurfaceId,
    /// Viewport the frame was begun with.
    pub viewport: Extent,
    /// Last clear color, if any.
    pub clear: Option<Color>,
    /// Last bound transform, if any.
    pub transform: Option<Mat4>,
    /// Submitted batches in order.
    pub batches: Vec<DrawBatch>,
    /// Calls in order.
    pub ops: Vec<RenderOp>,
}

impl FrameRecord {
    /// Returns the total number of triangles drawn.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.batches.iter().map(DrawBatch::triangle_count).sum()
    }
}

/// Number of most recent frames a [`RecordingRenderer`] keeps.
pub const FRAME_HISTORY: usize = 64;

#[derive(Debug, Default)]
struct RendererState {
    frames: VecDeque<FrameRecord>,
    frames_begun: usize,
    uploads: usize,
    releases: usize,
    live: BTreeSet<TextureHandle>,
    next_texture: u32,
    reject_uploads: bool,
}

impl RendererState {
    fn current(&mut self) -> BackendResult<&mut FrameRecord> {
        self.frames
            .back_mut()
            .ok_or_else(|| BackendError::Draw("no frame in progress".to_string()))
    }
}

/// A render backend that records instead of drawing.
///
/// Only the last [`FRAME_HISTORY`] frames are retained.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    state: Arc<Mutex<RendererState>>,
}

impl RecordingRenderer {
    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle sharing this renderer's state.
    #[must_use]
    pub fn handle(&self) -> RendererHandle {
        RendererHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl GlyphUploader for RecordingRenderer {
    fn upload_glyph(&mut self, glyph: &RasterizedGlyph) -> GlyphResult<TextureHandle> {
        let mut state = self.state.lock();
        if state.reject_uploads {
            return Err(GlyphError::Upload(format!(
                "texture storage rejected {:?}",
                glyph.character
            )));
        }
        state.uploads += 1;
        state.next_texture += 1;
        let texture = TextureHandle(state.next_texture);
        state.live.insert(texture);
        Ok(texture)
    }

    fn release_glyph(&mut self, texture: TextureHandle) {
        let mut state = self.state.lock();
        if state.live.remove(&texture) {
            state.releases += 1;
        } else {
            debug!(?texture, "release of unknown texture ignored");
        }
    }
}

impl RenderBackend for RecordingRenderer {
    fn begin_frame(&mut self, surface: SurfaceId, viewport: Extent) -> BackendResult<()> {
        let mut state = self.state.lock();
        if state.frames.len() == FRAME_HISTORY {
            state.frames.pop_front();
        }
        state.frames.push_back(FrameRecord {
            surface,
            viewport,
            clear: None,
            transform: None,
            batches: Vec::new(),
            ops: vec![RenderOp::Begin],
        });
        state.frames_begun += 1;
        Ok(())
    }

    fn clear(&mut self, color: Color) {
        if let Ok(frame) = self.state.lock().current() {
            frame.clear = Some(color);
            frame.ops.push(RenderOp::Clear);
        }
    }

    fn set_transform(&mut self, projection: &Mat4) {
        if let Ok(frame) = self.state.lock().current() {
            frame.transform = Some(*projection);
            frame.ops.push(RenderOp::SetTransform);
        }
    }

    fn draw(&mut self, batch: &DrawBatch) -> BackendResult<()> {
        let mut state = self.state.lock();
        let frame = state.current()?;
        frame.ops.push(RenderOp::Draw(batch.triangle_count()));
        frame.batches.push(batch.clone());
        debug!(triangles = batch.triangle_count(), "recorded draw");
        Ok(())
    }
}

/// Test-side view of a [`RecordingRenderer`].
#[derive(Debug, Clone)]
pub struct RendererHandle {
    state: Arc<Mutex<RendererState>>,
}

impl RendererHandle {
    /// Returns the number of frames begun.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.state.lock().frames_begun
    }

    /// Returns the most recent frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<FrameRecord> {
        self.state.lock().frames.back().cloned()
    }

    /// Returns the retained frames, oldest first.
    #[must_use]
    pub fn frames(&self) -> Vec<FrameRecord> {
        self.state.lock().frames.iter().cloned().collect()
    }

    /// Returns the number of glyph bitmaps accepted.
    #[must_use]
    pub fn uploads(&self) -> usize {
        self.state.lock().uploads
    }

    /// Returns the number of glyph textures freed.
    #[must_use]
    pub fn releases(&self) -> usize {
        self.state.lock().releases
    }

    /// Returns the number of glyph textures still allocated.
    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.state.lock().live.len()
    }

    /// Makes later glyph uploads fail.
    pub fn reject_uploads(&self, reject: bool) {
        self.state.lock().reject_uploads = reject;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guilay_core::Point;

    #[test]
    fn test_failing_init() {
        let mut platform = HeadlessPlatform::failing("no display");
        assert_eq!(
            platform.init(),
            Err(BackendError::Init("no display".to_string()))
        );
        assert!(!platform.handle().is_initialized());
    }

    #[test]
    fn test_events_drain_once() {
        let mut platform = HeadlessPlatform::new();
        let handle = platform.handle();
        platform.init().unwrap();
        let surface = platform.create_surface(Extent::new(640, 480), "events").unwrap();

        assert!(handle.push_event(surface, PlatformEvent::PointerPressed(Point::new(1.0, 2.0))));
        assert!(handle.push_event(surface, PlatformEvent::Resized(Extent::new(320, 240))));
        assert!(handle.push_event(surface, PlatformEvent::CloseRequested));

        assert_eq!(platform.poll_events(surface).len(), 3);
        assert!(platform.poll_events(surface).is_empty());
        assert_eq!(handle.size(surface), Some(Extent::new(320, 240)));
        assert!(platform.should_close(surface));
    }

    #[test]
    fn test_surface_lifecycle() {
        let mut platform = HeadlessPlatform::new();
        let handle = platform.handle();

        assert!(platform.create_surface(Extent::new(10, 10), "early").is_err());
        platform.init().unwrap();
        let surface = platform.create_surface(Extent::new(10, 10), "main").unwrap();
        assert_eq!(handle.title(surface).as_deref(), Some("main"));

        platform.swap_buffers(surface).unwrap();
        assert_eq!(handle.frames_presented(surface), 1);

        platform.destroy_surface(surface).unwrap();
        assert_eq!(
            platform.swap_buffers(surface),
            Err(BackendError::UnknownSurface(surface))
        );
        assert_eq!(handle.surface_requests(), 2);
    }

    #[test]
    fn test_renderer_records_in_order() {
        let mut renderer = RecordingRenderer::new();
        let handle = renderer.handle();

        assert!(renderer.draw(&DrawBatch::default()).is_err());

        renderer.begin_frame(SurfaceId(0), Extent::new(8, 8)).unwrap();
        renderer.clear(Color::BLACK);
        renderer.set_transform(&Mat4::IDENTITY);
        renderer.draw(&DrawBatch::default()).unwrap();

        let frame = handle.last_frame().unwrap();
        assert_eq!(
            frame.ops,
            vec![RenderOp::Begin, RenderOp::Clear, RenderOp::SetTransform, RenderOp::Draw(0)]
        );
        assert_eq!(frame.clear, Some(Color::BLACK));
    }

    #[test]
    fn test_frame_history_is_bounded() {
        let mut renderer = RecordingRenderer::new();
        let handle = renderer.handle();

        for frame in 0..FRAME_HISTORY + 6 {
            let side = i32::try_from(frame).unwrap() + 1;
            renderer.begin_frame(SurfaceId(0), Extent::new(side, side)).unwrap();
        }

        assert_eq!(handle.frame_count(), FRAME_HISTORY + 6);
        let frames = handle.frames();
        assert_eq!(frames.len(), FRAME_HISTORY);
        assert_eq!(frames[0].viewport, Extent::new(7, 7));
        assert_eq!(handle.last_frame().unwrap().viewport, Extent::new(70, 70));
    }

    #[test]
    fn test_released_textures_are_not_live() {
        let mut renderer = RecordingRenderer::new();
        let handle = renderer.handle();
        let glyph = RasterizedGlyph {
            character: 'a',
            size: Extent::new(1, 1),
            bearing_x: 0,
            bearing_y: 1,
            advance: 1 << 6,
            coverage: vec![255],
        };

        let first = renderer.upload_glyph(&glyph).unwrap();
        let second = renderer.upload_glyph(&glyph).unwrap();
        assert_eq!(handle.live_textures(), 2);

        renderer.release_glyph(first);
        renderer.release_glyph(first);
        assert_eq!(handle.releases(), 1);
        assert_eq!(handle.live_textures(), 1);

        renderer.release_glyph(second);
        assert_eq!(handle.uploads(), 2);
        assert_eq!(handle.live_textures(), 0);
    }
}
