//! Interfaces to the external collaborators.
//!
//! The toolkit never opens a window or talks to a GPU itself. A host wires
//! in a [`WindowBackend`] for surfaces and input and a [`RenderBackend`] for
//! draw submission and glyph textures. [`headless`] provides an in-memory
//! pair for tests and tooling.

pub mod headless;

use guilay_core::{Color, Extent, Mat4, Point};
use guilay_ui::{DrawBatch, GlyphUploader};
use thiserror::Error;

pub use headless::{
    FrameRecord, HeadlessPlatform, PlatformHandle, RecordingRenderer, RenderOp, RendererHandle,
    FRAME_HISTORY,
};

/// Identifies one backend surface (a native window plus its context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

/// Input and window events delivered by [`WindowBackend::poll_events`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformEvent {
    /// The surface changed size.
    Resized(Extent),
    /// The user asked to close the surface.
    CloseRequested,
    /// The primary pointer button went down at a window-space position
    /// (y-up, origin bottom-left).
    PointerPressed(Point),
}

/// Errors reported by backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Context creation failed.
    #[error("context creation failed: {0}")]
    Init(String),

    /// The surface id is not (or no longer) known to the backend.
    #[error("unknown surface {0:?}")]
    UnknownSurface(SurfaceId),

    /// A surface could not be created.
    #[error("surface creation failed: {0}")]
    Surface(String),

    /// Presenting a frame failed.
    #[error("present failed: {0}")]
    Present(String),

    /// A draw call was rejected.
    #[error("draw failed: {0}")]
    Draw(String),
}

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Windowing and input.
pub trait WindowBackend {
    /// Brings up the platform layer. Called once before anything else.
    ///
    /// # Errors
    ///
    /// [`BackendError::Init`] if the platform is unavailable.
    fn init(&mut self) -> BackendResult<()>;

    /// Opens a surface of the given size.
    ///
    /// # Errors
    ///
    /// [`BackendError::Surface`] if the surface cannot be created.
    fn create_surface(&mut self, size: Extent, title: &str) -> BackendResult<SurfaceId>;

    /// Closes a surface.
    ///
    /// # Errors
    ///
    /// [`BackendError::UnknownSurface`] for an id that is not open.
    fn destroy_surface(&mut self, surface: SurfaceId) -> BackendResult<()>;

    /// Drains the events that arrived since the last call.
    fn poll_events(&mut self, surface: SurfaceId) -> Vec<PlatformEvent>;

    /// Returns true once the platform wants the surface closed.
    fn should_close(&self, surface: SurfaceId) -> bool;

    /// Presents the frame drawn since the last swap. May block.
    ///
    /// # Errors
    ///
    /// [`BackendError::Present`] if the swap fails.
    fn swap_buffers(&mut self, surface: SurfaceId) -> BackendResult<()>;

    /// Tears the platform layer down.
    fn terminate(&mut self);
}

/// Draw submission. Also stores glyph bitmaps for atlas fonts.
pub trait RenderBackend: GlyphUploader {
    /// Starts a frame on a surface.
    ///
    /// # Errors
    ///
    /// [`BackendError::UnknownSurface`] if the surface is not bound.
    fn begin_frame(&mut self, surface: SurfaceId, viewport: Extent) -> BackendResult<()>;

    /// Fills the whole viewport.
    fn clear(&mut self, color: Color);

    /// Binds the pixel-to-device transform for subsequent draws.
    fn set_transform(&mut self, projection: &Mat4);

    /// Issues one triangle-list draw.
    ///
    /// # Errors
    ///
    /// [`BackendError::Draw`] if the batch cannot be submitted.
    fn draw(&mut self, batch: &DrawBatch) -> BackendResult<()>;
}
