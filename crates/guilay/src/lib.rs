//! # Guilay
//!
//! A minimal retained-mode GUI toolkit. The host builds a tree of text,
//! sections and buttons per window; every `update_window` call turns that
//! tree into triangles, hands them to the render backend, presents, and
//! feeds input back into the tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                              GUILAY                               │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │   ┌──────────────┐     ┌──────────────┐     ┌──────────────┐     │
//! │   │ guilay_core  │────>│  guilay_ui   │────>│    guilay    │     │
//! │   │              │     │              │     │              │     │
//! │   │ • Geometry   │     │ • Elements   │     │ • Context    │     │
//! │   │ • Projection │     │ • Quadtree   │     │ • Windows    │     │
//! │   │ • SlotList   │     │ • Glyphs     │     │ • Config     │     │
//! │   └──────────────┘     │ • Batching   │     │ • Backends   │     │
//! │                        └──────────────┘     └──────┬───────┘     │
//! │                                                    │             │
//! │                          WindowBackend / RenderBackend           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use guilay::backend::{HeadlessPlatform, RecordingRenderer};
//! use guilay::{Guilay, GuilayConfig};
//! use guilay_core::{Color, Extent};
//! use guilay_ui::{Element, ParentRef};
//!
//! let mut gui = Guilay::init(
//!     HeadlessPlatform::new(),
//!     RecordingRenderer::new(),
//!     GuilayConfig::default(),
//! )?;
//! let mut window = gui.create_window(Extent::new(800, 600), "Example")?;
//! window.add_element(ParentRef::Root, Element::text("Hello", 2.0, Color::WHITE))?;
//!
//! let stats = gui.update_window(&mut window)?;
//! assert!(stats.triangles > 0);
//! # Ok::<(), guilay::GuilayError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod config;
pub mod error;
pub mod font;
pub mod window;

use guilay_core::{Extent, Point};
use guilay_ui::{AtlasFont, BitmapFont, ElementId, FontBackend, Glyph, GlyphSource};
use tracing::{info, trace, warn};

pub use backend::{BackendError, PlatformEvent, RenderBackend, SurfaceId, WindowBackend};
pub use config::{ConfigError, FontConfig, GuilayConfig};
pub use error::{GuilayError, GuilayResult};
pub use font::AbGlyphBackend;
pub use window::{FrameStats, Window};

/// The glyph source text is currently drawn with.
#[derive(Debug, Clone)]
pub enum ActiveFont {
    /// The built-in 5x7 font.
    Bitmap(BitmapFont),
    /// A loaded atlas font.
    Atlas(AtlasFont),
}

impl ActiveFont {
    /// Returns `"bitmap"` or `"atlas"`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bitmap(_) => "bitmap",
            Self::Atlas(_) => "atlas",
        }
    }
}

impl GlyphSource for ActiveFont {
    fn glyph(&self, c: char) -> Option<Glyph> {
        match self {
            Self::Bitmap(font) => font.glyph(c),
            Self::Atlas(font) => font.glyph(c),
        }
    }

    fn fallback_advance(&self) -> f32 {
        match self {
            Self::Bitmap(font) => font.fallback_advance(),
            Self::Atlas(font) => font.fallback_advance(),
        }
    }

    fn line_height(&self) -> f32 {
        match self {
            Self::Bitmap(font) => font.line_height(),
            Self::Atlas(font) => font.line_height(),
        }
    }
}

/// The toolkit context: owns the backends and the active font.
///
/// One per process. Windows are owned by the host and passed back in for
/// every frame.
pub struct Guilay<W: WindowBackend, R: RenderBackend> {
    platform: W,
    renderer: R,
    font: ActiveFont,
    font_generation: u64,
    config: GuilayConfig,
}

impl<W: WindowBackend, R: RenderBackend> Guilay<W, R> {
    /// Validates the configuration, brings up the platform and loads the
    /// configured font.
    ///
    /// An atlas font that cannot be loaded is not fatal: the bitmap font is
    /// used instead.
    ///
    /// # Errors
    ///
    /// [`GuilayError::Config`] for an invalid configuration,
    /// [`GuilayError::BackendInit`] if the platform cannot start. The latter
    /// is fatal.
    pub fn init(mut platform: W, mut renderer: R, config: GuilayConfig) -> GuilayResult<Self> {
        config.validate()?;
        platform.init().map_err(GuilayError::BackendInit)?;

        let font = match &config.font {
            FontConfig::Bitmap => ActiveFont::Bitmap(BitmapFont),
            FontConfig::Atlas {
                path,
                pixel_size,
                glyph_count,
            } => {
                let loaded = AbGlyphBackend::from_file(path, *pixel_size).and_then(|mut backend| {
                    AtlasFont::load(&mut backend, &mut renderer, *glyph_count)
                });
                match loaded {
                    Ok(font) => ActiveFont::Atlas(font),
                    Err(err) => {
                        warn!(path = %path.display(), %err, "atlas font unavailable, using bitmap font");
                        ActiveFont::Bitmap(BitmapFont)
                    }
                }
            }
        };

        info!(
            font = font.kind(),
            max_elements = config.elements.max_elements,
            "guilay initialised"
        );

        Ok(Self {
            platform,
            renderer,
            font,
            font_generation: 0,
            config,
        })
    }

    /// Opens a window with an empty element tree.
    ///
    /// # Errors
    ///
    /// [`GuilayError::InvalidDimensions`] unless both sides are positive; no
    /// backend call is made in that case. [`GuilayError::Backend`] if the
    /// surface cannot be created.
    pub fn create_window(&mut self, size: Extent, name: &str) -> GuilayResult<Window> {
        if !size.is_positive() {
            return Err(GuilayError::InvalidDimensions {
                width: size.width,
                height: size.height,
            });
        }

        let surface = self.platform.create_surface(size, name)?;
        info!(name, ?size, ?surface, "window created");
        Ok(Window::new(surface, name, size, &self.config))
    }

    /// Replaces the active font with an atlas loaded through `backend`.
    ///
    /// Glyph bitmaps are uploaded through the render backend and the
    /// previous atlas, if any, is released. Windows re-place their text on
    /// the next frame.
    ///
    /// # Errors
    ///
    /// [`GuilayError::Glyph`] if no glyph could be loaded. The previous font
    /// stays active.
    pub fn load_font(&mut self, backend: &mut dyn FontBackend, glyph_count: u32) -> GuilayResult<()> {
        let font = AtlasFont::load(backend, &mut self.renderer, glyph_count)?;
        self.set_font(ActiveFont::Atlas(font));
        Ok(())
    }

    /// Switches back to the built-in bitmap font.
    pub fn use_bitmap_font(&mut self) {
        self.set_font(ActiveFont::Bitmap(BitmapFont));
    }

    fn set_font(&mut self, font: ActiveFont) {
        if let ActiveFont::Atlas(previous) = std::mem::replace(&mut self.font, font) {
            previous.release(&mut self.renderer);
        }
        self.font_generation += 1;
    }

    /// Draws one frame of `window`, presents it and handles pending input.
    ///
    /// # Errors
    ///
    /// [`GuilayError::Backend`] if drawing or presenting fails. Input is not
    /// polled for a frame that failed.
    pub fn update_window(&mut self, window: &mut Window) -> GuilayResult<FrameStats> {
        let mut stats = window.render(&mut self.renderer, &self.font, self.font_generation)?;
        self.platform.swap_buffers(window.surface())?;

        let events = self.platform.poll_events(window.surface());
        stats.events = events.len();
        for event in events {
            if window
                .handle_event(event, &self.font, self.font_generation)
                .is_some()
            {
                stats.activated += 1;
            }
        }

        trace!(
            window = window.name(),
            frame = stats.frame,
            triangles = stats.triangles,
            batches = stats.batches,
            events = stats.events,
            "frame complete"
        );
        Ok(stats)
    }

    /// Returns true once the window or the platform asked to close.
    #[must_use]
    pub fn should_close(&self, window: &Window) -> bool {
        window.close_requested() || self.platform.should_close(window.surface())
    }

    /// Returns the top-most element under `point`, rebuilding the window's
    /// spatial index first if it is stale.
    pub fn element_at(&self, window: &mut Window, point: Point) -> Option<ElementId> {
        window.element_at(point, &self.font, self.font_generation)
    }

    /// Releases a window's surface. Its elements are dropped with it.
    ///
    /// # Errors
    ///
    /// [`GuilayError::Backend`] if the surface is already gone.
    pub fn close_window(&mut self, window: Window) -> GuilayResult<()> {
        self.platform.destroy_surface(window.surface())?;
        info!(name = window.name(), frames = window.frames_rendered(), "window closed");
        Ok(())
    }

    /// Releases the active atlas and tears the platform down.
    pub fn shutdown(mut self) {
        let font = std::mem::replace(&mut self.font, ActiveFont::Bitmap(BitmapFont));
        if let ActiveFont::Atlas(font) = font {
            font.release(&mut self.renderer);
        }
        self.platform.terminate();
        info!("guilay shut down");
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &GuilayConfig {
        &self.config
    }

    /// Returns the active font.
    #[must_use]
    pub const fn font(&self) -> &ActiveFont {
        &self.font
    }

    /// Returns the active font as a glyph source.
    #[must_use]
    pub fn glyphs(&self) -> &dyn GlyphSource {
        &self.font
    }

    /// Returns the window backend.
    #[must_use]
    pub const fn platform(&self) -> &W {
        &self.platform
    }

    /// Returns the render backend.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<W: WindowBackend, R: RenderBackend> std::fmt::Debug for Guilay<W, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guilay")
            .field("font", &self.font)
            .field("font_generation", &self.font_generation)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
