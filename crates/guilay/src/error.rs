//! # Guilay Error Types
//!
//! The top-level error every public operation returns. Lower layers keep
//! their own enums; `From` conversions let `?` carry them up unchanged.

use guilay_ui::{ElementError, GlyphError, SpatialError};
use thiserror::Error;

use crate::backend::BackendError;
use crate::config::ConfigError;

/// Errors surfaced to the host application.
#[derive(Error, Debug)]
pub enum GuilayError {
    /// A window or viewport size was not strictly positive.
    ///
    /// Raised before any backend call is made.
    #[error("invalid dimensions {width}x{height}: both must be positive")]
    InvalidDimensions {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },

    /// The windowing or graphics context could not be created.
    ///
    /// Fatal: no rendering call may follow.
    #[error("backend initialisation failed: {0}")]
    BackendInit(#[source] BackendError),

    /// A backend call failed after initialisation.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// An element tree operation failed.
    #[error(transparent)]
    Element(#[from] ElementError),

    /// A spatial index operation failed.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// A font or glyph resource could not be produced.
    #[error(transparent)]
    Glyph(#[from] GlyphError),

    /// The configuration could not be read or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GuilayError {
    /// Returns true if the session cannot continue after this error.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::BackendInit(_))
    }
}

/// Result type for guilay operations.
pub type GuilayResult<T> = Result<T, GuilayError>;
