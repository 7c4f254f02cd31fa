//! # Toolkit configuration
//!
//! Loaded once at startup from TOML. Every section and field has a default,
//! so an empty file is a valid configuration.
//!
//! ```toml
//! [window]
//! clear_color = { red = 16, green = 16, blue = 20 }
//! margin = 4.0
//! line_gap = 2.0
//!
//! [elements]
//! max_elements = 255
//!
//! [spatial]
//! max_depth = 8
//!
//! [font]
//! kind = "atlas"
//! path = "fonts/DejaVuSans.ttf"
//! pixel_size = 48
//! ```

use std::path::{Path, PathBuf};

use guilay_core::Color;
use guilay_ui::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_ELEMENTS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deepest quadtree a configuration may ask for.
pub const MAX_SPATIAL_DEPTH: u32 = 16;

/// Errors raised while loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML or does not match the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Window appearance and text placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Fill color applied at the start of every frame.
    pub clear_color: Color,
    /// Inset from container edges for text runs, in pixels.
    pub margin: f32,
    /// Gap between consecutive text runs, in pixels.
    pub line_gap: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            margin: 4.0,
            line_gap: 2.0,
        }
    }
}

/// Element tree limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementsConfig {
    /// Live elements allowed per window.
    pub max_elements: usize,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

/// Spatial index limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Depth at which quadtree nodes stop splitting.
    pub max_depth: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Which glyph source text is drawn with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FontConfig {
    /// The built-in 5x7 bitmap font.
    #[default]
    Bitmap,
    /// Glyphs rasterized from a font file at startup.
    Atlas {
        /// TrueType or OpenType file.
        path: PathBuf,
        /// Rasterization size in pixels.
        #[serde(default = "default_pixel_size")]
        pixel_size: u32,
        /// Code points `0..glyph_count` are loaded.
        #[serde(default = "default_glyph_count")]
        glyph_count: u32,
    },
}

const fn default_pixel_size() -> u32 {
    48
}

const fn default_glyph_count() -> u32 {
    128
}

/// Complete toolkit configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuilayConfig {
    /// `[window]`
    pub window: WindowConfig,
    /// `[elements]`
    pub elements: ElementsConfig,
    /// `[spatial]`
    pub spatial: SpatialConfig,
    /// `[font]`
    pub font: FontConfig,
}

impl GuilayConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed input, [`ConfigError::Invalid`]
    /// for out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid(message));

        for (name, value) in [
            ("window.margin", self.window.margin),
            ("window.line_gap", self.window.line_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        if self.elements.max_elements == 0 {
            return invalid("elements.max_elements must be positive".to_string());
        }
        if !(1..=MAX_SPATIAL_DEPTH).contains(&self.spatial.max_depth) {
            return invalid(format!(
                "spatial.max_depth must be within 1..={MAX_SPATIAL_DEPTH}, got {}",
                self.spatial.max_depth
            ));
        }
        if let FontConfig::Atlas {
            path,
            pixel_size,
            glyph_count,
        } = &self.font
        {
            if path.as_os_str().is_empty() {
                return invalid("font.path must not be empty".to_string());
            }
            if *pixel_size == 0 {
                return invalid("font.pixel_size must be positive".to_string());
            }
            if *glyph_count == 0 {
                return invalid("font.glyph_count must be positive".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = GuilayConfig::from_toml_str("").unwrap();
        assert_eq!(config, GuilayConfig::default());
        assert_eq!(config.elements.max_elements, 255);
        assert_eq!(config.font, FontConfig::Bitmap);
    }

    #[test]
    fn test_atlas_font_defaults() {
        let config = GuilayConfig::from_toml_str(
            r#"
            [window]
            clear_color = { red = 10, green = 20, blue = 30 }

            [font]
            kind = "atlas"
            path = "fonts/mono.ttf"
            "#,
        )
        .unwrap();

        assert_eq!(config.window.clear_color, Color::rgb(10, 20, 30));
        assert!((config.window.margin - 4.0).abs() < f32::EPSILON);
        assert_eq!(
            config.font,
            FontConfig::Atlas {
                path: PathBuf::from("fonts/mono.ttf"),
                pixel_size: 48,
                glyph_count: 128,
            }
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        for source in [
            "[window]\nmargin = -1.0",
            "[elements]\nmax_elements = 0",
            "[spatial]\nmax_depth = 0",
            "[spatial]\nmax_depth = 17",
            "[font]\nkind = \"atlas\"\npath = \"a.ttf\"\npixel_size = 0",
        ] {
            let err = GuilayConfig::from_toml_str(source).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{source}: {err}");
        }
    }

    #[test]
    fn test_malformed_rejected() {
        let err = GuilayConfig::from_toml_str("[font]\nkind = \"vector\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = GuilayConfig::from_toml_str("[font]\nkind = \"atlas\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = GuilayConfig::from_file("/nonexistent/guilay.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
