//! Configuration types for PDF-to-PNG preview conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Only the scale factor and the output
//! format affect the produced pixels; everything else is a guard rail, an
//! identity (file name, password) or an integration hook.

use crate::error::ConfigError;
use crate::progress::{ConversionProgressCallback, ProgressCallback};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default render scale: 2× the page's native resolution.
pub const DEFAULT_SCALE: f32 = 2.0;

/// Default name of the packaged image file.
pub const DEFAULT_FILE_NAME: &str = "resume.png";

/// Configuration for a PDF-to-PNG conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use resumind_preview::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .scale(1.5)
///     .max_dimension(4096)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Multiplier applied to the page's native viewport (72 points per inch). Default: 2.0.
    ///
    /// 2.0 keeps résumé body text legible next to the review output while a
    /// US-Letter page stays at 1224 × 1584 px.
    pub scale: f32,

    /// Encoded output format. Default: [`RasterFormat::Png`].
    pub format: RasterFormat,

    /// 0-based page to rasterise. Default: 0 (the first page).
    pub page_index: usize,

    /// Maximum rendered edge in pixels. Default: 8192.
    ///
    /// The scale is never reduced to fit; a page whose scaled viewport exceeds
    /// this on either edge fails with a render error instead of allocating
    /// hundreds of megabytes of pixels.
    pub max_dimension: u32,

    /// Largest accepted input document in bytes. Default: 64 MiB.
    pub max_input_bytes: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Name given to the packaged image file. Default: `"resume.png"`.
    pub file_name: String,

    /// Explicit path to the pdfium shared library. If None, the loader
    /// falls back to `PDFIUM_LIB_PATH`, the executable's directory and
    /// finally the system library.
    pub library_path: Option<PathBuf>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Observer for stage transitions.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            format: RasterFormat::default(),
            page_index: 0,
            max_dimension: 8192,
            max_input_bytes: 64 * 1024 * 1024,
            password: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            library_path: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("scale", &self.scale)
            .field("format", &self.format)
            .field("page_index", &self.page_index)
            .field("max_dimension", &self.max_dimension)
            .field("max_input_bytes", &self.max_input_bytes)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("file_name", &self.file_name)
            .field("library_path", &self.library_path)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn format(mut self, format: RasterFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn page_index(mut self, index: usize) -> Self {
        self.config.page_index = index;
        self
    }

    pub fn max_dimension(mut self, px: u32) -> Self {
        self.config.max_dimension = px;
        self
    }

    pub fn max_input_bytes(mut self, bytes: usize) -> Self {
        self.config.max_input_bytes = bytes;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.library_path = Some(path.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn ConversionProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConfigError> {
        let c = &self.config;
        if !c.scale.is_finite() || c.scale <= 0.0 {
            return Err(ConfigError::InvalidScale(c.scale));
        }
        if c.max_dimension == 0 {
            return Err(ConfigError::InvalidMaxDimension);
        }
        if c.file_name.trim().is_empty() {
            return Err(ConfigError::EmptyFileName);
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Encoded raster format of the produced image.
///
/// Only PNG is produced today; the enum is non-exhaustive so further
/// formats can be added without breaking callers that match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RasterFormat {
    /// Lossless PNG at maximum compression. (default)
    #[default]
    Png,
}

impl RasterFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for RasterFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" | "image/png" => Ok(RasterFormat::Png),
            other => Err(format!("unsupported raster format '{other}' (expected: png)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.scale, 2.0);
        assert_eq!(c.format, RasterFormat::Png);
        assert_eq!(c.page_index, 0);
        assert_eq!(c.file_name, "resume.png");
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn builder_rejects_non_positive_scale() {
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = ConversionConfig::builder().scale(bad).build().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidScale(_)));
        }
    }

    #[test]
    fn builder_rejects_zero_max_dimension() {
        let err = ConversionConfig::builder()
            .max_dimension(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidMaxDimension);
    }

    #[test]
    fn builder_rejects_blank_file_name() {
        let err = ConversionConfig::builder()
            .file_name("  ")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyFileName);
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder()
            .password("hunter2")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn raster_format_parsing() {
        assert_eq!("PNG".parse::<RasterFormat>().unwrap(), RasterFormat::Png);
        assert_eq!("image/png".parse::<RasterFormat>().unwrap(), RasterFormat::Png);
        assert!("webp".parse::<RasterFormat>().is_err());
        assert_eq!(RasterFormat::Png.mime_type(), "image/png");
    }
}
