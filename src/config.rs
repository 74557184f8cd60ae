//! Configuration types for batch PDF-to-PNG conversion.
//!
//! All rendering behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The config is handed to the
//! [`crate::BatchConverter`] once and shared by every file of every run.

use crate::error::BatchError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Lowest accepted rendering DPI.
pub const MIN_DPI: u32 = 36;
/// Highest accepted rendering DPI.
pub const MAX_DPI: u32 = 600;

/// Configuration for a batch conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2png::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .max_rendered_pixels(4000)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 36–600. Default: 200.
    ///
    /// A PDF point is 1/72 inch, so each page is scaled by `dpi / 72`.
    pub dpi: u32,

    /// Optional cap on either edge of a rendered page, in pixels. Default: none.
    ///
    /// When set, pages that would exceed the cap at the configured DPI are
    /// scaled down proportionally.
    pub max_rendered_pixels: Option<u32>,

    /// PDF user password applied to every document in the batch.
    pub password: Option<String>,

    /// Explicit path to the pdfium shared library. Checked before
    /// `PDFIUM_LIB_PATH` and the default search locations.
    pub pdfium_library_path: Option<PathBuf>,

    /// Receives per-file progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: None,
            password: None,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library_path", &self.pdfium_library_path)
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

    /// Scale factor from PDF points to pixels.
    pub fn scale_factor(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = Some(px.max(100));
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, BatchError> {
        let c = &self.config;
        if c.dpi < MIN_DPI || c.dpi > MAX_DPI {
            return Err(BatchError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if let Some(ref path) = c.pdfium_library_path {
            if path.as_os_str().is_empty() {
                return Err(BatchError::InvalidConfig(
                    "pdfium library path must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}
