//! PDF rasterisation: turn one source file into page images.
//!
//! The [`Rasterizer`] trait is the seam between the batch loop and whatever
//! actually draws pages. [`PdfiumRasterizer`] is the production
//! implementation; tests inject their own.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is CPU-bound and keeps thread-local state, so it must not run on a
//! Tokio worker thread. [`render_to_png`] moves rendering *and* PNG encoding
//! onto the blocking pool and hands back encoded bytes ready to write.

use crate::config::ConversionConfig;
use crate::error::{FileError, RenderError};
use crate::pipeline::{encode, engine, write};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Produces one image per page, in page order.
pub trait Rasterizer: Send + Sync {
    fn render(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, RenderError>;
}

/// Renders pages through pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    scale: f32,
    max_pixels: Option<u32>,
    password: Option<String>,
    library_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            scale: config.scale_factor(),
            max_pixels: config.max_rendered_pixels,
            password: config.password.clone(),
            library_path: config.pdfium_library_path.clone(),
        }
    }

    fn render_config(&self) -> PdfRenderConfig {
        let mut render_config = PdfRenderConfig::new().scale_page_by_factor(self.scale);
        if let Some(max) = self.max_pixels {
            render_config = render_config
                .set_maximum_width(max as i32)
                .set_maximum_height(max as i32);
        }
        render_config
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn render(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, RenderError> {
        let pdfium = engine::bind_pdfium(self.library_path.as_deref())?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, self.password.as_deref())
            .map_err(|e| classify_load_error(pdf_path, format!("{:?}", e), self.password.is_some()))?;

        let pages = document.pages();
        info!("PDF loaded: {} pages", pages.len());

        let render_config = self.render_config();
        let mut images = Vec::with_capacity(pages.len() as usize);

        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                RenderError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Ok(images)
    }
}

/// Map a pdfium load failure onto the password/corruption variants.
fn classify_load_error(pdf_path: &Path, detail: String, password_supplied: bool) -> RenderError {
    if detail.contains("Password") || detail.contains("password") {
        if password_supplied {
            RenderError::WrongPassword {
                path: pdf_path.to_path_buf(),
            }
        } else {
            RenderError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        }
    } else {
        RenderError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail,
        }
    }
}

/// Rasterise `pdf_path` and PNG-encode every page on the blocking pool.
///
/// # Returns
/// Encoded PNG bytes, one buffer per page, in page order.
pub async fn render_to_png(
    rasterizer: Arc<dyn Rasterizer>,
    pdf_path: PathBuf,
) -> Result<Vec<Vec<u8>>, FileError> {
    tokio::task::spawn_blocking(move || -> Result<Vec<Vec<u8>>, FileError> {
        let images = rasterizer.render(&pdf_path)?;
        images
            .iter()
            .enumerate()
            .map(|(idx, img)| {
                encode::encode_png(img).map_err(|source| FileError::Encode {
                    path: write::page_output_path(&pdf_path, idx + 1),
                    source,
                })
            })
            .collect()
    })
    .await
    .map_err(|e| FileError::Render(RenderError::TaskFailed(e.to_string())))?
}
