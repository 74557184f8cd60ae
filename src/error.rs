//! Error types for the pdf2png library.
//!
//! Two layers of failure exist:
//!
//! * [`BatchError`] — **Fatal**: the batch run cannot start at all (another
//!   run is already active on the same converter, invalid configuration).
//!   Returned as `Err(BatchError)` from [`crate::BatchConverter::convert_all`].
//!
//! * [`FileError`] — **Non-fatal**: a single source file failed to render or
//!   one of its PNGs could not be written. It is caught at the file-loop
//!   boundary and recorded as [`crate::output::ConversionResult::Failed`] so
//!   the remaining files still get converted.
//!
//! [`RenderError`] is the rasteriser's own error type and is wrapped by
//! [`FileError::Render`].

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors returned by the batch API.
#[derive(Debug, Error)]
pub enum BatchError {
    /// `convert_all` was called while another run on the same converter
    /// had not finished yet.
    #[error("A conversion run is already in progress on this converter")]
    RunInProgress,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures raised by a [`crate::pipeline::render::Rasterizer`].
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// No PDFium library could be bound.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or place the library next to the executable."
    )]
    EngineUnavailable(String),

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt or unreadable: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium returned an error for a specific page (1-indexed).
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The blocking render task panicked or was cancelled by the runtime.
    #[error("Render task failed: {0}")]
    TaskFailed(String),
}

/// A non-fatal error for a single source file.
#[derive(Debug, Error)]
pub enum FileError {
    /// The rasteriser could not produce page images.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A rendered page could not be encoded as PNG.
    #[error("Failed to encode '{path}' as PNG: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The filesystem refused an output PNG.
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
