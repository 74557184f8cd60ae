//! # pdf2png
//!
//! Batch-convert PDF documents to PNG images, one image per page.
//!
//! The crate is a headless core: a [`BatchConverter`] owns an ordered,
//! duplicate-free queue of source PDFs, renders each one through pdfium and
//! writes `<stem>_page_<n>.png` beside the source. A failing file is recorded
//! in the [`ConversionSummary`] and the batch moves on; nothing short of a
//! second concurrent run aborts it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! queue ──▶ for each file, in order:
//!             ├─ cancel?  stop before starting the file
//!             ├─ Render   rasterise all pages via pdfium (spawn_blocking)
//!             ├─ Encode   DynamicImage → PNG bytes
//!             └─ Write    <dir>/<stem>_page_<n>.png, n = 1..
//!           ──▶ ConversionSummary { converted_count, error_count, results }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2png::{BatchConverter, CancellationToken, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().dpi(150).build()?;
//!     let mut converter = BatchConverter::new(config);
//!     converter.add_files(["report.pdf", "invoice.pdf"]);
//!
//!     let summary = converter.convert_all(&CancellationToken::new()).await?;
//!     eprintln!(
//!         "{} converted, {} errors",
//!         summary.converted_count, summary.error_count
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2png` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## pdfium
//!
//! The pdfium shared library is loaded at runtime. See
//! [`pipeline::engine`] for the search order; `PDFIUM_LIB_PATH` points it at
//! a specific copy.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cancel;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod queue;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cancel::CancellationToken;
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::BatchConverter;
pub use error::{BatchError, FileError, RenderError};
pub use output::{ConversionResult, ConversionSummary, FileReport};
pub use pipeline::render::{PdfiumRasterizer, Rasterizer};
pub use pipeline::write::page_output_path;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use queue::ConversionQueue;
pub use stream::{convert_stream, ReportStream};
