//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the batch works through its queue. The CLI drives its progress
//! bar from these; a GUI would drive its progress dialog the same way.
//!
//! # Example
//!
//! ```rust
//! use pdf2png::{ConversionProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, source: &Path, page_count: usize) {
//!         self.pages.fetch_add(page_count, Ordering::SeqCst);
//!         eprintln!("{}/{} {} ({} pages)", index, total, source.display(), page_count);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { pages: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConversionSummary;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch loop as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events for one run arrive from a single task in
/// queue order, but the callback is shared behind an `Arc` so it must be
/// `Send + Sync`.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first file is started.
    ///
    /// # Arguments
    /// * `total_files` — number of files queued for this run
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file is handed to the rasteriser.
    ///
    /// # Arguments
    /// * `index`  — 1-indexed position in the queue
    /// * `total`  — queued files
    /// * `source` — the source PDF
    fn on_file_start(&self, index: usize, total: usize, source: &Path) {
        let _ = (index, total, source);
    }

    /// Called when every page of a file has been written.
    fn on_file_complete(&self, index: usize, total: usize, source: &Path, page_count: usize) {
        let _ = (index, total, source, page_count);
    }

    /// Called when a file failed to render or write.
    ///
    /// `error` is the same message stored in the summary.
    fn on_file_error(&self, index: usize, total: usize, source: &Path, error: &str) {
        let _ = (index, total, source, error);
    }

    /// Called once after the loop ends, whether it ran to completion or was
    /// cancelled.
    fn on_batch_complete(&self, summary: &ConversionSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
