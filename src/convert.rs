//! The batch conversion manager.
//!
//! [`BatchConverter`] owns the queue of source PDFs and drives the
//! file-by-file loop. It knows nothing about how files were chosen or how
//! progress is shown; a front end calls [`BatchConverter::add_files`],
//! [`BatchConverter::remove_files`], [`BatchConverter::clear`] and
//! [`BatchConverter::convert_all`] directly.
//!
//! ## Failure isolation
//!
//! Every per-file error (render, encode, write) is caught at the file
//! boundary and recorded in the [`ConversionSummary`]. Only
//! [`BatchError::RunInProgress`] escapes `convert_all`.

use crate::cancel::CancellationToken;
use crate::config::ConversionConfig;
use crate::error::{BatchError, FileError};
use crate::output::{ConversionResult, ConversionSummary, FileReport};
use crate::pipeline::render::{self, PdfiumRasterizer, Rasterizer};
use crate::pipeline::write;
use crate::queue::ConversionQueue;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Owns a [`ConversionQueue`] and converts it to PNGs.
///
/// # Example
/// ```rust,no_run
/// use pdf2png::{BatchConverter, CancellationToken, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut converter = BatchConverter::new(ConversionConfig::default());
/// converter.add_files(["report.pdf", "slides.pdf"]);
///
/// let summary = converter.convert_all(&CancellationToken::new()).await?;
/// println!("{} converted, {} errors", summary.converted_count, summary.error_count);
/// # Ok(())
/// # }
/// ```
pub struct BatchConverter {
    queue: ConversionQueue,
    config: ConversionConfig,
    rasterizer: Arc<dyn Rasterizer>,
    running: AtomicBool,
}

impl BatchConverter {
    /// Create a converter that renders through pdfium.
    pub fn new(config: ConversionConfig) -> Self {
        let rasterizer = Arc::new(PdfiumRasterizer::from_config(&config));
        Self::with_rasterizer(config, rasterizer)
    }

    /// Create a converter with a caller-supplied rasteriser.
    pub fn with_rasterizer(config: ConversionConfig, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            queue: ConversionQueue::new(),
            config,
            rasterizer,
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn queue(&self) -> &ConversionQueue {
        &self.queue
    }

    /// Queue every path not already present, in input order.
    ///
    /// No existence or extension checks are made. Returns how many paths
    /// were actually appended.
    pub fn add_files<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let added = self.queue.add(paths);
        info!("{} files ready for conversion", self.queue.len());
        added
    }

    /// Remove the entries at the given queue positions.
    ///
    /// All indices refer to the queue as it was before the call.
    /// Out-of-range indices are ignored.
    pub fn remove_files<I>(&mut self, indices: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        let removed = self.queue.remove_indices(indices);
        debug!("Removed {} files, {} remain", removed, self.queue.len());
        removed
    }

    /// Remove entries by path.
    pub fn remove_paths<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let removed = self.queue.remove_paths(paths);
        debug!("Removed {} files, {} remain", removed, self.queue.len());
        removed
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        debug!("Queue cleared");
    }

    /// Convert every queued file, in order, to one PNG per page.
    ///
    /// `cancel` is checked before each file; once set, the loop stops and
    /// the summary is marked `cancelled`. The queue itself is left as is.
    ///
    /// # Errors
    /// [`BatchError::RunInProgress`] if another run on this converter has
    /// not finished. Per-file failures never surface here.
    pub async fn convert_all(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ConversionSummary, BatchError> {
        let _guard = self.begin_run()?;
        let total_start = Instant::now();
        let total = self.queue.len();
        let mut summary = ConversionSummary::default();

        if total == 0 {
            warn!("Nothing to convert: the queue is empty");
        } else {
            info!("Starting batch of {} files", total);
        }

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_start(total);
        }

        for (i, source) in self.queue.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Cancelled before file {}/{}", i + 1, total);
                summary.cancelled = true;
                break;
            }
            let report = self.convert_file(i + 1, total, source).await;
            summary.record(report);
        }

        summary.total_duration_ms = total_start.elapsed().as_millis() as u64;
        info!(
            "Batch complete: {} converted, {} errors, {}ms",
            summary.converted_count, summary.error_count, summary.total_duration_ms
        );

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_complete(&summary);
        }

        Ok(summary)
    }

    /// Synchronous wrapper around [`BatchConverter::convert_all`].
    ///
    /// Creates a temporary tokio runtime internally, so it must not be called
    /// from inside an existing runtime.
    pub fn convert_all_sync(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ConversionSummary, BatchError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| BatchError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.convert_all(cancel))
    }

    /// Mark this converter busy for the lifetime of the returned guard.
    pub(crate) fn begin_run(&self) -> Result<RunGuard<'_>, BatchError> {
        RunGuard::acquire(&self.running)
    }

    /// Render and write one file, folding any failure into its report.
    pub(crate) async fn convert_file(&self, index: usize, total: usize, source: &Path) -> FileReport {
        let start = Instant::now();
        info!("Converting [{}/{}]: {}", index, total, source.display());

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_file_start(index, total, source);
        }

        let mut outputs = Vec::new();
        let result = match self.render_and_write(source, &mut outputs).await {
            Ok(page_count) => {
                info!("Converted {} ({} pages)", source.display(), page_count);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_file_complete(index, total, source, page_count);
                }
                ConversionResult::Converted { page_count }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Failed to convert {}: {}", source.display(), message);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_file_error(index, total, source, &message);
                }
                ConversionResult::Failed { message }
            }
        };

        FileReport {
            source: source.to_path_buf(),
            result,
            outputs,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn render_and_write(
        &self,
        source: &Path,
        outputs: &mut Vec<PathBuf>,
    ) -> Result<usize, FileError> {
        let pages = render::render_to_png(Arc::clone(&self.rasterizer), source.to_path_buf()).await?;
        let page_count = pages.len();
        write::write_pages(source, pages, outputs).await?;
        Ok(page_count)
    }
}

/// Holds the converter's busy flag; cleared on drop.
pub(crate) struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, BatchError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| RunGuard { flag })
            .map_err(|_| BatchError::RunInProgress)
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
