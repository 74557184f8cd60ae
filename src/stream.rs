//! Streaming batch API: emit one report per file as it finishes.
//!
//! [`crate::BatchConverter::convert_all`] returns only after the last file.
//! [`convert_stream`] yields each [`FileReport`] as soon as that file's PNGs
//! are on disk, in queue order, which suits front ends that list results as
//! they arrive. Counting is left to the caller (fold the items into a
//! [`crate::ConversionSummary`] with `record` if needed).

use crate::cancel::CancellationToken;
use crate::convert::BatchConverter;
use crate::error::BatchError;
use crate::output::FileReport;
use futures::future;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-file reports borrowing the converter.
pub type ReportStream<'a> = Pin<Box<dyn Stream<Item = FileReport> + Send + 'a>>;

/// Convert the queue, streaming a report per file.
///
/// The cancellation token is checked before each file is started; once set,
/// the stream ends. The converter counts as busy until the stream is dropped.
///
/// # Errors
/// [`BatchError::RunInProgress`] if another run on `converter` is active.
pub fn convert_stream<'a>(
    converter: &'a BatchConverter,
    cancel: &CancellationToken,
) -> Result<ReportStream<'a>, BatchError> {
    let guard = converter.begin_run()?;
    let total = converter.queue().len();
    let cancel = cancel.clone();
    info!("Starting streaming batch of {} files", total);

    let reports = stream::iter(converter.queue().iter().enumerate())
        .take_while(move |(i, _)| {
            let go = !cancel.is_cancelled();
            if !go {
                info!("Cancelled before file {}/{}", i + 1, total);
            }
            future::ready(go)
        })
        .then(move |(i, source)| converter.convert_file(i + 1, total, source))
        .map(move |report| {
            let _busy = &guard;
            report
        });

    Ok(Box::pin(reports))
}

impl BatchConverter {
    /// Method form of [`convert_stream`].
    pub fn convert_stream(&self, cancel: &CancellationToken) -> Result<ReportStream<'_>, BatchError> {
        convert_stream(self, cancel)
    }
}
