//! Batch workflow tests against an in-process rasteriser.
//!
//! No pdfium is needed: `FakeRasterizer` produces solid-colour pages, fails
//! any file whose name contains "corrupt", and logs the order it was called
//! in. Output PNGs are written to real temp directories.

use futures::StreamExt;
use image::{DynamicImage, Rgba, RgbaImage};
use pdf2png::{
    BatchConverter, BatchError, CancellationToken, ConversionConfig, ConversionProgressCallback,
    ConversionResult, ConversionSummary, Rasterizer, RenderError,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeRasterizer {
    pages: HashMap<PathBuf, usize>,
    delay: Option<Duration>,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeRasterizer {
    fn new() -> Self {
        Self::default()
    }

    fn with_pages(mut self, path: impl Into<PathBuf>, n: usize) -> Self {
        self.pages.insert(path.into(), n);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl Rasterizer for FakeRasterizer {
    fn render(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, RenderError> {
        self.calls.lock().unwrap().push(pdf_path.to_path_buf());
        if let Some(d) = self.delay {
            std::thread::sleep(d);
        }
        let name = pdf_path.file_name().unwrap().to_string_lossy();
        if name.contains("corrupt") {
            return Err(RenderError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: "startxref not found".into(),
            });
        }
        let n = self.pages.get(pdf_path).copied().unwrap_or(1);
        Ok((0..n)
            .map(|i| {
                DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                    8,
                    6,
                    Rgba([i as u8 * 40, 0, 0, 255]),
                ))
            })
            .collect())
    }
}

/// Progress callback that records events and can cancel after a given file.
struct Recorder {
    events: Mutex<Vec<String>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    fn cancelling_after(index: usize, token: CancellationToken) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            cancel_after: Some((index, token)),
        }
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, e: String) {
        self.events.lock().unwrap().push(e);
    }
}

impl ConversionProgressCallback for Recorder {
    fn on_batch_start(&self, total_files: usize) {
        self.push(format!("batch_start {total_files}"));
    }

    fn on_file_start(&self, index: usize, _total: usize, _source: &Path) {
        self.push(format!("start {index}"));
    }

    fn on_file_complete(&self, index: usize, _total: usize, _source: &Path, page_count: usize) {
        self.push(format!("complete {index} {page_count}"));
        if let Some((after, ref token)) = self.cancel_after {
            if after == index {
                token.cancel();
            }
        }
    }

    fn on_file_error(&self, index: usize, _total: usize, _source: &Path, _error: &str) {
        self.push(format!("error {index}"));
    }

    fn on_batch_complete(&self, summary: &ConversionSummary) {
        self.push(format!(
            "batch_complete {} {}",
            summary.converted_count, summary.error_count
        ));
    }
}

fn converter_with(rasterizer: &Arc<FakeRasterizer>) -> BatchConverter {
    BatchConverter::with_rasterizer(ConversionConfig::default(), rasterizer.clone())
}

fn converter_with_callback(
    rasterizer: &Arc<FakeRasterizer>,
    cb: Arc<dyn ConversionProgressCallback>,
) -> BatchConverter {
    let config = ConversionConfig::builder()
        .progress_callback(cb)
        .build()
        .expect("valid config");
    BatchConverter::with_rasterizer(config, rasterizer.clone())
}

fn png_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".png"))
        .collect();
    names.sort();
    names
}

// ── Conversion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn naming_scheme_writes_beside_source() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("report.pdf");
    let raster = Arc::new(FakeRasterizer::new().with_pages(&report, 2));
    let mut converter = converter_with(&raster);
    converter.add_files([report.clone()]);

    let summary = converter.convert_all(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.converted_count, 1);
    assert_eq!(png_files(dir.path()), vec!["report_page_1.png", "report_page_2.png"]);
    assert_eq!(
        summary.results[0].outputs,
        vec![
            dir.path().join("report_page_1.png"),
            dir.path().join("report_page_2.png")
        ]
    );

    let decoded = image::open(dir.path().join("report_page_2.png")).expect("valid png");
    assert_eq!((decoded.width(), decoded.height()), (8, 6));
}

#[tokio::test]
async fn failure_isolation() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.pdf");
    let corrupt = dir.path().join("corrupt.pdf");
    let good2 = dir.path().join("good2.pdf");
    let raster = Arc::new(
        FakeRasterizer::new()
            .with_pages(&good, 2)
            .with_pages(&good2, 3),
    );
    let mut converter = converter_with(&raster);
    converter.add_files([good.clone(), corrupt.clone(), good2.clone()]);

    let summary = converter.convert_all(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.converted_count, 2);
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.processed(), 3);
    assert!(!summary.cancelled);

    assert_eq!(
        summary.results[1].result,
        ConversionResult::Failed {
            message: format!(
                "PDF '{}' is corrupt or unreadable: startxref not found",
                corrupt.display()
            )
        }
    );
    assert_eq!(summary.results[2].result, ConversionResult::Converted { page_count: 3 });

    assert_eq!(
        png_files(dir.path()),
        vec![
            "good2_page_1.png",
            "good2_page_2.png",
            "good2_page_3.png",
            "good_page_1.png",
            "good_page_2.png",
        ]
    );
}

#[tokio::test]
async fn files_are_converted_in_queue_order_and_queue_is_kept() {
    let dir = TempDir::new().unwrap();
    let files: Vec<PathBuf> = ["c.pdf", "a.pdf", "b.pdf"]
        .iter()
        .map(|n| dir.path().join(n))
        .collect();
    let raster = Arc::new(FakeRasterizer::new());
    let mut converter = converter_with(&raster);
    converter.add_files(files.clone());

    let summary = converter.convert_all(&CancellationToken::new()).await.unwrap();

    assert_eq!(raster.calls(), files);
    let sources: Vec<PathBuf> = summary.results.iter().map(|r| r.source.clone()).collect();
    assert_eq!(sources, files);
    assert_eq!(converter.queue().as_slice(), files.as_slice());
}

#[tokio::test]
async fn empty_queue_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let raster = Arc::new(FakeRasterizer::new());
    let converter = converter_with(&raster);

    let summary = converter.convert_all(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.converted_count, 0);
    assert_eq!(summary.error_count, 0);
    assert!(summary.results.is_empty());
    assert!(raster.calls().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn write_failure_is_recorded_and_batch_continues() {
    let dir = TempDir::new().unwrap();
    let orphan = dir.path().join("no_such_dir").join("orphan.pdf");
    let ok = dir.path().join("ok.pdf");
    let raster = Arc::new(FakeRasterizer::new());
    let mut converter = converter_with(&raster);
    converter.add_files([orphan.clone(), ok.clone()]);

    let summary = converter.convert_all(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.converted_count, 1);
    assert_eq!(summary.error_count, 1);
    match &summary.results[0].result {
        ConversionResult::Failed { message } => {
            assert!(message.contains("orphan_page_1.png"), "got: {message}")
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(summary.results[0].outputs.is_empty());
    assert_eq!(png_files(dir.path()), vec!["ok_page_1.png"]);
}

#[tokio::test]
async fn repeated_runs_overwrite_outputs() {
    let dir = TempDir::new().unwrap();
    let doc = dir.path().join("doc.pdf");
    let raster = Arc::new(FakeRasterizer::new().with_pages(&doc, 2));
    let mut converter = converter_with(&raster);
    converter.add_files([doc.clone()]);

    let first = converter.convert_all(&CancellationToken::new()).await.unwrap();
    let second = converter.convert_all(&CancellationToken::new()).await.unwrap();

    assert_eq!(first.converted_count, 1);
    assert_eq!(second.converted_count, 1);
    assert_eq!(png_files(dir.path()), vec!["doc_page_1.png", "doc_page_2.png"]);
}

// ── Cancellation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancellation_after_first_file_stops_before_second() {
    let dir = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let recorder = Arc::new(Recorder::cancelling_after(1, cancel.clone()));
    let raster = Arc::new(FakeRasterizer::new());
    let mut converter = converter_with_callback(&raster, recorder.clone());
    converter.add_files(["one.pdf", "two.pdf", "three.pdf"].map(|n| dir.path().join(n)));

    let summary = converter.convert_all(&cancel).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.processed(), 1);
    assert_eq!(summary.converted_count, 1);
    assert_eq!(raster.calls(), vec![dir.path().join("one.pdf")]);
    assert_eq!(png_files(dir.path()), vec!["one_page_1.png"]);
    assert_eq!(converter.queue().len(), 3);
}

#[tokio::test]
async fn pre_cancelled_token_converts_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let raster = Arc::new(FakeRasterizer::new());
    let mut converter = converter_with(&raster);
    converter.add_files(["a.pdf"]);

    let summary = converter.convert_all(&cancel).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.processed(), 0);
    assert!(raster.calls().is_empty());
}

// ── Progress events ──────────────────────────────────────────────────────────

#[tokio::test]
async fn progress_events_arrive_in_order() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.pdf");
    let raster = Arc::new(FakeRasterizer::new().with_pages(&good, 4));
    let recorder = Arc::new(Recorder::new());
    let mut converter = converter_with_callback(&raster, recorder.clone());
    converter.add_files([good, dir.path().join("corrupt.pdf")]);

    converter.convert_all(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            "batch_start 2",
            "start 1",
            "complete 1 4",
            "start 2",
            "error 2",
            "batch_complete 1 1",
        ]
    );
}

// ── Run exclusivity ──────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_run_is_rejected() {
    let dir = TempDir::new().unwrap();
    let raster = Arc::new(FakeRasterizer::new().with_delay(Duration::from_millis(100)));
    let mut converter = converter_with(&raster);
    converter.add_files([dir.path().join("slow.pdf")]);
    let cancel = CancellationToken::new();

    let (first, second) = tokio::join!(converter.convert_all(&cancel), converter.convert_all(&cancel));

    assert_eq!(first.unwrap().converted_count, 1);
    assert!(matches!(second, Err(BatchError::RunInProgress)));

    // The guard is released once the first run ends.
    assert!(converter.convert_all(&cancel).await.is_ok());
}

// ── Streaming ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stream_yields_reports_in_queue_order() {
    let dir = TempDir::new().unwrap();
    let files: Vec<PathBuf> = ["x.pdf", "corrupt.pdf", "y.pdf"]
        .iter()
        .map(|n| dir.path().join(n))
        .collect();
    let raster = Arc::new(FakeRasterizer::new());
    let mut converter = converter_with(&raster);
    converter.add_files(files.clone());

    let reports: Vec<_> = converter
        .convert_stream(&CancellationToken::new())
        .unwrap()
        .collect()
        .await;

    let sources: Vec<PathBuf> = reports.iter().map(|r| r.source.clone()).collect();
    assert_eq!(sources, files);
    assert!(reports[0].result.is_converted());
    assert!(!reports[1].result.is_converted());

    let mut summary = ConversionSummary::default();
    reports.into_iter().for_each(|r| summary.record(r));
    assert_eq!((summary.converted_count, summary.error_count), (2, 1));
}

#[tokio::test]
async fn stream_honours_cancellation_and_holds_the_run() {
    let dir = TempDir::new().unwrap();
    let raster = Arc::new(FakeRasterizer::new());
    let mut converter = converter_with(&raster);
    converter.add_files(["a.pdf", "b.pdf", "c.pdf"].map(|n| dir.path().join(n)));
    let cancel = CancellationToken::new();

    let mut stream = converter.convert_stream(&cancel).unwrap();
    let first = stream.next().await.expect("first report");
    assert!(first.result.is_converted());
    assert!(matches!(
        converter.convert_all(&cancel).await,
        Err(BatchError::RunInProgress)
    ));

    cancel.cancel();
    assert!(stream.next().await.is_none());
    drop(stream);

    assert_eq!(raster.calls().len(), 1);
    assert_eq!(png_files(dir.path()), vec!["a_page_1.png"]);
}

// ── Sync wrapper ─────────────────────────────────────────────────────────────

#[test]
fn sync_wrapper_converts() {
    let dir = TempDir::new().unwrap();
    let raster = Arc::new(FakeRasterizer::new());
    let mut converter = converter_with(&raster);
    converter.add_files([dir.path().join("sync.pdf")]);

    let summary = converter
        .convert_all_sync(&CancellationToken::new())
        .expect("sync conversion");

    assert_eq!(summary.converted_count, 1);
    assert!(dir.path().join("sync_page_1.png").exists());
}

#[test]
fn stream_can_be_driven_without_tokio_main() {
    let dir = TempDir::new().unwrap();
    let raster = Arc::new(FakeRasterizer::new());
    let mut converter = converter_with(&raster);
    converter.add_files([dir.path().join("bare.pdf")]);

    // spawn_blocking needs a runtime, so drive the stream inside one.
    let rt = tokio::runtime::Runtime::new().unwrap();
    let count = rt.block_on(async {
        converter
            .convert_stream(&CancellationToken::new())
            .unwrap()
            .count()
            .await
    });
    assert_eq!(count, 1);
    tokio_test::assert_ok!(converter.convert_all_sync(&CancellationToken::new()));
}
