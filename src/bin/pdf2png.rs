//! CLI binary for pdf2png.
//!
//! A thin shim over the library crate: filters the arguments down to PDF
//! files, queues them on a `BatchConverter`, wires Ctrl-C to cooperative
//! cancellation and prints the summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2png::{
    BatchConverter, CancellationToken, ConversionConfig, ConversionProgressCallback,
    ConversionSummary, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a ✓/✗ line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the file currently being converted.
    file_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            file_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self) -> f64 {
        self.file_started
            .lock()
            .ok()
            .and_then(|mut t| t.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

fn file_label(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string())
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} PDF files to PNG…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, source: &Path) {
        if let Ok(mut t) = self.file_started.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_message(file_label(source));
    }

    fn on_file_complete(&self, index: usize, total: usize, source: &Path, page_count: usize) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {:>3}/{:<3} {}  {}  {}",
            green("✓"),
            index,
            total,
            file_label(source),
            dim(&format!("{page_count} pages")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, source: &Path, error: &str) {
        let secs = self.elapsed_secs();

        // Keep one line per file; the full text is in the summary.
        let first_line = error.lines().next().unwrap_or(error);
        let msg = if first_line.chars().count() > 80 {
            let cut: String = first_line.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3} {}  {}  {}",
            red("✗"),
            index,
            total,
            file_label(source),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _summary: &ConversionSummary) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert two documents; PNGs land next to each PDF
  pdf2png report.pdf slides.pdf

  # Every PDF in a directory (non-PDF arguments are skipped)
  pdf2png ~/Downloads/*

  # Lower resolution, capped at 2000 px per edge
  pdf2png --dpi 100 --max-pixels 2000 poster.pdf

  # Encrypted input
  pdf2png --password s3cret statement.pdf

  # Machine-readable summary
  pdf2png --json *.pdf > summary.json

OUTPUT NAMING:
  /docs/report.pdf  →  /docs/report_page_1.png, /docs/report_page_2.png, …
  Existing files with the same name are overwritten.

EXIT STATUS:
  0    every file converted
  1    usage error (no PDF inputs, bad configuration)
  2    at least one file failed
  130  cancelled with Ctrl-C

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium
  RUST_LOG          Log filter (e.g. pdf2png=debug)
"#;

/// Convert each page of one or more PDF files to PNG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2png",
    version,
    about = "Convert each page of one or more PDF files to PNG images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files to convert. Arguments not ending in `.pdf` are skipped.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Rendering DPI (36–600).
    #[arg(long, env = "PDF2PNG_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(36..=600))]
    dpi: u32,

    /// Cap either edge of a rendered page at this many pixels.
    #[arg(long, env = "PDF2PNG_MAX_PIXELS")]
    max_pixels: Option<u32>,

    /// PDF user password, applied to every input.
    #[arg(long, env = "PDF2PNG_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDF2PNG_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Print the conversion summary as JSON on stdout.
    #[arg(long, env = "PDF2PNG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2PNG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PNG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PNG_QUIET")]
    quiet: bool,
}

/// `true` if the path ends in `.pdf`, ignoring case.
fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Split arguments into PDF inputs and everything else, preserving order.
fn partition_inputs(inputs: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    inputs.into_iter().partition(|p| is_pdf(p))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Select inputs ────────────────────────────────────────────────────
    let (pdfs, skipped) = partition_inputs(cli.inputs.clone());
    for path in &skipped {
        warn!("Skipping non-PDF input: {}", path.display());
    }
    if pdfs.is_empty() {
        anyhow::bail!("No PDF files to convert");
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let mut converter = BatchConverter::new(config);
    converter.add_files(pdfs);

    // ── Ctrl-C → cooperative cancel ──────────────────────────────────────
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Cancellation requested; finishing the current file");
                cancel.cancel();
            }
        });
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let summary = converter
        .convert_all(&cancel)
        .await
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        print_summary(&summary, converter.queue().len());
    }

    Ok(exit_code(&summary))
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder().dpi(cli.dpi);

    if let Some(px) = cli.max_pixels {
        builder = builder.max_rendered_pixels(px);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(summary: &ConversionSummary, queued: usize) {
    for report in summary.failures() {
        eprintln!(
            "  {} {}: {}",
            red("✗"),
            report.source.display(),
            report_message(report)
        );
    }

    let mark = if summary.cancelled {
        cyan("■")
    } else if summary.error_count == 0 {
        green("✔")
    } else if summary.converted_count == 0 {
        red("✘")
    } else {
        cyan("⚠")
    };

    eprintln!(
        "{}  {} converted, {} errors  ({} pages, {}ms)",
        mark,
        bold(&summary.converted_count.to_string()),
        summary.error_count,
        summary.total_pages(),
        summary.total_duration_ms,
    );
    if summary.cancelled {
        eprintln!(
            "   {}",
            dim(&format!(
                "cancelled after {}/{} files",
                summary.processed(),
                queued
            ))
        );
    }
}

fn report_message(report: &pdf2png::FileReport) -> String {
    match report.result {
        pdf2png::ConversionResult::Failed { ref message } => message.clone(),
        pdf2png::ConversionResult::Converted { page_count } => format!("{page_count} pages"),
    }
}

fn exit_code(summary: &ConversionSummary) -> ExitCode {
    if summary.cancelled {
        ExitCode::from(130)
    } else if summary.has_failures() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}
