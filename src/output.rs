//! Result types produced by a batch run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one attempted source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionResult {
    /// Every page was rendered and written.
    Converted { page_count: usize },
    /// Rendering or writing failed; `message` is the underlying error's text.
    Failed { message: String },
}

impl ConversionResult {
    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionResult::Converted { .. })
    }
}

/// A [`ConversionResult`] attributed to its source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// The source PDF, exactly as it appears in the queue.
    pub source: PathBuf,
    pub result: ConversionResult,
    /// PNG files written for this source, in page order. May be non-empty
    /// for a failed file if the failure happened part-way through writing.
    pub outputs: Vec<PathBuf>,
    /// Wall-clock time spent rendering and writing this file.
    pub duration_ms: u64,
}

/// Aggregate of one `convert_all` invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub converted_count: usize,
    pub error_count: usize,
    /// One entry per processed file, in queue order.
    pub results: Vec<FileReport>,
    /// `true` if the run stopped early because cancellation was requested.
    pub cancelled: bool,
    pub total_duration_ms: u64,
}

impl ConversionSummary {
    /// Fold a file's report into the counters.
    pub fn record(&mut self, report: FileReport) {
        if report.result.is_converted() {
            self.converted_count += 1;
        } else {
            self.error_count += 1;
        }
        self.results.push(report);
    }

    /// Number of files attempted in this run.
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn has_failures(&self) -> bool {
        self.error_count > 0
    }

    /// Reports of the files that failed, in queue order.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.results.iter().filter(|r| !r.result.is_converted())
    }

    /// Total pages written across all converted files.
    pub fn total_pages(&self) -> usize {
        self.results
            .iter()
            .map(|r| match r.result {
                ConversionResult::Converted { page_count } => page_count,
                ConversionResult::Failed { .. } => 0,
            })
            .sum()
    }
}
