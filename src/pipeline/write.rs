//! Output naming and PNG persistence.
//!
//! Page `n` of `<dir>/<stem>.pdf` is written to `<dir>/<stem>_page_<n>.png`,
//! with `n` starting at 1. Writes are direct: an existing file with the same
//! name is overwritten, so converting the same source twice simply refreshes
//! its images.

use crate::error::FileError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output path for a 1-indexed page of `source`.
///
/// The PNG lands in the source's own directory. A bare file name yields a
/// bare output name, i.e. relative to the working directory, same as the
/// source.
pub fn page_output_path(source: &Path, page_number: usize) -> PathBuf {
    let mut name: OsString = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("document"));
    name.push(format!("_page_{page_number}.png"));

    match source.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Write encoded pages of `source` in page order.
///
/// Paths are appended to `written` as each file lands, so a caller still
/// knows what exists on disk when a later page fails.
pub async fn write_pages(
    source: &Path,
    pages: Vec<Vec<u8>>,
    written: &mut Vec<PathBuf>,
) -> Result<(), FileError> {
    for (idx, png) in pages.into_iter().enumerate() {
        let path = page_output_path(source, idx + 1);
        tokio::fs::write(&path, &png)
            .await
            .map_err(|e| FileError::Write {
                path: path.clone(),
                source: e,
            })?;
        debug!("Wrote {} ({} bytes)", path.display(), png.len());
        written.push(path);
    }
    Ok(())
}
