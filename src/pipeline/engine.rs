//! Locating and binding the pdfium shared library.
//!
//! pdfium is a native library loaded at runtime, so a missing or broken copy
//! is an ordinary, per-file [`RenderError::EngineUnavailable`] rather than a
//! startup crash. Candidates are tried in order, first match wins:
//!
//! 1. an explicit path from [`crate::ConversionConfig::pdfium_library_path`]
//! 2. `PDFIUM_LIB_PATH`
//! 3. the platform library name in the working directory
//! 4. the platform library name next to the executable
//! 5. the system library search path

use crate::error::RenderError;
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an existing pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium, trying each candidate location before falling back to the
/// system library.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, RenderError> {
    let env_path = std::env::var_os(PDFIUM_LIB_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    let mut attempts = Vec::new();
    for candidate in candidate_paths(explicit, env_path, exe_dir) {
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => attempts.push(format!("{}: {}", candidate.display(), e)),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound pdfium from the system library path");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            attempts.push(format!("system library: {e}"));
            Err(RenderError::EngineUnavailable(attempts.join("; ")))
        }
    }
}

/// Ordered library file candidates, excluding the system search path.
fn candidate_paths(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    exe_dir: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(4);
    if let Some(p) = explicit {
        candidates.push(p.to_path_buf());
    }
    if let Some(p) = env_path {
        candidates.push(p);
    }
    candidates.push(PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(
        "./",
    )));
    if let Some(dir) = exe_dir {
        candidates.push(PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(
            &dir,
        )));
    }
    candidates.dedup();
    candidates
}
