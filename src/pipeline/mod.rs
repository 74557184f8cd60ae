//! Per-file conversion stages.
//!
//! ## Data Flow
//!
//! ```text
//! engine ──▶ render ──▶ encode ──▶ write
//! (bind)     (pdfium)   (PNG)      (<stem>_page_<n>.png)
//! ```
//!
//! 1. [`engine`] — locate and bind the pdfium shared library
//! 2. [`render`] — rasterise every page; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`] — PNG-encode each `DynamicImage` in memory
//! 4. [`write`]  — name and write the PNGs beside the source PDF

pub mod encode;
pub mod engine;
pub mod render;
pub mod write;
