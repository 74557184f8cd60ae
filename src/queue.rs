//! The ordered, duplicate-free list of source files awaiting conversion.
//!
//! Identity is the path value itself, compared with `PathBuf` equality.
//! Nothing here touches the filesystem: existence and `.pdf` filtering are
//! the caller's job.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Insertion-ordered queue of source PDF paths with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionQueue {
    entries: Vec<PathBuf>,
}

impl ConversionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append each path not already present, in input order.
    ///
    /// Returns how many paths were appended.
    pub fn add<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut added = 0;
        for path in paths {
            let path = path.into();
            if self.contains(&path) {
                debug!("Already queued: {}", path.display());
                continue;
            }
            self.entries.push(path);
            added += 1;
        }
        added
    }

    /// Remove the entries at `indices`, all resolved against the queue as it
    /// is before this call.
    ///
    /// Indices are mapped to paths first and the paths are then removed by
    /// identity, so removing several rows never shifts a later index onto the
    /// wrong entry. Out-of-range indices are skipped. Returns how many
    /// entries were removed.
    pub fn remove_indices<I>(&mut self, indices: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        let indices: BTreeSet<usize> = indices.into_iter().collect();
        let mut doomed = Vec::with_capacity(indices.len());
        for idx in indices {
            match self.entries.get(idx) {
                Some(path) => doomed.push(path.clone()),
                None => warn!(
                    "Ignoring remove of index {} (queue has {} entries)",
                    idx,
                    self.entries.len()
                ),
            }
        }
        self.remove_paths(doomed)
    }

    /// Remove entries by path. Unknown paths are ignored.
    ///
    /// Returns how many entries were removed.
    pub fn remove_paths<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let doomed: Vec<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|e| !doomed.contains(e));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.entries.iter().any(|e| e == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a ConversionQueue {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
