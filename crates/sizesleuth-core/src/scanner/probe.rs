/// Subtree size probe — the leaf of the scanner.
///
/// Walks one directory tree on the calling thread with `jwalk` in serial
/// mode. The directory ranker already runs one probe per pool thread, so
/// nested parallelism would only fight it for the same threads.
///
/// Symlinks are never followed and never counted, which rules out both
/// double counting and cycles. Every per-entry failure (permission denied,
/// an entry deleted mid-walk, a dangling link) contributes zero bytes.
use super::cancel::CancellationToken;
use jwalk::{Parallelism, WalkDir};
use std::path::Path;
use tracing::trace;

/// Something that can total up the bytes under a directory.
///
/// The production implementation is [`WalkProbe`]; the seam exists so the
/// ranker's failure handling can be exercised with a probe that misbehaves.
pub trait SizeProbe: Send + Sync {
    /// Total size in bytes of the regular files under `path`.
    ///
    /// If `cancel` is set mid-walk the partial sum gathered so far is
    /// returned. That value is not authoritative.
    fn measure(&self, path: &Path, cancel: &CancellationToken) -> u64;
}

/// Filesystem-walking [`SizeProbe`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkProbe;

impl SizeProbe for WalkProbe {
    fn measure(&self, path: &Path, cancel: &CancellationToken) -> u64 {
        measure(path, cancel)
    }
}

/// Sum the sizes of all regular files under `path`.
///
/// A root that cannot be opened yields 0.
pub fn measure(path: &Path, cancel: &CancellationToken) -> u64 {
    let walker = WalkDir::new(path)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(Parallelism::Serial);

    let mut total: u64 = 0;
    for entry_result in walker {
        // Checked per entry, which covers every directory boundary and
        // every file within a directory.
        if cancel.is_cancelled() {
            trace!(path = %path.display(), partial = total, "probe cancelled");
            return total;
        }

        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                trace!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        // Directories carry no bytes of their own; symlinks and special
        // files are not counted.
        if !entry.file_type().is_file() {
            continue;
        }

        match std::fs::symlink_metadata(entry.path()) {
            Ok(meta) => total = total.saturating_add(meta.len()),
            Err(err) => {
                trace!(path = %entry.path().display(), error = %err, "skipping file without metadata");
            }
        }
    }
    total
}
