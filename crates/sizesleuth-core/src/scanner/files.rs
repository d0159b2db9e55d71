/// File ranker — one serial walk of the whole tree, keeping only the
/// largest M files seen so far.
///
/// The walk is single-threaded on purpose: per-file `stat` calls are cheap
/// next to directory reads, and a serial walk keeps the cancellation check
/// exact at every directory boundary. Selection goes through a bounded
/// [`TopK`] heap, so memory stays O(M) no matter how many files the tree
/// holds.
use super::cancel::CancellationToken;
use crate::model::{ByRank, RankedResult, SizedEntry, TopK};
use jwalk::{Parallelism, WalkDir};
use std::path::Path;
use tracing::{debug, trace};

/// Return the `limit` largest regular files anywhere under `root`,
/// descending by size with ties in ascending path order.
///
/// `limit == 0` returns at once without touching the filesystem. On
/// cancellation the files seen so far are ranked and returned.
pub fn rank_files(root: &Path, limit: usize, cancel: &CancellationToken) -> RankedResult {
    if limit == 0 {
        return Vec::new();
    }

    let walker = WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(Parallelism::Serial);

    let mut top: TopK<ByRank> = TopK::new(limit);
    let mut files_seen: u64 = 0;

    for entry_result in walker {
        if cancel.is_cancelled() {
            debug!(files_seen, "File walk cancelled; ranking partial results");
            break;
        }

        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                trace!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        match std::fs::symlink_metadata(&path) {
            Ok(meta) => {
                files_seen += 1;
                top.push(ByRank(SizedEntry::new(path, meta.len())));
            }
            Err(err) => {
                trace!(path = %path.display(), error = %err, "skipping file without metadata");
            }
        }
    }

    debug!(files_seen, kept = top.len(), "File walk complete");
    top.into_sorted_vec().into_iter().map(|ranked| ranked.0).collect()
}
