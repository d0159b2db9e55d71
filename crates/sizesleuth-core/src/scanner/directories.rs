/// Directory ranker — sizes every immediate subdirectory of the root in
/// parallel and keeps the largest N.
///
/// # Work distribution
///
/// One probe task per subdirectory is spawned onto a dedicated, bounded
/// rayon pool. Each task reports `(slot, size)` over a crossbeam channel,
/// where `slot` is the subdirectory's position in the submission list, so
/// the driver owns the only accumulator and no locking is needed.
///
/// # Cancellation
///
/// The driver never blocks on the channel for longer than the configured
/// poll interval, so a cancellation request is noticed within one interval
/// even while every worker is deep inside a large subtree. Once cancelled,
/// tasks that have not started yet return without probing and in-flight
/// probes bail out at their next entry. Whatever was already reported is
/// ranked and returned. Workers still unwinding after that are not waited
/// for; their late results are dropped with the channel.
use super::cancel::CancellationToken;
use super::probe::{SizeProbe, WalkProbe};
use crate::config::ScanConfig;
use crate::model::{sort_ranked, RankedResult, SizedEntry};
use crossbeam_channel::RecvTimeoutError;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// List the immediate subdirectories of `root`, excluding symlinks, in
/// ascending path order.
///
/// Entries whose type cannot be read are skipped.
pub fn list_subdirectories(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let Ok(entry) = entry else { continue };
        // `DirEntry::file_type` does not follow links, so a symlink to a
        // directory reports as a symlink and is left out here.
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => subdirs.push(entry.path()),
            _ => {}
        }
    }
    subdirs.sort();
    Ok(subdirs)
}

/// Ranks immediate subdirectories by total size.
pub struct DirectoryRanker<P: SizeProbe = WalkProbe> {
    config: ScanConfig,
    probe: Arc<P>,
}

impl DirectoryRanker<WalkProbe> {
    pub fn new(config: ScanConfig) -> Self {
        Self::with_probe(config, WalkProbe)
    }
}

impl<P: SizeProbe + 'static> DirectoryRanker<P> {
    pub fn with_probe(config: ScanConfig, probe: P) -> Self {
        Self {
            config,
            probe: Arc::new(probe),
        }
    }

    /// Return the `limit` largest immediate subdirectories of `root`.
    ///
    /// `limit == 0` returns at once without listing anything. An unlistable
    /// root yields an empty result.
    pub fn rank(&self, root: &Path, limit: usize, cancel: &CancellationToken) -> RankedResult {
        if limit == 0 {
            return Vec::new();
        }
        match list_subdirectories(root) {
            Ok(subdirs) => self.rank_subdirectories(subdirs, limit, cancel),
            Err(err) => {
                debug!(root = %root.display(), error = %err, "cannot list root");
                Vec::new()
            }
        }
    }

    /// Size an already-listed set of subdirectories and return the `limit`
    /// largest.
    ///
    /// No pool is built when `limit` is 0 or `subdirs` is empty.
    pub fn rank_subdirectories(
        &self,
        subdirs: Vec<PathBuf>,
        limit: usize,
        cancel: &CancellationToken,
    ) -> RankedResult {
        if limit == 0 || subdirs.is_empty() {
            return Vec::new();
        }

        // No point in starting more threads than there are tasks.
        let workers = self.config.worker_count().min(subdirs.len());
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("sizesleuth-probe-{idx}"))
            .build()
        {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to build probe pool; sizing subdirectories sequentially");
                let sizes = self.probe_sequentially(&subdirs, cancel);
                return collect_ranked(subdirs, sizes, limit);
            }
        };
        debug!(
            subdirectories = subdirs.len(),
            workers, "Dispatching subdirectory probes"
        );

        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, u64)>();
        for (slot, path) in subdirs.iter().enumerate() {
            let result_tx = result_tx.clone();
            let cancel = cancel.clone();
            let probe = Arc::clone(&self.probe);
            let path = path.clone();
            pool.spawn(move || {
                if cancel.is_cancelled() {
                    return;
                }
                let size = run_probe(probe.as_ref(), &path, &cancel);
                // A probe cut short by cancellation holds a partial sum;
                // it is not reported.
                if cancel.is_cancelled() {
                    return;
                }
                let _ = result_tx.send((slot, size));
            });
        }
        // Only the tasks hold senders now, so the channel disconnects once
        // every task has finished or been skipped.
        drop(result_tx);

        let mut sizes: Vec<Option<u64>> = vec![None; subdirs.len()];
        let mut outstanding = subdirs.len();
        let poll_interval = self.config.effective_poll_interval();

        while outstanding > 0 {
            if cancel.is_cancelled() {
                debug!(outstanding, "Cancellation observed; abandoning outstanding probes");
                break;
            }
            match result_rx.recv_timeout(poll_interval) {
                Ok((slot, size)) => {
                    if sizes[slot].replace(size).is_none() {
                        outstanding -= 1;
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // Results that were already queued when the loop stopped are
        // complete measurements; keep them.
        for (slot, size) in result_rx.try_iter() {
            sizes[slot].get_or_insert(size);
        }

        // Dropping the pool does not wait for running probes.
        drop(pool);
        collect_ranked(subdirs, sizes, limit)
    }

    fn probe_sequentially(&self, subdirs: &[PathBuf], cancel: &CancellationToken) -> Vec<Option<u64>> {
        let mut sizes = vec![None; subdirs.len()];
        for (slot, path) in subdirs.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            let size = run_probe(self.probe.as_ref(), path, cancel);
            if cancel.is_cancelled() {
                break;
            }
            sizes[slot] = Some(size);
        }
        sizes
    }
}

/// Run one probe, turning a panic into a zero-byte result.
fn run_probe<P: SizeProbe + ?Sized>(probe: &P, path: &Path, cancel: &CancellationToken) -> u64 {
    match panic::catch_unwind(AssertUnwindSafe(|| probe.measure(path, cancel))) {
        Ok(size) => size,
        Err(_) => {
            warn!(path = %path.display(), "Size probe failed; counting subdirectory as 0 bytes");
            0
        }
    }
}

/// Pair reported sizes with their paths and rank them. Subdirectories that
/// never reported are left out.
fn collect_ranked(subdirs: Vec<PathBuf>, sizes: Vec<Option<u64>>, limit: usize) -> RankedResult {
    let mut ranked: RankedResult = subdirs
        .into_iter()
        .zip(sizes)
        .filter_map(|(path, size)| size.map(|size| SizedEntry::new(path, size)))
        .collect();
    sort_ranked(&mut ranked, limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_bytes(path: &Path, n: usize) {
        fs::write(path, vec![0u8; n]).unwrap();
    }

    fn fast_config() -> ScanConfig {
        ScanConfig::default()
            .with_workers(4)
            .with_poll_interval(Duration::from_millis(20))
    }

    /// Counts calls so tests can prove no probe ran.
    #[derive(Default)]
    struct CountingProbe {
        calls: AtomicUsize,
    }

    impl SizeProbe for CountingProbe {
        fn measure(&self, path: &Path, cancel: &CancellationToken) -> u64 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            crate::scanner::probe::measure(path, cancel)
        }
    }

    /// Panics for any directory named `bad`.
    struct FlakyProbe;

    impl SizeProbe for FlakyProbe {
        fn measure(&self, path: &Path, cancel: &CancellationToken) -> u64 {
            if path.file_name().is_some_and(|n| n == "bad") {
                panic!("probe exploded");
            }
            crate::scanner::probe::measure(path, cancel)
        }
    }

    #[test]
    fn test_list_subdirectories_sorted_dirs_only() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("zeta")).unwrap();
        fs::create_dir(tmp.path().join("alpha")).unwrap();
        write_bytes(&tmp.path().join("file.bin"), 10);

        let subdirs = list_subdirectories(tmp.path()).unwrap();
        let names: Vec<_> = subdirs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let tmp = TempDir::new().unwrap();
        for (name, size) in [("small", 10), ("large", 3_000), ("medium", 500)] {
            let dir = tmp.path().join(name);
            fs::create_dir(&dir).unwrap();
            write_bytes(&dir.join("data.bin"), size);
        }

        let ranker = DirectoryRanker::new(fast_config());
        let ranked = ranker.rank(tmp.path(), 2, &CancellationToken::new());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], SizedEntry::new(tmp.path().join("large"), 3_000));
        assert_eq!(ranked[1], SizedEntry::new(tmp.path().join("medium"), 500));
    }

    #[test]
    fn test_rank_ties_in_path_order() {
        let tmp = TempDir::new().unwrap();
        for name in ["b", "c", "a"] {
            let dir = tmp.path().join(name);
            fs::create_dir(&dir).unwrap();
            write_bytes(&dir.join("f"), 64);
        }
        let ranked = DirectoryRanker::new(fast_config()).rank(tmp.path(), 10, &CancellationToken::new());
        let names: Vec<_> = ranked
            .iter()
            .map(|e| e.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_zero_limit_runs_no_probes() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let ranker = DirectoryRanker::with_probe(fast_config(), CountingProbe::default());

        assert!(ranker.rank(tmp.path(), 0, &CancellationToken::new()).is_empty());
        assert_eq!(ranker.probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_limit_does_not_list_root() {
        // A root that does not exist would fail to list; with limit 0 it
        // is never touched, so the result is simply empty.
        let ranker = DirectoryRanker::new(fast_config());
        let missing = Path::new("/definitely/not/a/real/path");
        assert!(ranker.rank(missing, 0, &CancellationToken::new()).is_empty());
    }

    #[test]
    fn test_unlistable_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let ranker = DirectoryRanker::new(fast_config());
        let ranked = ranker.rank(&tmp.path().join("missing"), 5, &CancellationToken::new());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_panicking_probe_counts_as_zero() {
        let tmp = TempDir::new().unwrap();
        for (name, size) in [("good", 100), ("bad", 900)] {
            let dir = tmp.path().join(name);
            fs::create_dir(&dir).unwrap();
            write_bytes(&dir.join("f"), size);
        }

        let ranker = DirectoryRanker::with_probe(fast_config(), FlakyProbe);
        let ranked = ranker.rank(tmp.path(), 10, &CancellationToken::new());
        assert_eq!(
            ranked,
            vec![
                SizedEntry::new(tmp.path().join("good"), 100),
                SizedEntry::new(tmp.path().join("bad"), 0),
            ]
        );
    }

    #[test]
    fn test_pre_cancelled_runs_no_probes() {
        let tmp = TempDir::new().unwrap();
        for name in ["a", "b", "c"] {
            fs::create_dir(tmp.path().join(name)).unwrap();
        }
        let cancel = CancellationToken::new();
        cancel.request_cancel();

        let ranker = DirectoryRanker::with_probe(fast_config(), CountingProbe::default());
        let ranked = ranker.rank(tmp.path(), 10, &cancel);
        assert!(ranked.is_empty());
        assert_eq!(ranker.probe.calls.load(Ordering::SeqCst), 0);
    }
}
