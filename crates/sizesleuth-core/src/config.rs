/// Scan requests and scanner tuning.
///
/// A [`ScanRequest`] says *what* to scan; a [`ScanConfig`] says *how hard*.
/// Both are plain values: the coordinator takes ownership when a scan
/// starts, so neither can change underneath a running scan.
use std::path::PathBuf;
use std::time::Duration;

/// Number of entries returned per ranking when the caller does not say.
pub const DEFAULT_RESULT_LIMIT: usize = 10;

/// How long the directory phase waits for a probe result before it looks
/// at the cancellation flag again.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Probe threads started per logical CPU. Subdirectory sizing is I/O bound,
/// so the pool is deliberately wider than the CPU count.
pub const WORKERS_PER_CPU: usize = 5;

/// Upper bound on the default probe pool size.
pub const MAX_DEFAULT_WORKERS: usize = 32;

/// One user-initiated scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Directory to scan.
    pub root: PathBuf,
    /// How many of the largest immediate subdirectories to return.
    pub directory_limit: usize,
    /// How many of the largest files (anywhere below the root) to return.
    pub file_limit: usize,
}

impl ScanRequest {
    /// Request with both limits at [`DEFAULT_RESULT_LIMIT`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            directory_limit: DEFAULT_RESULT_LIMIT,
            file_limit: DEFAULT_RESULT_LIMIT,
        }
    }

    /// Build a request from signed user input, clamping negative limits to 0.
    pub fn from_signed(root: impl Into<PathBuf>, directory_limit: i64, file_limit: i64) -> Self {
        Self {
            root: root.into(),
            directory_limit: clamp_limit(directory_limit),
            file_limit: clamp_limit(file_limit),
        }
    }

    pub fn with_directory_limit(mut self, limit: usize) -> Self {
        self.directory_limit = limit;
        self
    }

    pub fn with_file_limit(mut self, limit: usize) -> Self {
        self.file_limit = limit;
        self
    }
}

fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit.max(0)).unwrap_or(usize::MAX)
}

/// Scanner tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Probe pool size. `None` picks [`default_worker_count`].
    pub workers: Option<usize>,
    /// Upper bound on how long the directory phase blocks between
    /// cancellation checks.
    pub poll_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ScanConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Effective pool size. Never zero.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count).max(1)
    }

    /// Poll interval with a floor of one millisecond, so a zero interval
    /// cannot turn the drain loop into a busy spin.
    pub fn effective_poll_interval(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }
}

/// `min(32, 5 × logical CPUs)`.
pub fn default_worker_count() -> usize {
    (num_cpus::get().max(1) * WORKERS_PER_CPU).min(MAX_DEFAULT_WORKERS)
}
