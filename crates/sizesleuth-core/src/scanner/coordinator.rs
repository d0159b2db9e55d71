/// Scan coordinator — runs one scan from validated request to final report.
///
/// ```text
/// Idle ──► DirectoryPhase ──► FilePhase ──► Complete
///               │                 │
///               └──► Cancelled ◄──┘
/// ```
///
/// Directories are ranked first: they are the more expensive phase and
/// the one users usually look at first. The file phase always follows,
/// even when the directory phase found nothing, unless cancellation was
/// observed, in which case the scan ends with the directory results it has
/// and an empty file ranking.
use super::cancel::CancellationToken;
use super::directories::{list_subdirectories, DirectoryRanker};
use super::files::rank_files;
use super::probe::{SizeProbe, WalkProbe};
use super::progress::{EventSink, ScanEvent, ScanPhase, SkipReason};
use crate::config::{ScanConfig, ScanRequest};
use crate::error::ScanError;
use crate::model::{RankedResult, ScanReport};
use chrono::Local;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Where a scan is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    DirectoryPhase,
    FilePhase,
    Complete,
    Cancelled,
}

impl ScanState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }
}

/// State cell shared between the scan thread and its handle.
pub type SharedState = Arc<Mutex<ScanState>>;

/// Check a request before any work is started.
///
/// Rejects an empty path, a path that does not exist, a path that is not a
/// directory, and a directory that cannot be listed.
pub fn validate(request: &ScanRequest) -> Result<(), ScanError> {
    let root = &request.root;
    if root.as_os_str().is_empty() {
        return Err(ScanError::EmptyPath);
    }
    let meta = std::fs::metadata(root).map_err(|e| ScanError::io(root, e))?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory { path: root.clone() });
    }
    std::fs::read_dir(root).map_err(|e| ScanError::io(root, e))?;
    Ok(())
}

/// Drives one scan. Consumed by [`ScanCoordinator::run`], so a coordinator
/// (and its cancellation token) can never be reused for a second scan.
pub struct ScanCoordinator<P: SizeProbe = WalkProbe> {
    request: ScanRequest,
    directories: DirectoryRanker<P>,
    cancel: CancellationToken,
    state: SharedState,
}

impl ScanCoordinator<WalkProbe> {
    /// Validate `request` and prepare a scan with a fresh cancellation token.
    pub fn new(request: ScanRequest, config: ScanConfig) -> Result<Self, ScanError> {
        Self::with_ranker(request, DirectoryRanker::new(config))
    }
}

impl<P: SizeProbe + 'static> ScanCoordinator<P> {
    pub fn with_ranker(request: ScanRequest, directories: DirectoryRanker<P>) -> Result<Self, ScanError> {
        validate(&request)?;
        Ok(Self {
            request,
            directories,
            cancel: CancellationToken::new(),
            state: Arc::new(Mutex::new(ScanState::Idle)),
        })
    }

    pub fn request(&self) -> &ScanRequest {
        &self.request
    }

    /// A handle onto this scan's cancellation flag.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> ScanState {
        *self.state.lock()
    }

    pub(crate) fn shared_state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Run both phases on the calling thread, reporting to `sink`, and
    /// return the final report. The same report is also emitted as the
    /// terminal event.
    pub fn run(self, sink: &dyn EventSink) -> ScanReport {
        let started_at = Local::now();
        let total_start = Instant::now();
        info!(
            root = %self.request.root.display(),
            directory_limit = self.request.directory_limit,
            file_limit = self.request.file_limit,
            "Starting scan"
        );

        self.set_state(ScanState::DirectoryPhase);
        let phase_start = Instant::now();
        let directories = self.run_directory_phase(sink);
        let directory_phase_elapsed = phase_start.elapsed();
        self.finish_phase(sink, ScanPhase::Directories, directory_phase_elapsed, &directories);
        sink.emit(ScanEvent::DirectoriesRanked(directories.clone()));

        if self.cancel.is_cancelled() {
            return self.finish(
                sink,
                ScanReport {
                    root: self.request.root.clone(),
                    started_at,
                    directories,
                    files: Vec::new(),
                    directory_phase_elapsed,
                    file_phase_elapsed: Duration::ZERO,
                    total_elapsed: total_start.elapsed(),
                    cancelled: true,
                },
            );
        }

        self.set_state(ScanState::FilePhase);
        let phase_start = Instant::now();
        let files = self.run_file_phase(sink);
        let file_phase_elapsed = phase_start.elapsed();
        self.finish_phase(sink, ScanPhase::Files, file_phase_elapsed, &files);
        sink.emit(ScanEvent::FilesRanked(files.clone()));

        let report = ScanReport {
            root: self.request.root.clone(),
            started_at,
            directories,
            files,
            directory_phase_elapsed,
            file_phase_elapsed,
            total_elapsed: total_start.elapsed(),
            cancelled: self.cancel.is_cancelled(),
        };
        self.finish(sink, report)
    }

    fn run_directory_phase(&self, sink: &dyn EventSink) -> RankedResult {
        let phase = ScanPhase::Directories;
        let limit = self.request.directory_limit;

        if self.cancel.is_cancelled() {
            sink.emit(ScanEvent::PhaseSkipped { phase, reason: SkipReason::Cancelled });
            return Vec::new();
        }
        if limit == 0 {
            sink.emit(ScanEvent::PhaseSkipped { phase, reason: SkipReason::ZeroLimit });
            return Vec::new();
        }

        let subdirs = match list_subdirectories(&self.request.root) {
            Ok(s) => s,
            Err(err) => {
                debug!(error = %err, "Root became unreadable after validation");
                sink.emit(ScanEvent::PhaseSkipped { phase, reason: SkipReason::RootUnreadable });
                return Vec::new();
            }
        };
        if subdirs.is_empty() {
            sink.emit(ScanEvent::PhaseSkipped { phase, reason: SkipReason::NoSubdirectories });
            return Vec::new();
        }

        sink.emit(ScanEvent::PhaseStarted {
            phase,
            subdirectories: Some(subdirs.len()),
            limit: limit.min(subdirs.len()),
        });
        self.directories.rank_subdirectories(subdirs, limit, &self.cancel)
    }

    fn run_file_phase(&self, sink: &dyn EventSink) -> RankedResult {
        let phase = ScanPhase::Files;
        let limit = self.request.file_limit;

        if limit == 0 {
            sink.emit(ScanEvent::PhaseSkipped { phase, reason: SkipReason::ZeroLimit });
            return Vec::new();
        }

        sink.emit(ScanEvent::PhaseStarted {
            phase,
            subdirectories: None,
            limit,
        });
        rank_files(&self.request.root, limit, &self.cancel)
    }

    fn finish_phase(&self, sink: &dyn EventSink, phase: ScanPhase, elapsed: Duration, ranked: &RankedResult) {
        debug!(%phase, entries = ranked.len(), elapsed_secs = elapsed.as_secs_f64(), "Phase finished");
        sink.emit(ScanEvent::PhaseFinished {
            phase,
            elapsed,
            entries: ranked.len(),
        });
    }

    fn finish(&self, sink: &dyn EventSink, report: ScanReport) -> ScanReport {
        if report.cancelled {
            self.set_state(ScanState::Cancelled);
            info!(elapsed_secs = report.total_elapsed.as_secs_f64(), "Scan cancelled");
            sink.emit(ScanEvent::Cancelled(report.clone()));
        } else {
            self.set_state(ScanState::Complete);
            info!(
                directories = report.directories.len(),
                files = report.files.len(),
                elapsed_secs = report.total_elapsed.as_secs_f64(),
                "Scan complete"
            );
            sink.emit(ScanEvent::Finished(report.clone()));
        }
        report
    }

    fn set_state(&self, next: ScanState) {
        *self.state.lock() = next;
    }
}
