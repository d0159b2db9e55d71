/// Scan progress reporting — lightweight messages sent from the scan
/// thread to whatever front end is listening.
use crate::model::{RankedResult, ScanReport};
use std::fmt;
use std::time::Duration;

/// The two sequential stages of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanPhase {
    /// Sizing and ranking immediate subdirectories.
    Directories,
    /// Walking the whole tree and ranking individual files.
    Files,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directories => f.write_str("directories"),
            Self::Files => f.write_str("files"),
        }
    }
}

/// Why a phase did no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The caller asked for zero results.
    ZeroLimit,
    /// The root has no immediate subdirectories.
    NoSubdirectories,
    /// The root could not be listed.
    RootUnreadable,
    /// Cancellation was requested before the phase began.
    Cancelled,
}

/// Events emitted by the coordinator, in emission order per phase:
/// `PhaseStarted` or `PhaseSkipped`, then `PhaseFinished`, then the
/// phase's ranking. Exactly one `Finished` or `Cancelled` closes the scan.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    PhaseStarted {
        phase: ScanPhase,
        /// Immediate subdirectories discovered (directory phase only).
        subdirectories: Option<usize>,
        /// Number of results that will be returned at most.
        limit: usize,
    },
    PhaseSkipped {
        phase: ScanPhase,
        reason: SkipReason,
    },
    PhaseFinished {
        phase: ScanPhase,
        elapsed: Duration,
        entries: usize,
    },
    DirectoriesRanked(RankedResult),
    FilesRanked(RankedResult),
    /// Both phases ran to completion.
    Finished(ScanReport),
    /// The scan stopped early; the report holds partial results.
    Cancelled(ScanReport),
}

impl ScanEvent {
    /// `true` for the event that closes a scan.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_) | Self::Cancelled(_))
    }
}

/// Receiver of scan events.
///
/// The coordinator never reaches into front-end state; it only calls
/// `emit`. Any `Fn(ScanEvent)` closure is a sink.
pub trait EventSink {
    fn emit(&self, event: ScanEvent);
}

impl<F> EventSink for F
where
    F: Fn(ScanEvent),
{
    fn emit(&self, event: ScanEvent) {
        self(event)
    }
}
