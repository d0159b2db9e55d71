/// Session state management.
///
/// Centralises all mutable state the front end reads and writes. The scan
/// thread communicates via its event channel; state updates happen in
/// `process_scan_messages()`, which the driver loop calls once per tick.
use crate::render::Transcript;
use sizesleuth_core::scanner::progress::ScanEvent;
use sizesleuth_core::scanner::ScanHandle;
use sizesleuth_core::{ScanConfig, ScanError, ScanReport, ScanRequest};

/// The current phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No scan in progress, possibly holding previous results.
    Idle,
    /// A scan is running.
    Scanning,
    /// The scan ended; `report` holds the outcome.
    Results,
}

/// Maximum number of scan events drained per tick.
///
/// A scan emits only a handful of events, but the cap keeps one tick's
/// work bounded however far behind the driver falls.
const MAX_MESSAGES_PER_TICK: usize = 64;

/// All session state.
pub struct SessionState {
    pub phase: SessionPhase,
    pub scan_handle: Option<ScanHandle>,
    pub transcript: Transcript,
    /// The final report, set once the scan ends.
    pub report: Option<ScanReport>,
    /// Immediate subdirectories discovered by the directory phase.
    pub subdirectories_found: Option<usize>,
    /// True once the user (or a deadline) asked the scan to stop.
    pub cancel_requested: bool,
    /// True if the most recent scan ended cancelled (partial results).
    pub scan_was_cancelled: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            scan_handle: None,
            transcript: Transcript::default(),
            report: None,
            subdirectories_found: None,
            cancel_requested: false,
            scan_was_cancelled: false,
        }
    }

    /// Start a scan, replacing any previous results.
    ///
    /// A request that fails validation leaves the session `Idle` and no
    /// scan thread is started.
    pub fn start_scan(&mut self, request: ScanRequest, config: ScanConfig) -> Result<(), ScanError> {
        // A new scan always starts from a clean slate.
        self.cancel_scan();
        self.phase = SessionPhase::Idle;
        self.scan_handle = None;
        self.transcript = Transcript::new(&request.root);
        self.report = None;
        self.subdirectories_found = None;
        self.cancel_requested = false;
        self.scan_was_cancelled = false;

        let handle = sizesleuth_core::start_scan(request, config)?;
        self.scan_handle = Some(handle);
        self.phase = SessionPhase::Scanning;
        Ok(())
    }

    /// Ask the running scan to stop. Repeated calls are no-ops.
    pub fn cancel_scan(&mut self) {
        if self.phase != SessionPhase::Scanning || self.cancel_requested {
            return;
        }
        if let Some(ref handle) = self.scan_handle {
            handle.cancel();
            self.cancel_requested = true;
            self.transcript.push("");
            self.transcript
                .push("Cancellation requested, stopping soon...");
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.phase == SessionPhase::Scanning
    }

    /// Process pending scan events. Called once per tick.
    ///
    /// Returns `true` if anything changed.
    pub fn process_scan_messages(&mut self) -> bool {
        let handle = match &self.scan_handle {
            Some(h) => h,
            None => return false,
        };

        let mut changed = false;
        let mut disconnected = false;
        let mut drained = Vec::new();
        while drained.len() < MAX_MESSAGES_PER_TICK {
            match handle.events.try_recv() {
                Ok(event) => drained.push(event),
                Err(crossbeam_channel::TryRecvError::Empty) => break,
                Err(crossbeam_channel::TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        for event in drained {
            changed = true;
            self.transcript.apply(&event);
            match event {
                ScanEvent::PhaseStarted {
                    subdirectories: Some(found),
                    ..
                } => {
                    self.subdirectories_found = Some(found);
                }
                ScanEvent::Finished(report) => {
                    self.finish(report, false);
                }
                ScanEvent::Cancelled(report) => {
                    self.finish(report, true);
                }
                _ => {}
            }
        }

        // The scan thread went away without a terminal event.
        if disconnected && self.phase == SessionPhase::Scanning {
            tracing::error!("Scan thread exited without a final report");
            self.transcript.push("");
            self.transcript.push("Scan stopped unexpectedly.");
            self.phase = SessionPhase::Results;
            self.scan_handle = None;
            changed = true;
        }

        changed
    }

    fn finish(&mut self, report: ScanReport, cancelled: bool) {
        self.scan_was_cancelled = cancelled;
        self.report = Some(report);
        self.phase = SessionPhase::Results;
        // Events after the terminal one are impossible; dropping the handle
        // detaches the (already finishing) scan thread.
        self.scan_handle = None;
    }
}
