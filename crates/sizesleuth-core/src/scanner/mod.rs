/// Scanner module — orchestrates one size scan.
///
/// A scan has two phases that always run in this order:
/// - **Directories:** every immediate subdirectory of the root is sized by
///   its own [`probe`] task on a bounded worker pool ([`directories`]).
/// - **Files:** one serial walk of the whole tree feeds a bounded top-K
///   selection ([`files`]).
///
/// [`start_scan`] runs the [`coordinator`] on a dedicated thread so the
/// caller stays responsive. Progress and results come back as
/// [`progress::ScanEvent`]s over a crossbeam channel, and the caller can
/// stop the scan at any time through the returned [`ScanHandle`].
pub mod cancel;
pub mod coordinator;
pub mod directories;
pub mod files;
pub mod probe;
pub mod progress;

pub use cancel::CancellationToken;
pub use coordinator::{validate, ScanCoordinator, ScanState};
pub use directories::{list_subdirectories, DirectoryRanker};
pub use files::rank_files;
pub use probe::{SizeProbe, WalkProbe};

use crate::config::{ScanConfig, ScanRequest};
use crate::error::ScanError;
use crate::model::ScanReport;
use coordinator::SharedState;
use crossbeam_channel::Receiver;
use progress::ScanEvent;
use std::thread;

/// Maximum number of events that may queue up in the channel.
///
/// A scan emits fewer than a dozen events, so the bound is never reached
/// in practice; it only guarantees a stalled consumer cannot make the
/// queue grow without limit.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Handle to a running or completed scan. Allows cancellation and
/// receiving progress events.
pub struct ScanHandle {
    /// Receiver for events from the scan thread.
    pub events: Receiver<ScanEvent>,
    /// Flag to request cancellation.
    cancel: CancellationToken,
    /// Lifecycle state, updated by the scan thread.
    state: SharedState,
    /// Join handle for the scan thread.
    thread: Option<thread::JoinHandle<ScanReport>>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel.request_cancel();
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A clone of the scan's cancellation token, for handing to code that
    /// should be able to stop the scan without owning the handle.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> ScanState {
        *self.state.lock()
    }

    /// Block until the scan thread exits and return its report.
    ///
    /// Returns `None` if the scan thread panicked.
    pub fn join(mut self) -> Option<ScanReport> {
        self.thread.take()?.join().ok()
    }
}

/// Validate `request` and start scanning it on a background thread.
///
/// Validation failures are returned here, synchronously, and no thread or
/// worker pool is started.
pub fn start_scan(request: ScanRequest, config: ScanConfig) -> Result<ScanHandle, ScanError> {
    spawn_scan(ScanCoordinator::new(request, config)?)
}

/// Start an already-validated coordinator on a background thread.
pub fn spawn_scan<P: SizeProbe + 'static>(coordinator: ScanCoordinator<P>) -> Result<ScanHandle, ScanError> {
    let (event_tx, event_rx) = crossbeam_channel::bounded::<ScanEvent>(EVENT_CHANNEL_CAPACITY);
    let cancel = coordinator.cancellation_token();
    let state = coordinator.shared_state();

    let thread = thread::Builder::new()
        .name("sizesleuth-scanner".into())
        .spawn(move || {
            coordinator.run(&move |event: ScanEvent| {
                // The receiver may already be gone; the report is still
                // returned through `join`.
                let _ = event_tx.send(event);
            })
        })
        .map_err(|source| ScanError::SpawnFailed { source })?;

    Ok(ScanHandle {
        events: event_rx,
        cancel,
        state,
        thread: Some(thread),
    })
}
