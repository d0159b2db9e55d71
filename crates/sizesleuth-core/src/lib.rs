/// SizeSleuth Core — scanning, ranking, and data model.
///
/// This crate contains all business logic with zero UI dependencies.
/// Front ends (the bundled CLI, or anything else) drive a scan through
/// [`scanner::start_scan`] and consume [`scanner::progress::ScanEvent`]s.
///
/// # Modules
///
/// - [`config`] — Scan requests and tuning knobs.
/// - [`error`] — Validation and I/O errors surfaced to callers.
/// - [`model`] — Ranked entries, scan reports, top-K selection, size formatting.
/// - [`scanner`] — Size probing, directory and file ranking, scan orchestration.
pub mod config;
pub mod error;
pub mod model;
pub mod scanner;

pub use config::{ScanConfig, ScanRequest};
pub use error::ScanError;
pub use model::{RankedResult, ScanReport, SizedEntry};
pub use scanner::{start_scan, CancellationToken, ScanHandle};
