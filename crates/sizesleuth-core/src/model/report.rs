/// The final product of one scan.
use super::entry::RankedResult;
use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

/// Rankings and timings for a completed or cancelled scan.
///
/// A cancelled report is still a valid answer; it just covers less of
/// the tree. `cancelled` tells the consumer which one it is holding.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    /// When the scan started (wall clock).
    pub started_at: DateTime<Local>,
    pub directories: RankedResult,
    pub files: RankedResult,
    #[serde(serialize_with = "as_secs")]
    pub directory_phase_elapsed: Duration,
    #[serde(serialize_with = "as_secs")]
    pub file_phase_elapsed: Duration,
    #[serde(serialize_with = "as_secs")]
    pub total_elapsed: Duration,
    pub cancelled: bool,
}

impl ScanReport {
    /// `true` when neither ranking found anything.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
