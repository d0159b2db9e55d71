/// Data model for scan results.
///
/// Re-exports the ranked entry types, the per-scan report, and the
/// formatting helpers shared by every front end.
pub mod entry;
pub mod report;
pub mod size;
pub mod top_k;

pub use entry::{sort_ranked, ByRank, RankedResult, SizedEntry};
pub use report::ScanReport;
pub use size::{format_count, format_size};
pub use top_k::TopK;
