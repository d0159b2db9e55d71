/// Turns scan events into the text the user reads.
///
/// The wording follows the classic transcript of the tool: a "Working"
/// line when a phase starts, a "Finished ... in X.XXs" line when it ends,
/// then the ranking as `- <path>: <size>` lines.
use sizesleuth_core::model::{format_count, format_size, RankedResult, ScanReport};
use sizesleuth_core::scanner::progress::{ScanEvent, ScanPhase, SkipReason};
use std::path::PathBuf;
use std::time::Duration;

/// Accumulated output lines for one scan.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    root: PathBuf,
    lines: Vec<String>,
    directories_started: bool,
    files_started: bool,
}

impl Transcript {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append the lines for one event.
    pub fn apply(&mut self, event: &ScanEvent) {
        match event {
            ScanEvent::PhaseStarted {
                phase: ScanPhase::Directories,
                subdirectories,
                limit,
            } => {
                self.directories_started = true;
                let found = subdirectories.unwrap_or_default() as u64;
                self.push(format!(
                    "Working: scanning {} subdirectories (returning top {limit})...",
                    format_count(found)
                ));
            }
            ScanEvent::PhaseStarted {
                phase: ScanPhase::Files,
                limit,
                ..
            } => {
                self.files_started = true;
                self.push("");
                self.push(format!(
                    "Working: scanning files recursively (returning top {limit})..."
                ));
            }
            ScanEvent::PhaseSkipped { phase, reason } => self.apply_skip(*phase, *reason),
            ScanEvent::PhaseFinished { phase, elapsed, .. } => {
                let (started, noun) = match phase {
                    ScanPhase::Directories => (self.directories_started, "folders"),
                    ScanPhase::Files => (self.files_started, "files"),
                };
                if started {
                    self.push(format!("Finished scanning {noun} in {}.", secs(*elapsed)));
                }
            }
            ScanEvent::DirectoriesRanked(ranked) => {
                self.push("");
                if ranked.is_empty() {
                    self.push("No subdirectories found or an error occurred.");
                } else {
                    self.push(format!(
                        "Top {} largest subdirectories in '{}':",
                        ranked.len(),
                        self.root.display()
                    ));
                    self.push_entries(ranked);
                }
            }
            ScanEvent::FilesRanked(ranked) => {
                self.push("");
                if ranked.is_empty() {
                    self.push("No files found or an error occurred.");
                } else {
                    self.push(format!(
                        "Top {} largest files in '{}':",
                        ranked.len(),
                        self.root.display()
                    ));
                    self.push_entries(ranked);
                }
            }
            ScanEvent::Finished(report) => {
                self.push("");
                self.push(format!("Total elapsed time: {}", secs(report.total_elapsed)));
            }
            ScanEvent::Cancelled(report) => {
                self.push("");
                self.push("Scan cancelled; results above are partial.");
                self.push(format!("Total elapsed time: {}", secs(report.total_elapsed)));
            }
        }
    }

    fn apply_skip(&mut self, phase: ScanPhase, reason: SkipReason) {
        match (phase, reason) {
            (ScanPhase::Directories, SkipReason::Cancelled) => {
                self.push("Scan cancelled before starting folder scan.");
            }
            (ScanPhase::Directories, SkipReason::RootUnreadable) => {
                self.push(format!("Error accessing path: '{}'", self.root.display()));
            }
            (ScanPhase::Directories, _) => {
                self.push("No immediate subdirectories found or requested 0.");
            }
            // The file phase is only ever skipped for a zero limit.
            (ScanPhase::Files, _) => {
                self.push("");
                self.push("Skipping file scan (requested 0).");
            }
        }
    }

    fn push_entries(&mut self, ranked: &RankedResult) {
        for entry in ranked {
            self.lines
                .push(format!("- {}: {}", entry.path.display(), format_size(entry.size)));
        }
    }
}

/// Seconds with two decimals, e.g. `1.25s`.
pub fn secs(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

/// Pretty-printed JSON for a finished report.
pub fn render_json(report: &ScanReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
