/// Command-line arguments.
use clap::{Parser, ValueEnum};
use sizesleuth_core::config::DEFAULT_POLL_INTERVAL;
use sizesleuth_core::{ScanConfig, ScanRequest};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "sizesleuth",
    version,
    about = "Find the largest folders and files under a directory",
    long_about = "SizeSleuth sizes every immediate subdirectory of PATH in parallel and \
                  lists the largest ones, then walks the whole tree and lists the \
                  largest individual files."
)]
pub struct Cli {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Number of largest subdirectories to list (negative counts as 0)
    #[arg(short = 'd', long = "dirs", default_value_t = 10, allow_negative_numbers = true)]
    pub dirs: i64,

    /// Number of largest files to list (negative counts as 0)
    #[arg(short = 'f', long = "files", default_value_t = 10, allow_negative_numbers = true)]
    pub files: i64,

    /// Threads used to size subdirectories [default: min(32, 5 × CPUs)]
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Milliseconds between cancellation checks while sizing subdirectories
    #[arg(long = "poll-ms", default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    pub poll_ms: u64,

    /// Stop after this many seconds and print whatever was found so far
    #[arg(long, value_name = "SECS", value_parser = parse_secs)]
    pub timeout: Option<Duration>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Progress transcript followed by the rankings
    #[default]
    Text,
    /// The final report as JSON on stdout
    Json,
}

impl Cli {
    pub fn scan_request(&self) -> ScanRequest {
        ScanRequest::from_signed(&self.path, self.dirs, self.files)
    }

    pub fn scan_config(&self) -> ScanConfig {
        let config = ScanConfig::default().with_poll_interval(Duration::from_millis(self.poll_ms));
        match self.workers {
            Some(n) => config.with_workers(n),
            None => config,
        }
    }
}

fn parse_secs(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("invalid number of seconds: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid timeout: {e}"))
}
