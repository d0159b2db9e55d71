//! SizeSleuth — find the largest folders and files under a directory.
//!
//! Thin binary entry point. All logic lives in the `sizesleuth-core`
//! and `sizesleuth-cli` crates.

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with the results on stdout.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = sizesleuth_cli::Cli::parse();
    tracing::info!(path = %cli.path.display(), "SizeSleuth starting");

    sizesleuth_cli::run(cli)
}
