/// Driver loop: start the scan, pump events, print, stop on deadline.
use crate::args::{Cli, OutputFormat};
use crate::render::render_json;
use crate::state::SessionState;
use anyhow::{bail, Context};
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// How often the driver drains scan events.
const TICK: Duration = Duration::from_millis(25);

/// Run one scan described by `cli`, writing results to stdout.
///
/// Validation failures are returned as errors before anything is scanned.
/// A scan cut short by `--timeout` is not an error: its partial results
/// are printed like any other.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(&cli, &mut out)
}

/// [`run`] with an explicit output sink.
pub fn run_with_output(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut session = SessionState::new();
    if let Err(err) = session.start_scan(cli.scan_request(), cli.scan_config()) {
        let what = if err.is_validation() {
            "Invalid scan request"
        } else {
            "Scan not started"
        };
        return Err(anyhow::Error::new(err).context(what));
    }

    let deadline = cli.timeout.map(|t| Instant::now() + t);
    let mut printed = 0;

    while session.is_scanning() {
        session.process_scan_messages();
        if cli.format == OutputFormat::Text {
            printed = print_new_lines(&session, out, printed)?;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            if !session.cancel_requested {
                info!("Timeout reached; cancelling scan");
            }
            session.cancel_scan();
        }
        if session.is_scanning() {
            thread::sleep(TICK);
        }
    }

    let Some(report) = session.report.as_ref() else {
        bail!("scan ended without producing a report");
    };
    if session.scan_was_cancelled {
        info!(
            directories = report.directories.len(),
            files = report.files.len(),
            "Scan cancelled; printing partial results"
        );
    }

    match cli.format {
        OutputFormat::Text => {
            print_new_lines(&session, out, printed)?;
        }
        OutputFormat::Json => {
            let json = render_json(report).context("Failed to serialise report")?;
            writeln!(out, "{json}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn print_new_lines(session: &SessionState, out: &mut dyn Write, printed: usize) -> io::Result<usize> {
    let lines = session.transcript.lines();
    for line in &lines[printed..] {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(lines.len())
}
