/// End-to-end tests for `SessionState` and the driver loop.
///
/// These exercise the real scan thread against temporary directory trees
/// without a terminal attached, keeping them fast and deterministic.
use clap::Parser;
use sizesleuth_cli::app::run_with_output;
use sizesleuth_cli::state::{SessionPhase, SessionState};
use sizesleuth_cli::Cli;
use sizesleuth_core::{ScanConfig, ScanError, ScanRequest};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

/// ```text
/// root/
///   a/   one.bin 3000, two.bin 2000
///   b/   tiny.bin 10
///   top.bin 700
/// ```
fn make_temp_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    write_bytes(&a.join("one.bin"), 3_000);
    write_bytes(&a.join("two.bin"), 2_000);
    write_bytes(&b.join("tiny.bin"), 10);
    write_bytes(&tmp.path().join("top.bin"), 700);
    tmp
}

fn fast_config() -> ScanConfig {
    ScanConfig::default()
        .with_workers(2)
        .with_poll_interval(Duration::from_millis(20))
}

/// Pump `process_scan_messages()` until the phase leaves `Scanning` or the
/// deadline expires.
fn pump_until_done(state: &mut SessionState) {
    let deadline = std::time::Instant::now() + Duration::from_secs(30);
    while state.phase == SessionPhase::Scanning {
        assert!(
            std::time::Instant::now() < deadline,
            "scan did not complete within 30 seconds"
        );
        state.process_scan_messages();
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn run_to_string(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::parse_from(args);
    let mut out = Vec::new();
    run_with_output(&cli, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

// ── Session lifecycle ─────────────────────────────────────────────────────────

#[test]
fn start_scan_sets_scanning_phase() {
    let tmp = make_temp_tree();
    let mut state = SessionState::new();
    state
        .start_scan(ScanRequest::new(tmp.path()), fast_config())
        .unwrap();
    assert_eq!(state.phase, SessionPhase::Scanning);
    assert!(state.scan_handle.is_some());
    pump_until_done(&mut state);
}

#[test]
fn scan_completes_and_report_is_available() {
    let tmp = make_temp_tree();
    let mut state = SessionState::new();
    state
        .start_scan(ScanRequest::new(tmp.path()), fast_config())
        .unwrap();
    pump_until_done(&mut state);

    assert_eq!(state.phase, SessionPhase::Results);
    assert!(!state.scan_was_cancelled);
    assert_eq!(state.subdirectories_found, Some(2));
    assert!(state.scan_handle.is_none());

    let report = state.report.as_ref().expect("report after completion");
    assert_eq!(report.directories[0].path, tmp.path().join("a"));
    assert_eq!(report.directories[0].size, 5_000);
    assert_eq!(report.files[0].size, 3_000);
}

#[test]
fn invalid_path_leaves_session_idle() {
    let tmp = TempDir::new().unwrap();
    let mut state = SessionState::new();
    let err = state
        .start_scan(ScanRequest::new(tmp.path().join("missing")), fast_config())
        .unwrap_err();
    assert!(matches!(err, ScanError::NotFound { .. }));
    assert_eq!(state.phase, SessionPhase::Idle);
    assert!(state.scan_handle.is_none());
    assert!(state.report.is_none());
}

#[test]
fn cancel_reaches_results_and_is_idempotent() {
    let tmp = make_temp_tree();
    let mut state = SessionState::new();
    state
        .start_scan(ScanRequest::new(tmp.path()), fast_config())
        .unwrap();
    state.cancel_scan();
    state.cancel_scan();
    assert!(state.cancel_requested);

    let notices = state
        .transcript
        .lines()
        .iter()
        .filter(|l| l.starts_with("Cancellation requested"))
        .count();
    assert_eq!(notices, 1);

    pump_until_done(&mut state);
    assert_eq!(state.phase, SessionPhase::Results);
    // The scan may have finished before the flag was read.
    assert!(state.report.is_some());
}

#[test]
fn cancel_when_idle_is_a_no_op() {
    let mut state = SessionState::new();
    state.cancel_scan();
    assert!(!state.cancel_requested);
    assert!(state.transcript.lines().is_empty());
}

#[test]
fn restarting_clears_previous_results() {
    let tmp = make_temp_tree();
    let mut state = SessionState::new();
    state
        .start_scan(ScanRequest::new(tmp.path()), fast_config())
        .unwrap();
    pump_until_done(&mut state);
    assert!(state.report.is_some());

    let empty = TempDir::new().unwrap();
    state
        .start_scan(ScanRequest::new(empty.path()), fast_config())
        .unwrap();
    assert!(state.report.is_none());
    assert_eq!(state.subdirectories_found, None);
    pump_until_done(&mut state);
    assert!(state.report.as_ref().unwrap().is_empty());
}

// ── Driver output ────────────────────────────────────────────────────────────

#[test]
fn text_output_lists_rankings() {
    let tmp = make_temp_tree();
    let root = tmp.path().to_str().unwrap();
    let out = run_to_string(&["sizesleuth", root, "--dirs", "1", "--files", "2", "--poll-ms", "20"]).unwrap();

    assert!(out.contains("Working: scanning 2 subdirectories (returning top 1)..."));
    assert!(out.contains(&format!("Top 1 largest subdirectories in '{root}':")));
    assert!(out.contains(&format!("- {}: 4.88 KB", tmp.path().join("a").display())));
    assert!(out.contains(&format!("Top 2 largest files in '{root}':")));
    assert!(out.contains(&format!("- {}: 2.93 KB", tmp.path().join("a").join("one.bin").display())));
    assert!(out.contains(&format!("- {}: 1.95 KB", tmp.path().join("a").join("two.bin").display())));
    assert!(out.contains("Total elapsed time: "));
}

#[test]
fn zero_file_count_skips_file_scan() {
    let tmp = make_temp_tree();
    let root = tmp.path().to_str().unwrap();
    let out = run_to_string(&["sizesleuth", root, "--files", "-1"]).unwrap();
    assert!(out.contains("Skipping file scan (requested 0)."));
    assert!(!out.contains("scanning files recursively"));
}

#[test]
fn json_output_is_the_report() {
    let tmp = make_temp_tree();
    let root = tmp.path().to_str().unwrap();
    let out = run_to_string(&["sizesleuth", root, "--format", "json", "-d", "1", "-f", "1"]).unwrap();

    let json: serde_json::Value = serde_json::from_str(&out).expect("stdout should be JSON");
    assert_eq!(json["cancelled"], false);
    assert_eq!(json["directories"][0]["size"], 5_000);
    assert_eq!(json["files"][0]["size"], 3_000);
    assert!(json["total_elapsed"].as_f64().unwrap() >= 0.0);
}

#[test]
fn missing_path_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing");
    let err = run_to_string(&["sizesleuth", missing.to_str().unwrap()]).unwrap_err();
    assert_eq!(err.to_string(), "Invalid scan request");
    let scan_err = err.downcast_ref::<ScanError>().expect("root cause is a ScanError");
    assert!(matches!(scan_err, ScanError::NotFound { .. }));
}

#[test]
fn zero_timeout_still_prints_a_report() {
    let tmp = make_temp_tree();
    let root = tmp.path().to_str().unwrap();
    let out = run_to_string(&["sizesleuth", root, "--timeout", "0", "--poll-ms", "20"]).unwrap();
    // Whether the scan beat the deadline or not, it ends with a total.
    assert!(out.contains("Total elapsed time: "));
}
