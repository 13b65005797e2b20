//! Machine-readable output of the binary.
//!
//! Runs the real executable in dev mode so no broker is needed, and checks
//! that stdout carries nothing but one JSON object per tick. Log lines
//! (config fallback, dev mode banner, rejected payloads) must stay on stderr.

use std::process::Command;

#[test]
fn test_json_mode_stdout_is_only_json_lines() {
    let output = Command::new(env!("CARGO_BIN_EXE_flood-dashboard"))
        .args(["--dev", "--json", "--ticks", "2"])
        .current_dir(std::env::temp_dir())
        .env_remove("FLOOD_DASHBOARD_CONFIG")
        .env("FLOOD_TICK_INTERVAL_SECONDS", "1")
        .output()
        .expect("binary should start");

    assert!(
        output.status.success(),
        "exit status {:?}, stderr:\n{}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "one line per tick, got:\n{}", stdout);

    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line)
            .unwrap_or_else(|e| panic!("stdout line is not JSON ({}): {:?}", e, line));
        assert!(value.get("tier").is_some(), "tick object should carry a tier: {}", line);
        assert!(value.get("reading").is_some(), "tick object should carry a reading: {}", line);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("dev mode"),
        "informational log lines should go to stderr, got:\n{}",
        stderr
    );
}

#[test]
fn test_missing_named_config_file_is_fatal() {
    let output = Command::new(env!("CARGO_BIN_EXE_flood-dashboard"))
        .args(["no/such/flood_dashboard.toml", "--dev", "--ticks", "1"])
        .current_dir(std::env::temp_dir())
        .env_remove("FLOOD_DASHBOARD_CONFIG")
        .output()
        .expect("binary should start");

    assert!(!output.status.success(), "a mistyped config path must not fall back to defaults");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no/such/flood_dashboard.toml"),
        "error should name the missing file, stderr:\n{}",
        stderr
    );
}
