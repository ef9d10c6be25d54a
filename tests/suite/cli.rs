//! End-to-end sessions against the `fieldcore` binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::Value;
use tempfile::tempdir;

/// Run a session and return the JSON lines it printed.
fn run(config: Option<&Path>, commands: &[&str]) -> Vec<Value> {
    let home = tempdir().unwrap();
    let mut command = Command::new(env!("CARGO_BIN_EXE_fieldcore"));
    command
        .env("HOME", home.path())
        .env("FIELDCORE_NOW", "2021-06-15T10:07:00")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    if let Some(config) = config {
        command.arg("--config").arg(config);
    }
    let mut child = command.spawn().unwrap();
    {
        let mut stdin = child.stdin.take().unwrap();
        for line in commands {
            writeln!(stdin, "{line}").unwrap();
        }
    }
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn defaults_show_date_only() {
    let out = run(None, &["set 2017-05-23T12:30:00", "state", "quit"]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["displayText"], "23.05.2017");
    assert_eq!(out[0]["value"], "2017-05-23T12:30:00");
    assert_eq!(out[0]["saveNeeded"], true);
}

#[test]
fn typing_and_blur_print_accept_payload() {
    let out = run(
        None,
        &["focus date", "type date 0", "state", "tick 50", "state", "blur date"],
    );
    assert_eq!(out[0]["date"]["overlay"], "01.06.2021");
    assert_eq!(out[0]["date"]["picker"]["open"], true);
    assert_eq!(out[1]["date"]["overlay"], "01.06.2021");
    assert_eq!(out[2]["accept"]["displayText"], "01.06.2021");
    assert_eq!(out[2]["accept"]["value"], "2021-06-01T00:00:00");
}

#[test]
fn config_enables_time_and_allowed_dates() {
    let dir = tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"
[field]
locale = "de-CH"
has_time = true
auto_date = "2016-04-15T00:00:00"
allowed_dates = ["2016-07-14", "2016-04-16", "2016-04-17"]
"#,
    );
    let out = run(
        Some(&config),
        &["focus date", "key date down", "key date enter", "state"],
    );
    let accept = &out[0]["accept"];
    assert_eq!(accept["hasTime"], true);
    assert_eq!(accept["displayText"], "16.04.2016\n00:00");
    assert_eq!(out[1]["saveNeeded"], true);
}

#[test]
fn arrow_keys_with_modifiers() {
    let out = run(
        None,
        &[
            "set 2014-10-01",
            "focus date",
            "key date shift+down",
            "state",
            "key date ctrl+up",
            "state",
        ],
    );
    assert_eq!(out[0]["displayText"], "01.11.2014");
    assert_eq!(out[1]["displayText"], "01.11.2013");
    assert_eq!(out[1]["value"], "2014-10-01T00:00:00");
}

#[test]
fn has_date_toggle_round_trip() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "[field]\nhas_time = true\n");
    let out = run(
        Some(&config),
        &[
            "set 2017-05-01T05:50:00",
            "has-date off",
            "state",
            "has-date on",
            "state",
        ],
    );
    assert_eq!(out[0]["displayText"], "05:50");
    assert_eq!(out[1]["displayText"], "01.05.2017\n05:50");
}

#[test]
fn errors_are_reported_and_session_continues() {
    let out = run(None, &["frobnicate", "set 2017-05-23", "state"]);
    assert!(out[0]["error"].as_str().unwrap().contains("unknown command"));
    assert_eq!(out[1]["displayText"], "23.05.2017");
}

#[test]
fn missing_config_file_fails() {
    let dir = tempdir().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_fieldcore"))
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn broken_default_config_is_logged() {
    let home = tempdir().unwrap();
    let dir = home.path().join(".fieldcore");
    std::fs::create_dir(&dir).unwrap();
    write_config(&dir, "[field\nhas_time = true\n");

    let mut child = Command::new(env!("CARGO_BIN_EXE_fieldcore"))
        .env("HOME", home.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let mut stdin = child.stdin.take().unwrap();
        writeln!(stdin, "set 2017-05-23T12:30:00").unwrap();
        writeln!(stdin, "state").unwrap();
    }
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Ignoring default config"), "{stderr}");
    let state: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["displayText"], "23.05.2017");
}
