use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_agent-indicator"))
}

fn write_recording_script(dir: &Path) -> std::path::PathBuf {
    let log = dir.join("calls.log");
    let script = dir.join("agent-state.sh");
    fs::write(
        &script,
        format!("#!/usr/bin/env bash\necho \"$*\" >> '{}'\n", log.display()),
    )
    .expect("Failed to write indicator script");
    log
}

fn run_watch(home: &Path, indicator_dir: &Path, input: &str) -> Output {
    let mut child = bin()
        .arg("watch")
        .env("HOME", home)
        .env("AGENT_INDICATOR_DIR", indicator_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn agent-indicator");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("Failed to write host stream");

    child.wait_with_output().expect("Failed to wait for agent-indicator")
}

fn config(home: &Path, args: &[&str]) -> Output {
    bin()
        .arg("config")
        .args(args)
        .env_clear()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("xdg"))
        .env("AGENT_INDICATOR_DIR", home.join("indicator"))
        .output()
        .expect("Failed to run agent-indicator config")
}

#[cfg(unix)]
#[test]
fn watch_reports_each_state_change_once() {
    let temp = TempDir::new().unwrap();
    let indicator_dir = temp.path().join("indicator");
    fs::create_dir_all(&indicator_dir).unwrap();
    let log = write_recording_script(&indicator_dir);

    let input = [
        r#"{"event":{"type":"session.status","properties":{"status":{"type":"busy"}}}}"#,
        r#"{"event":{"type":"session.status","properties":{"status":{"type":"busy"}}}}"#,
        r#"{"hook":"tool.execute.before","tool":"question"}"#,
        r#"garbage"#,
        r#"{"event":{"type":"permission.updated","properties":{}}}"#,
        r#"{"event":{"type":"session.idle","properties":{}}}"#,
        r#"{"event":{"type":"session.status","properties":{"status":{"type":"busy"}}}}"#,
    ]
    .join("\n");

    let output = run_watch(temp.path(), &indicator_dir, &input);
    assert!(output.status.success(), "watch failed: {:?}", output);

    let calls = fs::read_to_string(&log).expect("Indicator script was never called");
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(
        calls,
        vec![
            "--agent opencode --state off",
            "--agent opencode --state running",
            "--agent opencode --state needs-input",
            "--agent opencode --state done",
        ]
    );
    assert!(indicator_dir.join("logs").is_dir());
}

#[test]
fn watch_survives_missing_script() {
    let temp = TempDir::new().unwrap();
    let indicator_dir = temp.path().join("missing");

    let output = run_watch(
        temp.path(),
        &indicator_dir,
        "{\"type\":\"permission.asked\"}\n{\"type\":\"session.idle\"}\n",
    );
    assert!(output.status.success(), "watch failed: {:?}", output);
}

#[test]
fn config_set_then_get() {
    let temp = TempDir::new().unwrap();

    let set = config(temp.path(), &["set", "backends.sound.volume", "0.8"]);
    assert!(set.status.success(), "set failed: {:?}", set);

    let get = config(temp.path(), &["get", "backends.sound.volume"]);
    assert!(get.status.success());
    assert_eq!(String::from_utf8_lossy(&get.stdout), "0.8\n");

    let written = fs::read_to_string(temp.path().join("xdg/agent-indicator/config.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed, serde_json::json!({"backends": {"sound": {"volume": 0.8}}}));

    // Config commands log to stderr and leave the indicator dir alone.
    assert!(!temp.path().join("indicator").exists());
}

#[test]
fn config_get_missing_exits_one() {
    let temp = TempDir::new().unwrap();
    let get = config(temp.path(), &["get", "backends.nope"]);
    assert_eq!(get.status.code(), Some(1));
    assert!(get.stdout.is_empty());
}

#[test]
fn config_shell_exports_and_ensure() {
    let temp = TempDir::new().unwrap();

    let ensure = config(temp.path(), &["ensure"]);
    assert!(String::from_utf8_lossy(&ensure.stdout).starts_with("Created "));
    let again = config(temp.path(), &["ensure"]);
    assert!(String::from_utf8_lossy(&again.stdout).starts_with("Already exists: "));

    config(temp.path(), &["set", "backends.desktop.title_format", "it's {agent}"]);
    let exports = config(temp.path(), &["shell-exports"]);
    let stdout = String::from_utf8_lossy(&exports.stdout);
    assert!(stdout.contains("export AGENT_INDICATOR_TERMINAL='on'"));
    assert!(stdout.contains("export AGENT_INDICATOR_DESKTOP_TITLE_FORMAT='it'\\''s {agent}'"));
    assert!(!stdout.contains("AGENT_INDICATOR_PUSH_TOPIC"));
}
