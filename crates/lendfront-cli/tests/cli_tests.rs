//! Integration tests for the `lendfront` CLI binary.
//!
//! Each test runs the binary as a subprocess against a profile file in a
//! fresh temporary directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::Value;
use tempfile::TempDir;

/// Helper: locate the `lendfront` binary built by `cargo test`.
fn lendfront_bin() -> String {
    let path = env!("CARGO_BIN_EXE_lendfront");
    assert!(Path::new(path).exists(), "lendfront binary not found at {path}");
    path.to_owned()
}

fn profile_in(dir: &TempDir) -> PathBuf {
    dir.path().join("profile.json")
}

/// Helper: run lendfront on `profile` and return (`exit_code`, stdout, stderr).
fn run(profile: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(lendfront_bin())
        .arg("--no-color")
        .arg("--profile")
        .arg(profile)
        .args(args)
        .env_remove("LENDFRONT_PROFILE_PATH")
        .output()
        .expect("failed to execute lendfront");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn stored(profile: &Path) -> serde_json::Map<String, Value> {
    serde_json::from_str(&fs::read_to_string(profile).unwrap()).unwrap()
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(&profile_in(&dir), &["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("lendfront"), "version output: {stdout}");
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(&profile_in(&dir), &["--help"]);
    assert_eq!(code, 0);
    for command in ["groups", "show", "set", "reset", "preview", "backgrounds", "admin", "check"] {
        assert!(stdout.contains(command), "help should list '{command}'");
    }
}

// ── Groups ───────────────────────────────────────────────────────────

#[test]
fn test_groups_on_empty_profile() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile_in(&dir);
    let (code, stdout, stderr) = run(&profile, &["groups"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("hero-background"));
    assert!(stdout.contains("loan-cards"));
    assert!(stdout.contains("default"));
    assert!(!stdout.contains("stored"));
    // Reading never writes.
    assert!(!profile.exists());
}

#[test]
fn test_show_prints_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(&profile_in(&dir), &["show", "hero-text"]);
    assert_eq!(code, 0);
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["titleColor"], "#1f2937");

    let (_, defaults, _) = run(&profile_in(&dir), &["defaults", "hero-text"]);
    assert_eq!(serde_json::from_str::<Value>(&defaults).unwrap(), value);
}

#[test]
fn test_unknown_group_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(&profile_in(&dir), &["show", "footer"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown settings group 'footer'"), "stderr: {stderr}");
}

// ── Set / reset ──────────────────────────────────────────────────────

#[test]
fn test_set_from_file_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile_in(&dir);

    let (_, stdout, _) = run(&profile, &["show", "hero-text"]);
    let mut value: Value = serde_json::from_str(&stdout).unwrap();
    value["alignment"] = Value::from("center");
    let input = dir.path().join("hero-text.json");
    fs::write(&input, value.to_string()).unwrap();

    let (code, stdout, stderr) = run(&profile, &["set", "hero-text", input.to_str().unwrap()]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("hero-text updated"));

    let (_, stdout, _) = run(&profile, &["show", "hero-text"]);
    let reread: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(reread["alignment"], "center");

    let (_, groups, _) = run(&profile, &["groups"]);
    assert!(groups.contains("stored"));
}

#[test]
fn test_set_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile_in(&dir);

    let mut child = Command::new(lendfront_bin())
        .arg("--no-color")
        .arg("--profile")
        .arg(&profile)
        .args(["set", "carousel", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"[{"id":"a","src":"/images/carousel/a.webp","alt":"A"}]"#)
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let entries = stored(&profile);
    let slides: Value = serde_json::from_str(entries["carousel-images"].as_str().unwrap()).unwrap();
    assert_eq!(slides[0]["id"], "a");
}

#[test]
fn test_set_rejects_wrong_shape() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile_in(&dir);
    let input = dir.path().join("bad.json");
    fs::write(&input, r#"{"alignment": "diagonal"}"#).unwrap();

    let (code, _, stderr) = run(&profile, &["set", "hero-text", input.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid value"), "stderr: {stderr}");
    assert!(!profile.exists());
}

#[test]
fn test_reset_restores_default() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile_in(&dir);
    let input = dir.path().join("cards.json");
    fs::write(&input, "[]").unwrap();
    run(&profile, &["set", "loan-cards", input.to_str().unwrap()]);

    let (_, stdout, _) = run(&profile, &["show", "loan-cards"]);
    assert_eq!(serde_json::from_str::<Value>(&stdout).unwrap(), Value::Array(vec![]));

    let (code, _, _) = run(&profile, &["reset", "loan-cards"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run(&profile, &["show", "loan-cards"]);
    let cards: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(cards.as_array().unwrap().len(), 4);
}

// ── Preview ──────────────────────────────────────────────────────────

#[test]
fn test_preview_by_width() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile_in(&dir);
    let (code, stdout, _) = run(&profile, &["preview", "hero-text", "--width", "375"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("hero-text {"));
    assert!(stdout.contains("left: 50%;"));

    let (_, desktop, _) = run(&profile, &["preview", "hero-text"]);
    assert!(desktop.contains("left: 22%;"));

    let (code, _, _) = run(&profile, &["preview", "hero-text", "--surface", "modal"]);
    assert_eq!(code, 1);
}

// ── Backgrounds and admin ────────────────────────────────────────────

#[test]
fn test_backgrounds_add_list_remove() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile_in(&dir);

    let (code, _, _) = run(&profile, &["backgrounds", "add", "service", "/images/service/x.webp"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run(&profile, &["backgrounds", "list", "service"]);
    assert_eq!(stdout.trim(), "/images/service/x.webp");

    run(&profile, &["backgrounds", "remove", "service", "/images/service/x.webp"]);
    let (_, stdout, _) = run(&profile, &["backgrounds", "list", "service"]);
    assert!(stdout.trim().is_empty());

    let (code, _, _) = run(&profile, &["backgrounds", "list", "footer"]);
    assert_eq!(code, 1);
}

#[test]
fn test_admin_on_off() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile_in(&dir);

    let (_, stdout, _) = run(&profile, &["admin", "status"]);
    assert!(stdout.contains("off"));

    run(&profile, &["admin", "on"]);
    assert_eq!(stored(&profile)["admin-mode"], "true");
    let (_, stdout, _) = run(&profile, &["admin", "status"]);
    assert!(stdout.contains("on"));

    run(&profile, &["admin", "off"]);
    assert_eq!(stored(&profile)["admin-mode"], "false");
}

// ── Check ────────────────────────────────────────────────────────────

#[test]
fn test_check_reports_and_repairs_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile_in(&dir);
    fs::write(
        &profile,
        r#"{"user-block-settings": "{oops", "hero-custom-backgrounds": "\"not a list\""}"#,
    )
    .unwrap();

    let (code, stdout, stderr) = run(&profile, &["check"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("user-block-settings"));
    assert!(stdout.contains("hero-custom-backgrounds"));
    assert!(stderr.contains("--repair"));

    let (code, _, stderr) = run(&profile, &["check", "--repair"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let (code, stdout, _) = run(&profile, &["check"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("all stored settings decode"));
    assert_eq!(stored(&profile)["hero-custom-backgrounds"], "[]");
}

#[test]
fn test_unreadable_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile_in(&dir);
    fs::write(&profile, "[1, 2, 3]").unwrap();
    let (code, _, stderr) = run(&profile, &["groups"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("failed to open profile"));
}
