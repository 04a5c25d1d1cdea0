// Drives the compiled binary with an isolated data directory and config so
// the user's real logs are never touched.

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use tempfile::tempdir;

fn notedrill(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("notedrill").unwrap();
    cmd.arg("--data-dir")
        .arg(dir.join("state"))
        .arg("--config")
        .arg(dir.join("config.json"))
        .env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn melody_prints_json() {
    let dir = tempdir().unwrap();
    let melody = json_stdout(notedrill(dir.path()).args([
        "melody",
        "--difficulty",
        "beginner",
        "--clef",
        "bass",
        "--seed",
        "7",
    ]));

    assert_eq!(melody["clef"], "bass");
    assert_eq!(melody["difficulty"], "beginner");
    assert_eq!(melody["measures"], 4);
    let slots = match melody["time_signature"].as_str().unwrap() {
        "4/4" => 4,
        "3/4" => 3,
        other => panic!("unexpected time signature {other}"),
    };
    assert_eq!(melody["melody"].as_array().unwrap().len(), 4 * slots);
}

#[test]
fn stats_on_empty_store_are_zero() {
    let dir = tempdir().unwrap();
    let stats = json_stdout(notedrill(dir.path()).arg("stats"));
    assert_eq!(stats["total_sessions"], 0);
    assert_eq!(stats["key_practice_accuracy"], 0.0);
    assert_eq!(stats["recent_sessions"].as_array().unwrap().len(), 0);
}

#[test]
fn key_quiz_reads_answers_from_stdin() {
    let dir = tempdir().unwrap();
    notedrill(dir.path())
        .args(["key", "--count", "3", "--token", "cli-test", "--seed", "3"])
        .write_stdin("c\nd\ne\n")
        .assert()
        .success();

    let stats = json_stdout(notedrill(dir.path()).args(["stats", "--token", "cli-test"]));
    assert_eq!(stats["total_sessions"], 3);
    assert_eq!(stats["recent_sessions"].as_array().unwrap().len(), 3);
    assert_eq!(stats["recent_sessions"][0]["type"], "key_practice");
}

#[test]
fn melody_export_writes_a_sheet() {
    let dir = tempdir().unwrap();
    json_stdout(notedrill(dir.path()).args(["melody", "--export", "--seed", "1"]));

    let exports: Vec<_> = std::fs::read_dir(dir.path().join("state").join("exports"))
        .unwrap()
        .collect();
    assert_eq!(exports.len(), 1);

    let stats = json_stdout(notedrill(dir.path()).arg("stats"));
    assert_eq!(stats["sight_reading_generated"], 1);
    assert_eq!(stats["pdfs_exported"], 1);
}

#[test]
fn failed_export_exits_with_error_payload() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let config = serde_json::json!({ "export_dir": blocker.join("sheets") });
    std::fs::write(dir.path().join("config.json"), config.to_string()).unwrap();

    let output = notedrill(dir.path())
        .args(["melody", "--export", "--seed", "1"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let payload: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(payload["error"].as_str().is_some());
    assert!(payload.get("melody").is_none());
}
