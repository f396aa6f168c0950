//! Integration tests running the `cfglock` binary as separate processes.
//!
//! Every test gets its own store directory; concurrency comes from spawning
//! the binary, never from shared state between tests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_cfglock");

/// A store directory with a short lock TTL so expiry is observable.
fn store_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("config.yaml"),
        "lock_ttl_secs: 2\nheartbeat_interval_secs: 1\n",
    )
    .unwrap();
    temp_dir
}

fn cfglock(db: &Path) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.arg("--db").arg(db).env_remove("RUST_LOG");
    cmd
}

fn seed(db: &Path) {
    cfglock(db)
        .args(["set", "PORT", "Ethernet0", "mtu=9100", "admin_status=up"])
        .assert()
        .success();
}

/// Start `save` waiting on its prompt, with stdin left open.
fn spawn_waiting_save(db: &Path, out: &Path) -> Child {
    std::process::Command::new(BIN)
        .arg("--db")
        .arg(db)
        .arg("save")
        .arg(out)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap()
}

fn wait_until_locked(db: &Path) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let output = cfglock(db).args(["lock", "show"]).output().unwrap();
        if String::from_utf8_lossy(&output.stdout).starts_with("locked by pid") {
            return;
        }
        assert!(Instant::now() < deadline, "lock was never taken");
        thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn test_save_with_yes_writes_config_without_lock_table() {
    let temp_dir = store_dir();
    let db = temp_dir.path();
    seed(db);
    let out = db.join("out.json");

    cfglock(db)
        .args(["save", "-y"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 1 tables"));

    let raw = std::fs::read_to_string(&out).unwrap();
    assert!(!raw.contains("LOCK"));
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["PORT"]["Ethernet0"]["mtu"], "9100");

    cfglock(db)
        .args(["lock", "show"])
        .assert()
        .success()
        .stdout("unlocked\n");
}

#[test]
fn test_save_defaults_to_configured_file() {
    let temp_dir = store_dir();
    let db = temp_dir.path();
    seed(db);

    cfglock(db).args(["save", "--yes"]).assert().success();

    assert!(db.join("config_db.json").is_file());
}

#[test]
fn test_declined_prompt_aborts_without_writing() {
    let temp_dir = store_dir();
    let db = temp_dir.path();
    seed(db);
    let out = db.join("out.json");

    cfglock(db)
        .arg("save")
        .arg(&out)
        .write_stdin("n\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Existing file will be overwritten, continue? [y/N]: ",
        ))
        .stderr(predicate::str::contains("Aborted!"));

    assert!(!out.exists());
    cfglock(db)
        .args(["lock", "show"])
        .assert()
        .stdout("unlocked\n");
}

#[test]
fn test_stale_lock_is_reset_then_reclaimed() {
    let temp_dir = store_dir();
    let db = temp_dir.path();
    seed(db);

    cfglock(db)
        .args(["set", "LOCK", "configDbLock", "PID=5555"])
        .assert()
        .success();
    cfglock(db)
        .args(["lock", "show"])
        .assert()
        .stdout(predicate::str::contains("STALE"));

    cfglock(db)
        .args(["save", "-y"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains(
            "Can not acquire lock, Reset Timer & Abort",
        ));

    cfglock(db)
        .args(["lock", "show"])
        .assert()
        .stdout(predicate::str::contains("locked by pid 5555 (expires in"));

    thread::sleep(Duration::from_millis(2500));

    cfglock(db).args(["save", "-y"]).assert().success();
}

#[test]
fn test_second_process_is_refused_while_first_waits_on_prompt() {
    let temp_dir = store_dir();
    let db = temp_dir.path();
    seed(db);
    let out = db.join("out.json");

    let mut first = spawn_waiting_save(db, &out);
    wait_until_locked(db);

    // Longer than the TTL: only the heartbeat keeps the first lock alive.
    thread::sleep(Duration::from_millis(2500));

    cfglock(db)
        .args(["save", "-y"])
        .arg(db.join("other.json"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Can not acquire lock, Abort"));
    assert!(!db.join("other.json").exists());

    first
        .stdin
        .take()
        .unwrap()
        .write_all(b"y\n")
        .unwrap();
    let status = first.wait().unwrap();
    assert!(status.success());
    assert!(out.is_file());

    // Released on completion: the next process gets in immediately.
    cfglock(db)
        .args(["save", "-y"])
        .arg(db.join("other.json"))
        .assert()
        .success();
}

#[test]
fn test_lock_taken_over_during_prompt_aborts_after_yes() {
    let temp_dir = store_dir();
    let db = temp_dir.path();
    seed(db);
    let out = db.join("out.json");

    let mut first = spawn_waiting_save(db, &out);
    wait_until_locked(db);

    // Another writer rewrites the owner; the record keeps its TTL.
    cfglock(db)
        .args(["set", "LOCK", "configDbLock", "PID=7777"])
        .assert()
        .success();

    first
        .stdin
        .take()
        .unwrap()
        .write_all(b"y\n")
        .unwrap();
    let output = first.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lock lost to pid 7777"), "stderr: {}", stderr);
    assert!(!out.exists());
}

#[test]
fn test_load_replaces_store_and_ignores_lock_table() {
    let temp_dir = store_dir();
    let db = temp_dir.path();
    seed(db);
    let input = db.join("in.json");
    std::fs::write(
        &input,
        r#"{"LOCK": {"configDbLock": {"PID": "1"}}, "VLAN": {"Vlan100": {"vlanid": "100"}}}"#,
    )
    .unwrap();

    cfglock(db)
        .arg("load")
        .arg(&input)
        .write_stdin("y\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Load config from the file"))
        .stdout(predicate::str::contains("Loaded 1 records"));

    cfglock(db)
        .args(["get", "VLAN", "Vlan100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vlanid: 100"));
    cfglock(db)
        .args(["get", "PORT", "Ethernet0"])
        .assert()
        .code(1);
    cfglock(db)
        .args(["lock", "show"])
        .assert()
        .stdout("unlocked\n");
}

#[test]
fn test_load_missing_file_is_user_error() {
    let temp_dir = store_dir();
    let db = temp_dir.path();

    cfglock(db)
        .args(["load", "-y"])
        .arg(db.join("nope.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_corrupt_store_is_store_failure() {
    let temp_dir = store_dir();
    let db = temp_dir.path();
    std::fs::write(db.join("db.json"), "{not json").unwrap();

    cfglock(db)
        .args(["save", "-y"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Store unavailable"));
}

#[test]
fn test_save_and_abort_are_audited() {
    let temp_dir = store_dir();
    let db = temp_dir.path();
    seed(db);

    cfglock(db).args(["save", "-y"]).assert().success();
    cfglock(db)
        .arg("save")
        .write_stdin("no\n")
        .assert()
        .code(1);

    let log = std::fs::read_to_string(db.join("events").join("events.ndjson")).unwrap();
    let actions: Vec<String> = log
        .lines()
        .map(|line| {
            let event: serde_json::Value = serde_json::from_str(line).unwrap();
            event["action"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(actions, vec!["save", "abort"]);
}

#[test]
fn test_get_shows_ttl_status() {
    let temp_dir = store_dir();
    let db = temp_dir.path();
    seed(db);

    cfglock(db)
        .args(["get", "PORT", "Ethernet0"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("PORT|Ethernet0 (no expiry)"))
        .stdout(predicate::str::contains("admin_status: up"));
}
