use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A base URL nothing listens on.
fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn syncq(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("syncq");
    cmd.env("SYNCQ_HOME", home.path())
        .env("API_BASE_URL", closed_url())
        .env("API_TIMEOUT", "500")
        .env_remove("RUST_LOG")
        .env_remove("LOG_LEVEL");
    cmd
}

fn enqueue_delete(home: &TempDir, entity_id: &str) -> String {
    let output = syncq(home)
        .args(["-o", "json", "enqueue", "delete", "--entity-id", entity_id])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value["id"].as_str().unwrap().to_string()
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    syncq(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("enqueue"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn enqueue_then_status() {
    let home = TempDir::new().unwrap();

    syncq(&home)
        .args(["enqueue", "create", "--entity-id", "42", "--title", "Buy milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued CREATE todo #42"));
    enqueue_delete(&home, "7");

    syncq(&home)
        .args(["--output", "json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pending\": 2"))
        .stdout(predicate::str::contains("\"total\": 2"));
}

#[test]
fn enqueue_rejects_invalid_payload() {
    let home = TempDir::new().unwrap();

    syncq(&home)
        .args(["enqueue", "update", "--entity-id", "1", "--payload", "{oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("payload is not valid JSON"));
}

#[test]
fn list_and_show() {
    let home = TempDir::new().unwrap();
    let id = enqueue_delete(&home, "3");

    syncq(&home)
        .args(["-o", "json", "list", "--status", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 1"))
        .stdout(predicate::str::contains(id.as_str()));

    syncq(&home)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("#3"));

    syncq(&home)
        .args(["show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn run_while_offline_changes_nothing() {
    let home = TempDir::new().unwrap();
    let id = enqueue_delete(&home, "9");

    syncq(&home)
        .args(["-o", "json", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"offline\""))
        .stdout(predicate::str::contains("\"success\": 0"));

    syncq(&home)
        .args(["-o", "json", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"retry_count\": 0"));
}

#[test]
fn retry_while_offline_fails() {
    let home = TempDir::new().unwrap();
    let id = enqueue_delete(&home, "9");

    syncq(&home)
        .args(["retry", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not reachable"));
}

#[test]
fn clear_with_nothing_failed() {
    let home = TempDir::new().unwrap();
    enqueue_delete(&home, "1");

    syncq(&home)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 0 failed entries"));
}

#[test]
fn invalid_env_override_is_reported() {
    let home = TempDir::new().unwrap();

    syncq(&home)
        .env("SYNC_MAX_RETRIES", "0")
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_retries"));
}

#[test]
fn watch_refuses_when_auto_sync_disabled() {
    let home = TempDir::new().unwrap();

    syncq(&home)
        .env("ENABLE_AUTO_SYNC", "false")
        .arg("watch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("auto-sync is disabled"));
}
