use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;

/// Helper to get a temporary home directory
fn temp_home_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Helper to get the storage file path in the temp home
fn storage_file_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join(".cloudops").join("storage.json")
}

const BINARY_NAME: &str = "cloudops";

/// Nothing listens on the discard port, so API calls fail fast.
const DEAD_API_URL: &str = "http://127.0.0.1:9/api/v1";

fn cloudops(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.env("HOME", home.path())
        .env("CLOUDOPS_API_URL", DEAD_API_URL)
        .env_remove("RUST_LOG");
    cmd
}

fn write_session(dir: &tempfile::TempDir) -> PathBuf {
    let path = storage_file_path(dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let user = r#"{"id":"1","email":"ada@example.com","name":"Ada","role":"admin","createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#;
    let record = serde_json::json!({ "auth_token": "token-1", "user": user });
    fs::write(&path, record.to_string()).unwrap();
    path
}

#[test]
/// Help command should display usage information.
fn cli_help_displays_usage() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("CloudOps monitoring API"))
        .stdout(contains("alerts"));
}

#[test]
/// Logout ends the session locally even when the server is unreachable.
fn logout_clears_stored_session() {
    let tmp = temp_home_dir();
    let path = write_session(&tmp);

    cloudops(&tmp)
        .arg("logout")
        .assert()
        .success()
        .stdout(contains("Logged out"));

    let record: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert!(record.get("auth_token").is_none());
    assert!(record.get("user").is_none());
}

#[test]
fn whoami_without_session() {
    let tmp = temp_home_dir();
    cloudops(&tmp)
        .arg("whoami")
        .assert()
        .success()
        .stdout(contains("Not logged in"));
}

#[test]
fn whoami_reads_stored_user() {
    let tmp = temp_home_dir();
    write_session(&tmp);
    cloudops(&tmp)
        .arg("whoami")
        .assert()
        .success()
        .stdout(contains("Ada <ada@example.com> (admin)"));
}

#[test]
/// An unconfirmable session is dropped and the card refuses to load.
fn cards_require_a_verified_session() {
    let tmp = temp_home_dir();
    let path = write_session(&tmp);

    cloudops(&tmp)
        .arg("alerts")
        .assert()
        .failure()
        .stdout(contains("Not logged in"));

    let record: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert!(record.get("auth_token").is_none());
}

#[test]
fn mock_alerts_filter_by_severity() {
    let tmp = temp_home_dir();
    cloudops(&tmp)
        .args(["alerts", "--mock", "--severity", "critical"])
        .assert()
        .success()
        .stdout(contains("Alerts (sample data)"))
        .stdout(contains("High CPU Usage"))
        .stdout(contains("Memory Usage High").not());
}

#[test]
fn unknown_severity_is_rejected() {
    let tmp = temp_home_dir();
    cloudops(&tmp)
        .args(["alerts", "--mock", "--severity", "urgent"])
        .assert()
        .failure()
        .stderr(contains("unknown severity 'urgent'"));
}

#[test]
fn mock_cost_uses_requested_period() {
    let tmp = temp_home_dir();
    cloudops(&tmp)
        .args(["cost", "--mock", "--period", "30d"])
        .assert()
        .success()
        .stdout(contains("Cost (30d) (sample data)"));
}

#[test]
fn mock_dashboard_shows_headline_numbers() {
    let tmp = temp_home_dir();
    cloudops(&tmp)
        .args(["dashboard", "--mock"])
        .assert()
        .success()
        .stdout(contains("Total resources:   10"))
        .stdout(contains("Monthly cost:      $1,155"));
}

#[test]
fn register_rejects_mismatched_passwords() {
    let tmp = temp_home_dir();
    cloudops(&tmp)
        .args([
            "register",
            "--name",
            "Ada",
            "--email",
            "ada@example.com",
            "--password",
            "secret-1",
            "--confirm-password",
            "secret-2",
        ])
        .assert()
        .failure()
        .stdout(contains("Passwords do not match"));

    assert!(!storage_file_path(&tmp).exists());
}
