use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
hub_name = "hub"
connection_string = "Endpoint=sb://namespace.servicebus.windows.net/;SharedAccessKeyName=DefaultFullSharedAccessSignature;SharedAccessKey=secret"
"#;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("azure-push").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Azure Notification Hubs client"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("azure-push").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("azure-push"));
}

#[test]
fn test_token_command() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, CONFIG);

    let mut cmd = Command::cargo_bin("azure-push").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .arg("token")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "SharedAccessSignature sr=https%3A%2F%2Fnamespace.servicebus.windows.net%2Fhub&sig=",
        ))
        .stdout(predicate::str::contains("&skn=DefaultFullSharedAccessSignature"));
}

#[test]
fn test_config_env_var() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, CONFIG);

    let mut cmd = Command::cargo_bin("azure-push").unwrap();
    cmd.env("AZURE_PUSH_CONFIG", &config)
        .arg("token")
        .assert()
        .success()
        .stdout(predicate::str::contains("SharedAccessSignature"));
}

#[test]
fn test_config_command_masks_secrets() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, CONFIG);

    let mut cmd = Command::cargo_bin("azure-push").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("hub_name = \"hub\""))
        .stdout(predicate::str::contains("namespace = \"namespace\""))
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("SharedAccessKey=secret").not());
}

#[test]
fn test_missing_config_fails() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("azure-push").unwrap();
    cmd.arg("--config")
        .arg(temp_dir.path().join("missing.toml"))
        .arg("token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "hub_name = \"hub\"\n");

    let mut cmd = Command::cargo_bin("azure-push").unwrap();
    cmd.arg("--config").arg(&config).arg("token").assert().failure();
}

#[test]
fn test_send_rejects_non_object_data() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, CONFIG);

    let mut cmd = Command::cargo_bin("azure-push").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .args(["send", "--title", "Hi", "--body", "Hello", "--data", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--data must be a JSON object"));
}

#[test]
fn test_delete_requires_id() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, CONFIG);

    let mut cmd = Command::cargo_bin("azure-push").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .args(["delete", ""])
        .assert()
        .failure();
}
