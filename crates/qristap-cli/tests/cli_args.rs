use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn qristap() -> Command {
    Command::cargo_bin("qristap").unwrap()
}

#[test]
fn help_documents_positional_args_and_overrides() {
    qristap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFIG"))
        .stdout(predicate::str::contains("DEVICE_INDEX"))
        .stdout(predicate::str::contains("--adb-host"))
        .stdout(predicate::str::contains("--chrome-path"))
        .stdout(predicate::str::contains("--url"));
}

#[test]
fn missing_config_path_is_a_usage_error() {
    qristap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn nonexistent_config_fails_at_startup() {
    qristap()
        .arg("/nonexistent/profile.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading configuration"));
}

#[test]
fn malformed_config_fails_at_startup() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{ not json").unwrap();

    qristap()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading configuration"));
}

#[test]
fn config_missing_required_fields_fails_at_startup() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{ "name": "incomplete" }}"#).unwrap();

    qristap()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading configuration"));
}

#[test]
fn non_numeric_device_index_is_rejected() {
    qristap()
        .args(["profile.json", "not-a-number"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
