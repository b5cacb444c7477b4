use assert_cmd::Command;
use predicates::prelude::*;

fn bookshelf() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", "/nonexistent/bookshelf-config")
        .env_remove("BOOKSHELF_ENV")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    bookshelf()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn config_prints_defaults_as_json() {
    let output = bookshelf().arg("config").output().unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["environment"], "local");
    assert_eq!(settings["server"]["port"], 8000);
    assert_eq!(settings["telemetry"]["log_format"], "pretty");
}

#[test]
fn config_honors_environment_overrides() {
    let output = bookshelf()
        .arg("config")
        .env("BOOKSHELF_SERVER__PORT", "9300")
        .env("BOOKSHELF_SERVER__BASE_PATH", "/v1")
        .output()
        .unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["server"]["port"], 9300);
    assert_eq!(settings["server"]["base_path"], "/v1");
}

#[test]
fn unknown_environment_fails() {
    bookshelf()
        .arg("config")
        .env("BOOKSHELF_ENV", "qa")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported environment"));
}
