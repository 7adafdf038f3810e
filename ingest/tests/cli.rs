//! CLI tests for the `ingest` binary.
//!
//! Spawns the binary and verifies exit codes and the file-sink run path
//! with a shell-scripted drone command.

use std::fs;
use std::process::Command;

use ingest::exit_codes;
use serde_json::json;

#[test]
fn validate_accepts_minimal_config() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("task.toml");
    fs::write(&config_path, "lammps_input = \"peo.in\"\n").expect("write config");

    let status = Command::new(env!("CARGO_BIN_EXE_ingest"))
        .arg("validate")
        .arg(&config_path)
        .status()
        .expect("ingest validate");

    assert_eq!(status.code(), Some(exit_codes::OK));
}

#[test]
fn validate_rejects_config_without_lammps_input() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("task.toml");
    fs::write(&config_path, "calc_dir = \"/runs/1\"\n").expect("write config");

    let status = Command::new(env!("CARGO_BIN_EXE_ingest"))
        .arg("validate")
        .arg(&config_path)
        .status()
        .expect("ingest validate");

    assert_eq!(status.code(), Some(exit_codes::INVALID));
}

#[test]
fn validate_checks_literal_db_credential_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db_path = temp.path().join("db.json");
    fs::write(&db_path, json!({"host": "only-a-host"}).to_string()).expect("write db config");
    let config_path = temp.path().join("task.toml");
    fs::write(
        &config_path,
        format!("lammps_input = \"peo.in\"\ndb_file = \"{}\"\n", db_path.display()),
    )
    .expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_ingest"))
        .arg("validate")
        .arg(&config_path)
        .output()
        .expect("ingest validate");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("schema validation failed"));
}

#[test]
fn run_writes_task_json_and_prints_task_id() {
    let temp = tempfile::tempdir().expect("tempdir");
    let run_dir = temp.path().join("run");
    fs::create_dir(&run_dir).expect("create run dir");

    let config_path = temp.path().join("task.toml");
    fs::write(
        &config_path,
        format!(
            concat!(
                "lammps_input = \"peo.in\"\n",
                "calc_dir = \"{}\"\n",
                "\n",
                "[drone]\n",
                "command = [\"sh\", \"-c\", ",
                "\"cat > /dev/null; printf '{{\\\"task_id\\\": 7, \\\"formula\\\": \\\"NaCl\\\"}}'\"",
                "]\n",
            ),
            run_dir.display()
        ),
    )
    .expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_ingest"))
        .current_dir(temp.path())
        .arg("run")
        .arg(&config_path)
        .output()
        .expect("ingest run");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "7");

    let contents = fs::read_to_string(temp.path().join("task.json")).expect("read task.json");
    let written: serde_json::Value = serde_json::from_str(&contents).expect("valid json");
    assert_eq!(written["formula"], json!("NaCl"));
}

#[test]
fn run_rejects_database_configuration() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db_path = temp.path().join("db.json");
    fs::write(&db_path, json!({"database": "lammps"}).to_string()).expect("write db config");

    let config_path = temp.path().join("task.toml");
    fs::write(
        &config_path,
        format!(
            concat!(
                "lammps_input = \"peo.in\"\n",
                "calc_dir = \"{}\"\n",
                "db_file = \"{}\"\n",
                "\n",
                "[drone]\n",
                "command = [\"sh\", \"-c\", \"cat > /dev/null; printf '{{}}'\"]\n",
            ),
            temp.path().display(),
            db_path.display()
        ),
    )
    .expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_ingest"))
        .current_dir(temp.path())
        .arg("run")
        .arg(&config_path)
        .output()
        .expect("ingest run");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no database backend"));
    assert!(!temp.path().join("task.json").exists());
}
