use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const APP_JSON: &str = r#"{
    "name": "App",
    "children": [
        {"name": "Host", "class": "import:nodes#String", "value": "localhost"},
        {
            "name": "Port",
            "class": "import:nodes#Property",
            "children": [{"name": "Value", "class": "import:nodes#String", "value": 8080}]
        },
        {"name": "Web", "class": "app:servers#Http"}
    ]
}"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

fn arbor() -> Command {
    Command::cargo_bin("arbor").unwrap()
}

#[test]
fn test_tree_lists_nodes_breadth_first() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "app.json", APP_JSON);

    let output = arbor()
        .arg("tree")
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "App [Node]",
            "App.Host [String] = localhost",
            "App.Port [Property] = 8080",
            "App.Web [Http]",
            "App.Port.Value [String] = 8080",
        ]
    );
}

#[test]
fn test_check_reports_summary() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "app.json", APP_JSON);

    arbor()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("App: OK (5 nodes from 5 definitions)"))
        .stdout(predicate::str::contains("String: 2"));
}

#[test]
fn test_check_json_output() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "app.json", APP_JSON);

    let output = arbor()
        .args(["check", "--json"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(summary["root"], "App");
    assert_eq!(summary["nodes"], 5);
    assert_eq!(summary["classes"]["Http"], 1);
}

#[test]
fn test_run_toml_definitions() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "app.toml",
        r#"
name = "Service"

[[children]]
name = "Worker"
"#,
    );

    arbor()
        .args(["run", "--verbose"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Service.Worker [Node] (initialized)"))
        .stdout(predicate::str::contains("Service: running (2 nodes)"));
}

#[test]
fn test_leaf_with_children_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "bad.json",
        r#"{"name": "App", "children": [{"name": "Text", "class": "import:nodes#String", "children": [{"name": "Inner"}]}]}"#,
    );

    arbor()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("App.Text cannot have child nodes"));
}

#[test]
fn test_missing_definition_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    arbor()
        .arg("run")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load definitions"));
}

#[test]
fn test_runtime_config_is_applied() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        &dir,
        "arbor.json",
        r#"{"package": "demo", "log_level": "error", "loaders": {"json": true, "toml": false}}"#,
    );
    let path = write_file(&dir, "app.toml", "name = \"App\"\n");

    arbor()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load definitions"));
}

#[test]
fn test_config_files_are_layered() {
    let dir = TempDir::new().unwrap();
    let base = write_file(&dir, "base.json", r#"{"loaders": {"json": true, "toml": false}}"#);
    let local = write_file(&dir, "local.json", r#"{"package": "demo", "log_level": "warn"}"#);
    let toml = write_file(&dir, "app.toml", "name = \"App\"\n");
    let json = write_file(&dir, "app.json", APP_JSON);

    // The later file leaves the loader settings of the earlier one intact.
    arbor()
        .args(["--config"])
        .arg(&base)
        .args(["--config"])
        .arg(&local)
        .arg("check")
        .arg(&toml)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load definitions"));

    arbor()
        .args(["--config"])
        .arg(&base)
        .args(["--config"])
        .arg(&local)
        .arg("check")
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("App: OK"));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "app.json", APP_JSON);

    arbor()
        .args(["--log-level", "loud", "tree"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown log level"));
}
