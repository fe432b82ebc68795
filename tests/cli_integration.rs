//! CLI integration tests for Rigging.
//!
//! These tests drive the `rigging` binary against temporary projects. The
//! compose program is replaced with `echo` (or `false`) through the project
//! config, so no container engine is needed.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the rigging binary command, isolated from the user's global config.
fn rigging(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rigging").unwrap();
    cmd.env("HOME", home).env_remove("RIGGING_IMPLEMENTATIONS");
    cmd
}

/// A temporary home and a project initialized inside it.
fn initialized_project(demo: bool) -> (TempDir, std::path::PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("shop");

    let mut cmd = rigging(tmp.path());
    cmd.arg("init").arg("shop").current_dir(tmp.path());
    if demo {
        cmd.arg("--demo");
    }
    cmd.assert().success();

    (tmp, root)
}

fn use_compose_program(root: &Path, program: &str) {
    fs::write(
        root.join(".rigging/config.toml"),
        format!("[compose]\nprogram = \"{}\"\nargs = []\n", program),
    )
    .unwrap();
}

// ============================================================================
// rigging init
// ============================================================================

#[test]
fn test_init_creates_project() {
    let (_tmp, root) = initialized_project(false);

    assert!(root.join("docker-compose.yml").exists());
    assert!(root.join(".rigging/commands.toml").exists());
    let settings = fs::read_to_string(root.join(".rigging/settings.toml")).unwrap();
    assert!(settings.contains("Project = \"shop\""));
}

#[test]
fn test_init_with_name() {
    let tmp = TempDir::new().unwrap();

    rigging(tmp.path())
        .args(["init", "--name", "acme"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Initialized project `acme`"));

    let settings = fs::read_to_string(tmp.path().join(".rigging/settings.toml")).unwrap();
    assert!(settings.contains("Project = \"acme\""));
}

#[test]
fn test_init_fails_if_definition_exists() {
    let (tmp, _root) = initialized_project(false);

    rigging(tmp.path())
        .args(["init", "shop"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_ignores_configured_implementations() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join(".rigging")).unwrap();
    fs::write(
        tmp.path().join(".rigging/config.toml"),
        "[api]\nimplementations = [\"orchestrate\", \"command\"]\n",
    )
    .unwrap();

    rigging(tmp.path())
        .args(["init", "shop"])
        .current_dir(tmp.path())
        .assert()
        .success();
    assert!(tmp.path().join("shop/docker-compose.yml").exists());

    rigging(tmp.path())
        .arg("list")
        .current_dir(tmp.path().join("shop"))
        .assert()
        .success()
        .stdout(predicate::str::contains("orchestrate.up"))
        .stdout(predicate::str::contains("project.init").not());
}

// ============================================================================
// rigging list / exec
// ============================================================================

#[test]
fn test_list_shows_activated_operations() {
    let (tmp, root) = initialized_project(false);

    rigging(tmp.path())
        .arg("list")
        .current_dir(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("setting.get"))
        .stdout(predicate::str::contains("orchestrate.up"))
        .stdout(predicate::str::contains("monitor.ps"))
        .stdout(predicate::str::contains("command.exec"));
}

#[test]
fn test_list_json() {
    let (tmp, root) = initialized_project(false);

    let output = rigging(tmp.path())
        .args(["list", "--json", "--implementations", "project"])
        .current_dir(&root)
        .output()
        .unwrap();
    assert!(output.status.success());

    let ops: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ops = ops.as_array().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0]["id"], "project.init");
    let props: Vec<_> = ops[0]["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(props, vec!["demo", "root", "name"]);
}

#[test]
fn test_unknown_implementation_is_reported() {
    let (tmp, root) = initialized_project(false);

    rigging(tmp.path())
        .args(["list", "--implementations", "bogus,project"])
        .current_dir(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("project.init"))
        .stderr(predicate::str::contains("bogus"));
}

#[test]
fn test_exec_unknown_operation_fails() {
    let (tmp, root) = initialized_project(false);

    rigging(tmp.path())
        .args(["exec", "deploy.everything"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available"));
}

#[test]
fn test_exec_with_assignments() {
    let (tmp, root) = initialized_project(false);

    rigging(tmp.path())
        .args(["exec", "setting.set", "--set", "key=Replicas", "--set", "value=3"])
        .current_dir(&root)
        .assert()
        .success();

    rigging(tmp.path())
        .args(["exec", "setting.get", "--set", "key=Replicas"])
        .current_dir(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("value = 3"));
}

#[test]
fn test_exec_rejects_malformed_assignment() {
    let (tmp, root) = initialized_project(false);

    rigging(tmp.path())
        .args(["exec", "setting.get", "--set", "Replicas"])
        .current_dir(&root)
        .assert()
        .failure();
}

// ============================================================================
// rigging setting
// ============================================================================

#[test]
fn test_setting_roundtrip() {
    let (tmp, root) = initialized_project(false);

    rigging(tmp.path())
        .args(["setting", "set", "Project", "renamed"])
        .current_dir(&root)
        .assert()
        .success();

    rigging(tmp.path())
        .args(["setting", "get", "Project"])
        .current_dir(&root)
        .assert()
        .success()
        .stdout("renamed\n");

    rigging(tmp.path())
        .args(["setting", "get", "Missing"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("`Missing` not found"));
}

// ============================================================================
// rigging up / command (compose program replaced)
// ============================================================================

#[cfg(unix)]
#[test]
fn test_up_runs_compose_program() {
    let (tmp, root) = initialized_project(false);
    use_compose_program(&root, "echo");

    rigging(tmp.path())
        .arg("up")
        .current_dir(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("-p shop"))
        .stdout(predicate::str::contains("up -d"));
}

#[cfg(unix)]
#[test]
fn test_up_reports_compose_failure() {
    let (tmp, root) = initialized_project(false);
    use_compose_program(&root, "false");

    rigging(tmp.path())
        .arg("down")
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("orchestrate.down"));
}

#[test]
fn test_up_without_definition_fails() {
    let tmp = TempDir::new().unwrap();

    rigging(tmp.path())
        .arg("up")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("orchestration is not available"));
}

#[cfg(unix)]
#[test]
fn test_command_runs_in_service() {
    let (tmp, root) = initialized_project(true);
    use_compose_program(&root, "echo");

    rigging(tmp.path())
        .args(["command", "--list"])
        .current_dir(&root)
        .assert()
        .success()
        .stdout("psql\nshell\n");

    rigging(tmp.path())
        .args(["command", "shell", "-l"])
        .current_dir(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("run --rm app sh -l"));

    rigging(tmp.path())
        .args(["command", "deploy"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("`deploy` not found"));
}

// ============================================================================
// rigging completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();

    rigging(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rigging"));
}
