//! Integration tests for the infractl CLI surface

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A binary invocation isolated from the caller's CI variables and pointed
/// at an empty Terraform directory.
fn infractl(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("infractl"));
    cmd.env("NO_COLOR", "1")
        .env_remove("GITHUB_REF")
        .env_remove("GITHUB_ACTOR")
        .env_remove("INFRACTL_CONFIG")
        .env("INFRACTL_TERRAFORM_DIR", dir.path());
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    let dir = TempDir::new().unwrap();
    infractl(&dir)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Terraform-managed Azure"));
}

#[test]
fn test_cli_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    infractl(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("tag"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    let dir = TempDir::new().unwrap();
    infractl(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("infractl"));
}

#[test]
fn test_cli_unknown_command_fails() {
    let dir = TempDir::new().unwrap();
    infractl(&dir).arg("frobnicate").assert().code(2);
}

// --- tag command ---

#[test]
fn test_tag_explicit_prefix() {
    let dir = TempDir::new().unwrap();
    infractl(&dir)
        .args(["tag", "--prefix", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo"))
        .stdout(predicate::str::contains("foo-biteswipe-resources"));
}

#[test]
fn test_tag_production_branch_maps_to_prod() {
    let dir = TempDir::new().unwrap();
    infractl(&dir)
        .arg("tag")
        .env("GITHUB_REF", "refs/heads/main")
        .env("GITHUB_ACTOR", "someone")
        .assert()
        .success()
        .stdout(predicate::str::contains("prod-biteswipe-resources"));
}

#[test]
fn test_tag_json_is_valid() {
    let dir = TempDir::new().unwrap();
    let output = infractl(&dir)
        .args(["tag", "--prefix", "alice", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["owner_tag"], "alice");
    assert_eq!(value["resource_group"], "alice-biteswipe-resources");
}

#[test]
fn test_tag_quiet_prints_bare_tag() {
    let dir = TempDir::new().unwrap();
    infractl(&dir)
        .args(["--quiet", "tag", "--prefix", "x"])
        .assert()
        .success()
        .stdout("x\n");
}

#[test]
fn test_tag_rejects_prefix_that_is_not_a_legal_name() {
    let dir = TempDir::new().unwrap();
    infractl(&dir)
        .args(["tag", "--prefix", "a\"b"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("letters, digits"));
    assert!(!dir.path().join("terraform.tfvars").exists());
}

#[test]
fn test_tag_normalizes_ci_actor() {
    let dir = TempDir::new().unwrap();
    infractl(&dir)
        .args(["--quiet", "tag"])
        .env("GITHUB_ACTOR", "dependabot[bot]")
        .assert()
        .success()
        .stdout("dependabot-bot\n");
}

#[test]
fn test_tag_reads_product_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("infractl.yaml"), "product: shop\n").unwrap();
    infractl(&dir)
        .args(["tag", "--prefix", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob-shop-resources"));
}

#[test]
fn test_invalid_config_fails_with_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("infractl.yaml"), "retry: [not, a, map]\n").unwrap();
    infractl(&dir)
        .args(["tag", "--prefix", "bob"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_json_mode_reports_errors_as_json() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("infractl.yaml"), "retry:\n  max_passes: 0\n").unwrap();
    let output = infractl(&dir)
        .args(["tag", "--prefix", "bob", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "INVALID_CONFIG");
    assert!(
        value["message"]
            .as_str()
            .unwrap()
            .contains("retry.max_passes")
    );
}

// --- destroy command ---

#[test]
fn test_unconfirmed_destroy_leaves_variables_file_alone() {
    let dir = TempDir::new().unwrap();
    // Without a terminal the prompt cannot be answered, so nothing proceeds.
    infractl(&dir)
        .args(["--quiet", "destroy", "--prefix", "bob"])
        .env_remove("CI")
        .write_stdin("")
        .output()
        .unwrap();
    assert!(!dir.path().join("terraform.tfvars").exists());
}
