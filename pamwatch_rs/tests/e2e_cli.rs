//! End-to-end CLI tests for pamwatch.
//!
//! Live-audit tests run against a fake `az` placed at the front of
//! PATH, so no Azure tenant (or Azure CLI) is needed.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command pointing to the pamwatch binary
fn pamwatch() -> Command {
    cargo_bin_cmd!("pamwatch")
}

/// Write a valid config naming the given admin groups
fn write_config(dir: &Path, groups: &[&str]) -> PathBuf {
    let path = dir.join("check_pam_config.json");
    let quoted: Vec<String> = groups.iter().map(|g| format!("\"{}\"", g)).collect();
    fs::write(&path, format!("{{\"admingroups\": [{}]}}", quoted.join(", "))).unwrap();
    path
}

/// Write a snapshot file with the current schema
fn write_snapshot(dir: &Path, name: &str, admin_groups_json: &str) {
    let body = format!(
        r#"{{
  "metadata": {{
    "schema_version": "1.0",
    "generated_at": "2026-01-01T00:00:00Z",
    "users_checked": 2,
    "source": "entra"
  }},
  "admin_groups": {}
}}"#,
        admin_groups_json
    );
    fs::write(dir.join(name), body).unwrap();
}

// ============================================
// Basic CLI Tests
// ============================================

mod cli_basics {
    use super::*;

    #[test]
    fn shows_help() {
        pamwatch()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("pamwatch"))
            .stdout(predicate::str::contains("--report"))
            .stdout(predicate::str::contains("admingroups"));
    }

    #[test]
    fn shows_version() {
        pamwatch()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn unknown_flags_are_ignored() {
        pamwatch()
            .args(["--frobnicate", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("pamwatch"));
    }

    #[test]
    fn positional_arguments_are_rejected() {
        pamwatch().arg("extra").assert().failure();
    }
}

// ============================================
// Configuration Gate Tests
// ============================================

mod config_gate {
    use super::*;

    #[test]
    fn missing_config_is_fatal_before_any_session_check() {
        let temp = TempDir::new().unwrap();

        pamwatch()
            .current_dir(temp.path())
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("no config file found"))
            .stdout(predicate::str::contains("Azure session").not());
    }

    #[test]
    fn malformed_config_is_fatal() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("broken.json");
        fs::write(&config, "admingroups: [not json]").unwrap();

        pamwatch()
            .current_dir(temp.path())
            .args(["--config", config.to_str().unwrap()])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("admingroups"));
    }

    #[test]
    fn config_without_admingroups_key_is_fatal() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("wrong_key.json");
        fs::write(&config, r#"{"groups": ["Global Admins"]}"#).unwrap();

        pamwatch()
            .current_dir(temp.path())
            .args(["--config", config.to_str().unwrap()])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("admingroups"));
    }
}

// ============================================
// Live Audit Tests (fake az on PATH)
// ============================================

#[cfg(unix)]
mod live_audit {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Install a fake `az` into its own directory and return a PATH
    /// value that resolves it first.
    fn fake_az(dir: &Path, script_body: &str) -> String {
        let bin_dir = dir.join("fakebin");
        fs::create_dir_all(&bin_dir).unwrap();
        let az = bin_dir.join("az");
        fs::write(&az, script_body).unwrap();
        fs::set_permissions(&az, fs::Permissions::from_mode(0o755)).unwrap();
        format!(
            "{}:{}",
            bin_dir.display(),
            std::env::var("PATH").unwrap_or_default()
        )
    }

    const HAPPY_AZ: &str = r#"#!/bin/sh
case "$*" in
  "ad signed-in-user show")
    echo '{"userPrincipalName": "auditor@example.com"}'
    ;;
  "ad user list")
    echo '[{"userPrincipalName":"alice@example.com"},{"userPrincipalName":"A-test-account"},{"userPrincipalName":"bob@example.com"}]'
    ;;
  "ad user get-member-groups --id alice@example.com")
    echo '[{"displayName":"Global Admins"},{"displayName":"Everyone"}]'
    ;;
  "ad user get-member-groups --id bob@example.com")
    echo '[{"displayName":"Everyone"}]'
    ;;
  *)
    echo '[]'
    ;;
esac
"#;

    const LOGGED_OUT_AZ: &str = r#"#!/bin/sh
echo "Please run 'az login' to setup account." >&2
exit 1
"#;

    #[test]
    fn session_gate_terminates_before_any_fetch() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), &["Global Admins"]);
        let path = fake_az(temp.path(), LOGGED_OUT_AZ);

        pamwatch()
            .current_dir(temp.path())
            .env("PATH", &path)
            .args(["--config", config.to_str().unwrap()])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("login session"));

        // Nothing was fetched, so nothing was snapshotted
        let leftovers = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with("_pam.json"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn live_audit_prints_membership_and_saves_a_snapshot() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let config = write_config(temp.path(), &["Global Admins"]);
        let path = fake_az(temp.path(), HAPPY_AZ);

        pamwatch()
            .current_dir(temp.path())
            .env("PATH", &path)
            .args([
                "--config",
                config.to_str().unwrap(),
                "--outputdir",
                out.path().to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Global Admins"))
            .stdout(predicate::str::contains("alice@example.com"))
            // platform accounts are never checked
            .stdout(predicate::str::contains("A-test-account").not())
            // unconfigured groups are never reported
            .stdout(predicate::str::contains("Everyone").not());

        let snapshots: Vec<_> = fs::read_dir(out.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with("_pam.json"))
            .collect();
        assert_eq!(snapshots.len(), 1);

        let content = fs::read_to_string(snapshots[0].path()).unwrap();
        assert!(content.contains("alice@example.com"));
        assert!(!content.contains("A-test-account"));
    }

    #[test]
    fn live_audit_json_emits_the_snapshot() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let config = write_config(temp.path(), &["Global Admins"]);
        let path = fake_az(temp.path(), HAPPY_AZ);

        pamwatch()
            .current_dir(temp.path())
            .env("PATH", &path)
            .args([
                "--json",
                "--config",
                config.to_str().unwrap(),
                "--outputdir",
                out.path().to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"admin_groups\""))
            .stdout(predicate::str::contains("\"Global Admins\""));
    }

    #[test]
    fn outputfile_overrides_the_dated_name() {
        let temp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let config = write_config(temp.path(), &["Global Admins"]);
        let path = fake_az(temp.path(), HAPPY_AZ);

        pamwatch()
            .current_dir(temp.path())
            .env("PATH", &path)
            .args([
                "--config",
                config.to_str().unwrap(),
                "--outputdir",
                out.path().to_str().unwrap(),
                "--outputfile",
                "custom_pam.json",
            ])
            .assert()
            .success();

        assert!(out.path().join("custom_pam.json").exists());
    }
}

// ============================================
// Report Mode Tests
// ============================================

mod report_mode {
    use super::*;

    #[test]
    fn diffs_the_two_most_recent_snapshots() {
        let temp = TempDir::new().unwrap();
        write_snapshot(
            temp.path(),
            "010126_00_pam.json",
            r#"{"GroupA": ["alice", "bob"]}"#,
        );
        write_snapshot(
            temp.path(),
            "010126_01_pam.json",
            r#"{"GroupA": ["alice", "carol"]}"#,
        );

        pamwatch()
            .args(["--report", "--inputdir", temp.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("carol"))
            .stdout(predicate::str::contains("bob"))
            // unchanged members are unreported
            .stdout(predicate::str::contains("alice").not())
            .stdout(predicate::str::contains("1 members added"))
            .stdout(predicate::str::contains("1 members removed"));
    }

    #[test]
    fn new_group_is_informational() {
        let temp = TempDir::new().unwrap();
        write_snapshot(temp.path(), "010126_00_pam.json", r#"{"GroupA": ["alice"]}"#);
        write_snapshot(
            temp.path(),
            "010126_01_pam.json",
            r#"{"GroupA": ["alice"], "GroupB": ["bob"]}"#,
        );

        pamwatch()
            .args(["--report", "--inputdir", temp.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("new admin group"))
            .stdout(predicate::str::contains("GroupB"));
    }

    #[test]
    fn identical_snapshots_report_no_changes() {
        let temp = TempDir::new().unwrap();
        write_snapshot(temp.path(), "010126_00_pam.json", r#"{"GroupA": ["alice"]}"#);
        write_snapshot(temp.path(), "010126_01_pam.json", r#"{"GroupA": ["alice"]}"#);

        pamwatch()
            .args(["--report", "--inputdir", temp.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("no membership changes"));
    }

    #[test]
    fn picks_snapshots_by_filename_date_not_lexicographic_order() {
        let temp = TempDir::new().unwrap();
        // 311225 (Dec 31 2025) predates 010126 (Jan 1 2026) even though
        // it sorts after it lexicographically.
        write_snapshot(temp.path(), "311225_00_pam.json", r#"{"GroupA": ["alice"]}"#);
        write_snapshot(
            temp.path(),
            "010126_00_pam.json",
            r#"{"GroupA": ["alice", "bob"]}"#,
        );

        pamwatch()
            .args(["--report", "--inputdir", temp.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 members added"));
    }

    #[test]
    fn single_snapshot_is_informational() {
        let temp = TempDir::new().unwrap();
        write_snapshot(temp.path(), "010126_00_pam.json", r#"{"GroupA": ["alice"]}"#);

        pamwatch()
            .args(["--report", "--inputdir", temp.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing to compare"));
    }

    #[test]
    fn no_snapshots_warns_and_exits_cleanly() {
        let temp = TempDir::new().unwrap();

        pamwatch()
            .args(["--report", "--inputdir", temp.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("No snapshots found"));
    }

    #[test]
    fn json_report_emits_the_delta() {
        let temp = TempDir::new().unwrap();
        write_snapshot(
            temp.path(),
            "010126_00_pam.json",
            r#"{"GroupA": ["alice", "bob"]}"#,
        );
        write_snapshot(
            temp.path(),
            "010126_01_pam.json",
            r#"{"GroupA": ["alice", "carol"]}"#,
        );

        let output = pamwatch()
            .args([
                "--report",
                "--json",
                "--inputdir",
                temp.path().to_str().unwrap(),
            ])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["groups"]["GroupA"]["added"][0], "carol");
        assert_eq!(parsed["groups"]["GroupA"]["removed"][0], "bob");
    }
}
