//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn repocache() -> Command {
    let mut cmd = Command::cargo_bin("repocache").unwrap();
    // Keep the caller's environment out of env-backed flags.
    for var in [
        "DATABASE_URL",
        "GITHUB_TOKEN",
        "GITHUB_API_URL",
        "PORT",
        "BIND_ADDR",
        "RATE_LIMIT_MAX",
        "RATE_LIMIT_WINDOW_SECS",
        "UPSTREAM_TIMEOUT_SECS",
        "DATABASE_MAX_CONNECTIONS",
        "TRUST_PROXY",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_top_level_help_lists_commands() {
    repocache()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn test_version() {
    repocache()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_serve_help() {
    repocache()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--in-memory"))
        .stdout(predicate::str::contains("--rate-limit-max"))
        .stdout(predicate::str::contains("--github-token"))
        .stdout(predicate::str::contains("--trust-proxy"));
}

#[test]
fn test_serve_requires_database_or_in_memory() {
    repocache()
        .current_dir(std::env::temp_dir())
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--database-url"));
}

#[test]
fn test_migrate_requires_database_url() {
    repocache()
        .current_dir(std::env::temp_dir())
        .arg("migrate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--database-url"));
}

#[test]
fn test_unknown_command_fails() {
    repocache().arg("frobnicate").assert().failure();
}
