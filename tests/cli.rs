//! Integration tests for the `lg` binary.
//!
//! These tests exercise the full CLI against real Git repos, with the
//! global config isolated in a temp directory.

use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A repository plus an isolated home for config files.
struct Fixture {
    repo: TempDir,
    home: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let repo = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        run_git(repo.path(), &["init"]);
        run_git(repo.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run_git(repo.path(), &["config", "user.email", "test@example.com"]);
        run_git(repo.path(), &["config", "user.name", "Test User"]);
        run_git(repo.path(), &["config", "commit.gpgsign", "false"]);
        Self { repo, home }
    }

    fn commit(&self, message: &str) {
        run_git(
            self.repo.path(),
            &["commit", "--allow-empty", "-m", message],
        );
    }

    /// Get a command for running lg in this fixture.
    fn lg(&self) -> Command {
        let mut cmd = Command::cargo_bin("lg").unwrap();
        cmd.current_dir(self.repo.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join("xdg"))
            .env("LANEGRAPH_CONFIG", self.home.path().join("config.toml"))
            .env_remove("LANEGRAPH_LOG");
        cmd
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("lg")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lg"));
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("lg")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("graph").and(predicate::str::contains("completion")));
}

#[test]
fn graph_prints_one_row_per_commit() {
    let fx = Fixture::new();
    fx.commit("first");
    fx.commit("second");
    fx.commit("third");

    fx.lg()
        .arg("graph")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("(main) third")
                .and(predicate::str::contains("second"))
                .and(predicate::str::contains("first"))
                .and(predicate::function(|out: &str| out.lines().count() == 3)),
        );
}

#[test]
fn graph_respects_max_rows_and_no_decorate() {
    let fx = Fixture::new();
    fx.commit("first");
    fx.commit("second");

    fx.lg()
        .args(["graph", "--max-rows", "1", "--no-decorate"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("second")
                .and(predicate::str::contains("(main)").not())
                .and(predicate::str::contains("first").not()),
        );
}

#[test]
fn graph_json_output() {
    let fx = Fixture::new();
    fx.commit("first");
    fx.commit("second");

    let output = fx
        .lg()
        .args(["graph", "--json", "--batch-size", "1", "--threads", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["outcome"]["batches"], 2);
    assert_eq!(value["outcome"]["cancelled"], false);
    assert_eq!(value["rows"][0]["commit"]["summary"], "second");
    assert_eq!(value["rows"][0]["refs"][0], "main");
    assert_eq!(value["rows"][1]["lines"][0]["child_index"], 0);
}

#[test]
fn graph_all_includes_every_branch() {
    let fx = Fixture::new();
    fx.commit("base");
    run_git(fx.repo.path(), &["checkout", "-b", "topic"]);
    fx.commit("on topic");
    run_git(fx.repo.path(), &["checkout", "main"]);
    fx.commit("on main");

    fx.lg()
        .args(["graph", "--all"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("(topic) on topic")
                .and(predicate::str::contains("(main) on main"))
                .and(predicate::function(|out: &str| out.lines().count() == 3)),
        );
}

#[test]
fn graph_of_empty_repository_prints_nothing() {
    let fx = Fixture::new();

    fx.lg().arg("graph").assert().success().stdout("");
}

#[test]
fn graph_unknown_revision_fails() {
    let fx = Fixture::new();
    fx.commit("first");

    fx.lg()
        .args(["graph", "no-such-branch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-branch"));
}

#[test]
fn graph_outside_repository_fails() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("lg")
        .unwrap()
        .args(["graph", "--cwd"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open repository"));
}

#[test]
fn config_set_then_show() {
    let fx = Fixture::new();
    fx.commit("first");

    fx.lg()
        .args(["config", "set", "layout.batch_size", "64"])
        .assert()
        .success();
    assert!(fx.repo.path().join(".git/lanegraph/config.toml").exists());

    fx.lg()
        .args(["config", "get", "layout.batch_size"])
        .assert()
        .success()
        .stdout("64\n");

    fx.lg()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("layout.batch_size = 64")
                .and(predicate::str::contains("display.decorate = true")),
        );
}

#[test]
fn config_global_is_overridden_by_repo() {
    let fx = Fixture::new();
    fx.commit("first");

    fx.lg()
        .args(["config", "set", "--global", "layout.threads", "3"])
        .assert()
        .success();
    assert!(fx.home.path().join("config.toml").exists());
    fx.lg()
        .args(["config", "get", "layout.threads"])
        .assert()
        .success()
        .stdout("3\n");

    fx.lg()
        .args(["config", "set", "layout.threads", "5"])
        .assert()
        .success();
    fx.lg()
        .args(["config", "get", "layout.threads"])
        .assert()
        .success()
        .stdout("5\n");
}

#[test]
fn config_rejects_invalid_values() {
    let fx = Fixture::new();
    fx.lg()
        .args(["config", "set", "layout.threads", "9999"])
        .assert()
        .failure();
    fx.lg()
        .args(["config", "get", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn completion_generates_script() {
    Command::cargo_bin("lg")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lg"));
}
