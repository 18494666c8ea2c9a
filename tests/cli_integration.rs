//! Integration tests for the Shroud CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Every test gets its own HOME and config directory, with cheap Argon2
//! settings, and passes the master password through `SHROUD_PASSWORD`
//! so no interactive prompt is ever shown.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "integration-pw";

/// An isolated environment: fake HOME, config with fast KDF, vault dir.
struct Sandbox {
    tmp: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        tmp.child("config/shroud").create_dir_all().unwrap();
        tmp.child("config/shroud/config.toml")
            .write_str("argon2_memory_kib = 8192\nargon2_iterations = 1\nargon2_parallelism = 1\n")
            .unwrap();
        Self { tmp }
    }

    fn vault_dir(&self) -> std::path::PathBuf {
        self.tmp.path().join("vault")
    }

    /// A `shroud` command wired to this sandbox.
    fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("shroud").expect("binary should exist");
        cmd.env("HOME", self.tmp.path())
            .env("XDG_CONFIG_HOME", self.tmp.path().join("config"))
            .env("SHROUD_DIR", self.vault_dir())
            .env("SHROUD_PASSWORD", PASSWORD)
            .env_remove("SHROUD_LOG");
        cmd
    }

    fn init(&self) {
        self.cmd().arg("init").assert().success();
    }
}

/// Helper: a `shroud` command with no environment set up.
fn shroud() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("shroud").expect("binary should exist")
}

// ---------------------------------------------------------------------------
// Help and usage
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    shroud()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted secret vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("reveal"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn version_flag_shows_version() {
    shroud()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shroud"));
}

#[test]
fn no_args_shows_help() {
    shroud()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn completions_for_bash() {
    shroud()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shroud"));
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_vault_metadata() {
    let sb = Sandbox::new();

    sb.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault created"));

    let meta = std::fs::read_to_string(sb.vault_dir().join(".metadata.json")).unwrap();
    assert!(meta.contains("masterPubKey"));
    assert!(meta.contains("m=8192,t=1,p=1"));
}

#[test]
fn init_twice_is_harmless() {
    let sb = Sandbox::new();
    sb.init();
    let before = std::fs::read(sb.vault_dir().join(".metadata.json")).unwrap();

    sb.cmd()
        .arg("init")
        .env("SHROUD_PASSWORD", "another-password")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));

    let after = std::fs::read(sb.vault_dir().join(".metadata.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn init_rejects_short_password() {
    let sb = Sandbox::new();
    sb.cmd()
        .arg("init")
        .env("SHROUD_PASSWORD", "short")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
}

#[test]
fn list_before_init_creates_no_vault_dir() {
    let sb = Sandbox::new();
    sb.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No matching secrets"));

    assert!(!sb.vault_dir().exists());
}

#[test]
fn add_before_init_fails() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["add", "k", "v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has not been initialized"));
}

// ---------------------------------------------------------------------------
// Secret lifecycle
// ---------------------------------------------------------------------------

#[test]
fn add_reveal_update_remove_flow() {
    let sb = Sandbox::new();
    sb.init();

    sb.cmd()
        .args(["add", "work/github", "ghp_first"])
        .assert()
        .success()
        .stdout(predicate::str::contains("added to category 'work'"));

    sb.cmd()
        .args(["reveal", "github", "--category", "work"])
        .assert()
        .success()
        .stdout("ghp_first\n");

    sb.cmd()
        .args(["update", "work/github", "ghp_second"])
        .assert()
        .success();

    sb.cmd()
        .args(["reveal", "work/github"])
        .assert()
        .success()
        .stdout("ghp_second\n");

    sb.cmd()
        .args(["remove", "work/github", "--force"])
        .assert()
        .success();

    assert!(!sb.vault_dir().join("work").exists());
}

#[test]
fn add_reads_value_from_stdin() {
    let sb = Sandbox::new();
    sb.init();

    sb.cmd()
        .args(["add", "piped"])
        .write_stdin("from-a-pipe\n")
        .assert()
        .success();

    sb.cmd()
        .args(["reveal", "piped"])
        .assert()
        .success()
        .stdout("from-a-pipe\n");
}

#[test]
fn add_duplicate_fails() {
    let sb = Sandbox::new();
    sb.init();
    sb.cmd().args(["add", "k", "one"]).assert().success();

    sb.cmd()
        .args(["add", "k", "two"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn reveal_with_wrong_password_fails() {
    let sb = Sandbox::new();
    sb.init();
    sb.cmd().args(["add", "k", "v"]).assert().success();

    sb.cmd()
        .args(["reveal", "k"])
        .env("SHROUD_PASSWORD", "wrong-password")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid master password"));
}

#[test]
fn reveal_missing_secret_fails() {
    let sb = Sandbox::new();
    sb.init();

    sb.cmd()
        .args(["reveal", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No secret found for ghost"));
}

#[test]
fn update_missing_secret_fails() {
    let sb = Sandbox::new();
    sb.init();

    sb.cmd()
        .args(["update", "ghost", "v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No secret found"));
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[test]
fn list_shows_names_and_filters() {
    let sb = Sandbox::new();
    sb.init();
    sb.cmd().args(["add", "butts.com", "1"]).assert().success();
    sb.cmd().args(["add", "b/butts.com", "2"]).assert().success();
    sb.cmd().args(["add", "c/x.com", "3"]).assert().success();

    sb.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("butts.com"))
        .stdout(predicate::str::contains("x.com"))
        .stdout(predicate::str::contains("3 secret(s) in 3 categories"));

    sb.cmd()
        .args(["list", "--pattern", "BUTT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("x.com").not())
        .stdout(predicate::str::contains("2 secret(s) in 2 categories"));
}

#[test]
fn list_unknown_category_fails() {
    let sb = Sandbox::new();
    sb.init();

    sb.cmd()
        .args(["list", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No category found for nowhere"));
}

#[test]
fn list_with_bad_pattern_fails() {
    let sb = Sandbox::new();
    sb.init();

    sb.cmd()
        .args(["list", "--pattern", "("])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid list pattern"));
}

#[test]
fn data_dir_flag_overrides_env() {
    let sb = Sandbox::new();
    let other = sb.tmp.path().join("elsewhere");

    sb.cmd()
        .args(["init", "--data-dir"])
        .arg(&other)
        .assert()
        .success();

    assert!(other.join(".metadata.json").is_file());
    assert!(!sb.vault_dir().join(".metadata.json").exists());
}
