//! CLI integration tests for picvault-cli.
//!
//! These tests run the actual binary against throwaway repositories and
//! check outputs, exit codes, and file artifacts.

use assert_cmd::Command;
use image::{ImageBuffer, Rgb, RgbImage};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a Command for the picvault binary.
fn picvault() -> Command {
    let mut cmd = Command::cargo_bin("picvault").unwrap();
    cmd.env_remove("PICVAULT_KEY_PATH")
        .env_remove("PICVAULT_TABLE_PATH")
        .env_remove("RUST_LOG");
    cmd
}

/// Command bound to a repository directory.
fn picvault_in(repo: &Path) -> Command {
    let mut cmd = picvault();
    cmd.arg("--repo").arg(repo);
    cmd
}

fn write_png(dir: &Path, file_name: &str) {
    let img: RgbImage = ImageBuffer::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 90]));
    img.save(dir.join(file_name)).unwrap();
}

fn store_tagged(repo: &Path, source: &Path, keywords: &str, features: &str) {
    picvault_in(repo)
        .args(["store", "--keywords", keywords, "--features", features])
        .arg(source)
        .assert()
        .success();
}

fn listed(repo: &Path) -> Vec<serde_json::Value> {
    let output = picvault_in(repo).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("list --json should print a JSON array")
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    picvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted image repository"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("store"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("extract"));
}

#[test]
fn test_version_displays_version() {
    picvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("picvault"));
}

#[test]
fn test_help_shows_exit_codes() {
    picvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("65"))
        .stdout(predicate::str::contains("77"));
}

#[test]
fn test_store_help_shows_options() {
    picvault()
        .args(["store", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--keywords"))
        .stdout(predicate::str::contains("--features"))
        .stdout(predicate::str::contains("--public"))
        .stdout(predicate::str::contains("--password"))
        .stdout(predicate::str::contains("--dry-run"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_key_once() {
    let repo = TempDir::new().unwrap();

    picvault_in(repo.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created new key"))
        .stdout(predicate::str::contains("Fingerprint:"));

    let key = fs::read(repo.path().join("key.key")).unwrap();
    assert_eq!(key.len(), 32);

    picvault_in(repo.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded existing key"));

    assert_eq!(fs::read(repo.path().join("key.key")).unwrap(), key);
}

#[test]
fn test_init_quiet_prints_stable_fingerprint() {
    let repo = TempDir::new().unwrap();

    let first = picvault_in(repo.path()).args(["-q", "init"]).output().unwrap();
    let second = picvault_in(repo.path()).args(["-q", "init"]).output().unwrap();

    assert!(first.status.success());
    assert!(!first.stdout.is_empty());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_malformed_key_returns_io_error() {
    let repo = TempDir::new().unwrap();
    fs::write(repo.path().join("key.key"), b"not 32 bytes").unwrap();

    // Exit code 74 = EX_IOERR
    picvault_in(repo.path())
        .arg("init")
        .assert()
        .code(74)
        .stderr(predicate::str::contains("Failed to initialize key"));
}

#[test]
fn test_key_and_table_flags_override_repo() {
    let temp = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "one.png");
    let key = temp.path().join("secrets").join("vault.key");
    let table = temp.path().join("rows.csv");

    picvault()
        .arg("--key")
        .arg(&key)
        .arg("--table")
        .arg(&table)
        .args(["store", "-k", "k", "-f", "f"])
        .arg(images.path())
        .current_dir(temp.path())
        .assert()
        .success();

    assert!(key.exists());
    assert!(table.exists());
    assert!(!temp.path().join("data.csv").exists());
}

// ============================================================================
// Store Tests
// ============================================================================

#[test]
fn test_store_filters_extensions_and_skips_duplicates() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "a.png");
    write_png(images.path(), "c.PNG");
    fs::write(images.path().join("b.txt"), "notes").unwrap();

    picvault_in(repo.path())
        .args(["store", "-k", "k", "-f", "f"])
        .arg(images.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 stored"))
        .stdout(predicate::str::contains("2 unsupported"));

    picvault_in(repo.path())
        .args(["store", "-k", "k", "-f", "f"])
        .arg(images.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 stored"))
        .stdout(predicate::str::contains("duplicate image not added"));

    let records = listed(repo.path());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "a");
    assert_eq!(records[0]["access"], "private");
}

#[test]
fn test_store_single_file() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "only.png");
    write_png(images.path(), "other.png");

    store_tagged(repo.path(), &images.path().join("only.png"), "k", "f");

    let records = listed(repo.path());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "only");
}

#[test]
fn test_store_missing_path_returns_input_error() {
    let repo = TempDir::new().unwrap();

    // Exit code 66 = EX_NOINPUT
    picvault_in(repo.path())
        .args(["store", "-k", "k", "-f", "f", "does_not_exist"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to store images"));
}

#[test]
fn test_store_prompts_for_missing_metadata() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "garden.png");

    picvault_in(repo.path())
        .arg("store")
        .arg(images.path())
        .write_stdin("dog, park\nbrown\nmaybe\ny\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("keywords for garden"))
        .stderr(predicate::str::contains("Please answer y or n."))
        .stdout(predicate::str::contains("keywords for garden").not());

    let records = listed(repo.path());
    assert_eq!(records[0]["keywords"], serde_json::json!(["dog", "park"]));
    assert_eq!(records[0]["features"], serde_json::json!(["brown"]));
    assert_eq!(records[0]["access"], "public");
}

#[test]
fn test_store_closed_input_returns_usage_error() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "garden.png");

    // Exit code 64 = EX_USAGE
    picvault_in(repo.path())
        .args(["store", "--keywords", "dog"])
        .arg(images.path())
        .write_stdin("")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("input closed"));

    assert!(!repo.path().join("data.csv").exists());
}

#[test]
fn test_store_dry_run_writes_nothing() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "a.png");
    fs::write(images.path().join("b.txt"), "notes").unwrap();

    picvault_in(repo.path())
        .args(["store", "--dry-run"])
        .arg(images.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY RUN]"))
        .stdout(predicate::str::contains("unsupported type"));

    assert!(!repo.path().join("key.key").exists());
    assert!(!repo.path().join("data.csv").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn test_store_dry_run_lists_undecodable_name_as_failure() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "a.png");
    fs::write(images.path().join(OsStr::from_bytes(b"bad\xff.png")), b"x").unwrap();

    picvault_in(repo.path())
        .args(["store", "--dry-run"])
        .arg(images.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("would fail"))
        .stdout(predicate::str::contains("a.png"));
}

// ============================================================================
// Search Tests
// ============================================================================

#[test]
fn test_search_is_case_insensitive_on_query() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "first_dog.png");
    store_tagged(repo.path(), images.path(), "dog,park", "brown");

    picvault_in(repo.path())
        .args(["search", "keywords", "Dog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("first_dog"));

    picvault_in(repo.path())
        .args(["search", "features", "BROWN, black"])
        .assert()
        .success()
        .stdout(predicate::str::contains("first_dog"));
}

#[test]
fn test_search_does_not_match_partial_tokens() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "first_dog.png");
    store_tagged(repo.path(), images.path(), "dog", "brown");

    picvault_in(repo.path())
        .args(["search", "keywords", "doggo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No images matched"));
}

#[test]
fn test_search_json_output() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "a.png");
    write_png(images.path(), "b.png");
    store_tagged(repo.path(), &images.path().join("a.png"), "cat", "white");
    store_tagged(repo.path(), &images.path().join("b.png"), "dog", "white");

    let output = picvault_in(repo.path())
        .args(["search", "keywords", "dog", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let hits: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "b");
    assert!(hits[0].get("image_code").is_none());
}

#[test]
fn test_malformed_table_returns_data_error() {
    let repo = TempDir::new().unwrap();
    fs::write(repo.path().join("data.csv"), "name,code\nx,y\n").unwrap();

    // Exit code 65 = EX_DATAERR
    picvault_in(repo.path())
        .arg("list")
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Failed to read record table"));
}

// ============================================================================
// Extract Tests
// ============================================================================

#[test]
fn test_extract_writes_decrypted_image() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_png(images.path(), "first_dog.png");
    store_tagged(repo.path(), images.path(), "dog", "brown");

    picvault_in(repo.path())
        .args(["extract", "first_dog"])
        .current_dir(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Image decrypted"));

    let extracted = out.path().join("first_dog.png");
    let decoded = image::open(&extracted).expect("Extracted file should be a PNG");
    assert_eq!((decoded.width(), decoded.height()), (8, 8));
}

#[test]
fn test_extract_refuses_to_replace_existing_file() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_png(images.path(), "first_dog.png");
    store_tagged(repo.path(), images.path(), "dog", "brown");
    let existing = out.path().join("first_dog.png");
    fs::write(&existing, b"keep me").unwrap();

    // Exit code 73 = EX_CANTCREAT
    picvault_in(repo.path())
        .args(["extract", "first_dog"])
        .current_dir(out.path())
        .assert()
        .code(73)
        .stderr(predicate::str::contains("--force"));
    assert_eq!(fs::read(&existing).unwrap(), b"keep me");

    picvault_in(repo.path())
        .args(["extract", "first_dog", "--force"])
        .current_dir(out.path())
        .assert()
        .success();
    assert!(fs::read(&existing).unwrap().starts_with(b"\x89PNG"));
}

#[test]
fn test_extract_to_explicit_output() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "pic.png");
    store_tagged(repo.path(), images.path(), "k", "f");

    let target = images.path().join("restored.img");
    picvault_in(repo.path())
        .args(["extract", "pic", "--output"])
        .arg(&target)
        .assert()
        .success();

    assert!(fs::read(&target).unwrap().starts_with(b"\x89PNG"));
}

#[test]
fn test_extract_unknown_name_returns_input_error() {
    let repo = TempDir::new().unwrap();

    // Exit code 66 = EX_NOINPUT
    picvault_in(repo.path())
        .args(["extract", "ghost"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("No record named"));
}

#[test]
fn test_extract_with_replaced_key_returns_data_error() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "pic.png");
    store_tagged(repo.path(), images.path(), "k", "f");

    fs::write(repo.path().join("key.key"), [0x42u8; 32]).unwrap();

    // Exit code 65 = EX_DATAERR
    picvault_in(repo.path())
        .args(["extract", "pic", "--output"])
        .arg(images.path().join("out.png"))
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Integrity check failed"));

    assert!(!images.path().join("out.png").exists());
}

#[test]
fn test_password_gates_extraction() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "locked.png");
    let target = images.path().join("out.png");

    picvault_in(repo.path())
        .args(["store", "-k", "k", "-f", "f", "--public", "--password", "hunter2"])
        .arg(images.path())
        .assert()
        .success();

    // Exit code 77 = EX_NOPERM
    picvault_in(repo.path())
        .args(["extract", "locked", "--output"])
        .arg(&target)
        .assert()
        .code(77);

    picvault_in(repo.path())
        .args(["extract", "locked", "--password", "wrong", "--output"])
        .arg(&target)
        .assert()
        .code(77);

    picvault_in(repo.path())
        .args(["extract", "locked", "--password", "hunter2", "--output"])
        .arg(&target)
        .assert()
        .success();
    assert!(target.exists());

    let records = listed(repo.path());
    assert_eq!(records[0]["protected"], true);
    assert_eq!(records[0]["access"], "public");
}

// ============================================================================
// Quiet and Color Tests
// ============================================================================

#[test]
fn test_quiet_store_prints_only_names() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "a.png");
    write_png(images.path(), "b.png");

    picvault_in(repo.path())
        .args(["--quiet", "store", "-k", "k", "-f", "f"])
        .arg(images.path())
        .assert()
        .success()
        .stdout("a\nb\n");
}

#[test]
fn test_quiet_store_keeps_prompts_off_stdout() {
    let repo = TempDir::new().unwrap();
    let images = TempDir::new().unwrap();
    write_png(images.path(), "garden.png");

    picvault_in(repo.path())
        .args(["--quiet", "store"])
        .arg(images.path())
        .write_stdin("dog\nbrown\nn\n\n")
        .assert()
        .success()
        .stdout("garden\n")
        .stderr(predicate::str::contains("keywords for garden"));
}

#[test]
fn test_color_never_no_ansi() {
    let repo = TempDir::new().unwrap();

    let output = picvault_in(repo.path())
        .args(["--color=never", "init"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    assert!(!stdout.contains("\x1b["), "Output should have no ANSI codes");
}
