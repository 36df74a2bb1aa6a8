//! End-to-end tests for the dp binary

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

use defpp::config::Config;
use defpp::preprocessor::Preprocessor;
use defpp::{Value, parse};

fn cmd() -> Command {
    Command::cargo_bin("dp").unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_prints_dictionary_to_stdout() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "defs.yml", "a: 1\nb: \"{{ a }}\"\n");

    let output = cmd().arg("-f").arg(&root).output().unwrap();
    assert!(output.status.success());

    let dict = parse(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(dict["a"], Value::from(1));
    assert_eq!(dict["b"], Value::from("1"));
}

#[test]
fn test_writes_output_file() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "defs.yml", "x: 1\n!include more.yml\n");
    write(temp.path(), "more.yml", "x: 2\nname: \"item-{{ x }}\"\n");
    let out = temp.path().join("out.yml");

    cmd()
        .arg("-f")
        .arg(&root)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let dict = parse(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(dict["x"], Value::from(2));
    assert_eq!(dict["name"], Value::from("item-2"));
}

#[test]
fn test_dumps_processed_file() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "defs.yml", "a: 1\n!include b.yml\n");
    write(temp.path(), "b.yml", "b: \"{{ a }}\"\n");
    let merged = temp.path().join("merged.yml");

    cmd().arg("--inFile").arg(&root).arg("--pFile").arg(&merged).assert().success();

    let text = fs::read_to_string(&merged).unwrap();
    assert!(text.contains("#!! "));
    assert!(text.contains("b.yml !!"));
    assert!(text.contains("b: \"{{ ./a }}\""));
    assert!(!text.contains("!include"));
}

#[test]
fn test_cycle_warns_and_succeeds() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.yml", "a: 1\n!include b.yml\n");
    write(temp.path(), "b.yml", "b: 2\n!include a.yml\n");

    cmd()
        .arg("-f")
        .arg(&a)
        .assert()
        .success()
        .stdout(contains("a: 1").and(contains("b: 2")))
        .stderr(contains("File included twice"));
}

#[test]
fn test_strict_includes_fails_on_cycle() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.yml", "a: 1\n!include b.yml\n");
    write(temp.path(), "b.yml", "b: 2\n!include a.yml\n");

    cmd()
        .arg("-f")
        .arg(&a)
        .arg("--strict-includes")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_input_fails() {
    let temp = TempDir::new().unwrap();

    cmd()
        .arg("-f")
        .arg(temp.path().join("nope.yml"))
        .assert()
        .failure()
        .stderr(contains("nope.yml"));
}

#[test]
fn test_missing_include_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "defs.yml", "a: 1\n!include gone.yml\n");
    let out = temp.path().join("out.yml");

    cmd().arg("-f").arg(&root).arg("-o").arg(&out).assert().failure();
    assert!(!out.exists());
}

#[test]
fn test_max_iterations_stops_runaway_template() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "defs.yml", "a: \"x{{ a }}\"\n");

    cmd()
        .arg("-f")
        .arg(&root)
        .args(["--max-iterations", "10"])
        .assert()
        .failure()
        .stderr(contains("did not converge"));
}

#[test]
fn test_config_file_is_applied() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "defs.yml", "a: \"{{ missing }}\"\n");
    let config = write(temp.path(), "defpp.yml", "strict-templates: true\n");

    cmd().arg("-f").arg(&root).assert().success();
    cmd().arg("-f").arg(&root).arg("-c").arg(&config).assert().failure();
}

#[test]
fn test_unwritable_processed_file_is_not_fatal() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "defs.yml", "a: 1\n");
    let merged = temp.path().join("no").join("such").join("dir").join("merged.yml");

    cmd()
        .env_remove("RUST_LOG")
        .arg("-f")
        .arg(&root)
        .arg("-p")
        .arg(&merged)
        .assert()
        .success()
        .stdout(contains("a: 1"))
        .stderr(contains("Failed to write processed file"));
    assert!(!merged.exists());
}

#[test]
fn test_log_level_flag_overrides_config() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "defs.yml", "a: 1\n");
    let config = write(temp.path(), "defpp.yml", "log-level: error\n");

    cmd()
        .env_remove("RUST_LOG")
        .arg("-f")
        .arg(&root)
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stderr(contains("Templates converged").not());

    cmd()
        .env_remove("RUST_LOG")
        .arg("-f")
        .arg(&root)
        .arg("-c")
        .arg(&config)
        .args(["-l", "info"])
        .assert()
        .success()
        .stderr(contains("Templates converged"));
}

#[test]
fn test_library_matches_binary_output() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "defs.yml", "x: 1\n!include more.yml\n");
    write(temp.path(), "more.yml", "x: 2\nlabel: \"x={{ x }}\"\n");

    let processed = Preprocessor::new(&Config::default()).process(&root).unwrap();
    let expected = defpp::to_yaml(&processed.expansion.dictionary).unwrap();

    cmd().arg("-f").arg(&root).assert().success().stdout(expected);
}
