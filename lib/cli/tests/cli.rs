//! Basic tests for the `wasm-link` subcommands

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

const MATH: &str = r#"(module
    (func (export "add") (param i32 i32) (result i32)
        local.get 0
        local.get 1
        i32.add))"#;

const APP: &str = r#"(module
    (import "math" "add" (func $add (param i32 i32) (result i32)))
    (func (export "run") (param i32) (result i32)
        local.get 0
        i32.const 1
        call $add))"#;

fn wasm_link() -> Command {
    Command::cargo_bin("wasm-link").unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn run_with_preload() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "math.wat", MATH);
    write(dir.path(), "app.wat", APP);

    wasm_link()
        .current_dir(dir.path())
        .args(["run", "--preload", "math=math.wat", "app.wat", "--invoke", "run", "41"])
        .assert()
        .success()
        .stdout("42\n");
}

#[test]
fn missing_import_is_a_link_failure() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app.wat", APP);

    wasm_link()
        .current_dir(dir.path())
        .args(["run", "app.wat"])
        .assert()
        .code(2)
        .stderr(contains("unknown import"));
}

#[test]
fn start_trap_has_its_own_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "trap.wat", "(module (func unreachable) (start 0))");

    wasm_link()
        .current_dir(dir.path())
        .args(["run", "trap.wat"])
        .assert()
        .code(3)
        .stderr(contains("start function trapped"));
}

#[test]
fn duplicate_preload_needs_shadowing() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "math.wat", MATH);
    write(dir.path(), "app.wat", APP);
    let args = [
        "run",
        "--preload",
        "math=math.wat",
        "--preload",
        "math=math.wat",
        "app.wat",
    ];

    wasm_link()
        .current_dir(dir.path())
        .args(args)
        .assert()
        .code(2)
        .stderr(contains("already defined"));

    wasm_link()
        .current_dir(dir.path())
        .args(args)
        .arg("--allow-shadowing")
        .assert()
        .success();
}

#[test]
fn manifest_command() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "math.wat", MATH);
    write(dir.path(), "app.wat", APP);
    write(
        dir.path(),
        "link.toml",
        r#"
        main = "app.wat"

        [[preload]]
        name = "math"
        path = "math.wat"
        "#,
    );

    wasm_link()
        .args(["manifest", "--invoke", "run"])
        .arg(dir.path().join("link.toml"))
        .arg("1")
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn malformed_manifest_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "link.toml", "allow_shadowing = 2");

    wasm_link()
        .arg("manifest")
        .arg(dir.path().join("link.toml"))
        .assert()
        .code(1)
        .stderr(contains("invalid manifest"));
}

#[test]
fn inspect_reports_resolution() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "math.wat", MATH);
    write(dir.path(), "app.wat", APP);

    wasm_link()
        .current_dir(dir.path())
        .args(["inspect", "app.wat"])
        .assert()
        .success()
        .stdout(contains("\"math\".\"add\"").and(contains("[unresolved]")));

    wasm_link()
        .current_dir(dir.path())
        .args(["inspect", "--preload", "math=math.wat", "app.wat"])
        .assert()
        .success()
        .stdout(contains("[ok]"))
        .stdout(contains("\"run\""));
}
