use std::path::Path;

use anyhow::Result;
use wasmer::*;
use wasmer_linker::{LinkManifest, Linker, ManifestError};

const MATH: &str = r#"(module
    (func (export "add") (param i32 i32) (result i32)
        local.get 0
        local.get 1
        i32.add))"#;

const MAIN: &str = r#"(module
    (import "env" "sum" (func $sum (param i32 i32) (result i32)))
    (func (export "run") (result i32)
        i32.const 20
        i32.const 22
        call $sum))"#;

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    std::fs::write(dir.join(name), contents)?;
    Ok(())
}

#[test_log::test]
fn apply_preloads_aliases_and_main() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "math.wat", MATH)?;
    write(dir.path(), "main.wat", MAIN)?;
    write(
        dir.path(),
        "link.toml",
        r#"
        main = "main.wat"

        [[preload]]
        name = "math"
        path = "math.wat"

        [[alias]]
        module = "env"
        name = "sum"
        from = ["math", "add"]
        "#,
    )?;

    let manifest = LinkManifest::from_path(dir.path().join("link.toml"))?;
    let mut store = Store::default();
    let mut linker = Linker::new(&mut store);
    let instance = manifest.apply(&mut linker)?.expect("main was requested");

    assert!(linker.contains("math", "add"));
    assert!(linker.contains("env", "sum"));

    let run = instance.exports.get_function("run")?;
    assert_eq!(run.call(linker.store_mut(), &[])?.to_vec(), vec![Value::I32(42)]);

    Ok(())
}

#[test]
fn rejected_manifest_leaves_linker_unchanged() -> Result<()> {
    let mut store = Store::default();
    let mut linker = Linker::new(&mut store);

    assert!(LinkManifest::from_toml_str("allow_shadowing = 2").is_err());
    assert!(!linker.shadowing_allowed());

    let manifest = LinkManifest::from_toml_str("allow_shadowing = true")?;
    manifest.apply(&mut linker)?;
    assert!(linker.shadowing_allowed());

    let manifest = LinkManifest::from_toml_str("")?;
    manifest.apply(&mut linker)?;
    assert!(linker.shadowing_allowed());

    Ok(())
}

#[test]
fn dangling_alias() -> Result<()> {
    let manifest = LinkManifest::from_toml_str(
        r#"
        [[alias]]
        module = "env"
        name = "f"
        from = ["nowhere", "f"]
        "#,
    )?;
    let mut store = Store::default();
    let mut linker = Linker::new(&mut store);

    let err = manifest.apply(&mut linker).unwrap_err();
    assert!(matches!(err, ManifestError::DanglingAlias { .. }));
    assert!(linker.is_empty());

    Ok(())
}

#[test]
fn trapping_main_is_reported_as_trap() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "main.wat", "(module (func unreachable) (start 0))")?;
    write(dir.path(), "link.toml", "main = \"main.wat\"")?;

    let manifest = LinkManifest::from_path(dir.path().join("link.toml"))?;
    let mut store = Store::default();
    let mut linker = Linker::new(&mut store);

    match manifest.apply(&mut linker).unwrap_err() {
        ManifestError::Instantiation { error, .. } => assert!(error.is_trap()),
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[test]
fn missing_module_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "link.toml", "main = \"absent.wasm\"")?;

    let manifest = LinkManifest::from_path(dir.path().join("link.toml"))?;
    let mut store = Store::default();
    let mut linker = Linker::new(&mut store);

    assert!(matches!(
        manifest.apply(&mut linker).unwrap_err(),
        ManifestError::Io { .. }
    ));

    Ok(())
}
