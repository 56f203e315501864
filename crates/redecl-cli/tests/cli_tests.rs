//! Integration tests for the `redecl` binary

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use redecl_reflect::*;
use tempfile::{tempdir, TempDir};

fn write_snapshot(dir: &Path) -> PathBuf {
    let mut graph = Snapshot::new();
    let object = graph.push(ReflectedObject::new(
        "Object",
        "/Script/CoreUObject",
        ObjectKind::Class(ClassDescriptor {
            flags: ClassFlags::NATIVE,
            ..Default::default()
        }),
    ));
    graph.push(ReflectedObject::new(
        "Door",
        "/Script/Game",
        ObjectKind::Class(ClassDescriptor {
            flags: ClassFlags::NATIVE,
            super_class: Some(object),
            fields: vec![FieldDescriptor::new("Angle", FieldKind::Float)],
            ..Default::default()
        }),
    ));
    graph.push(ReflectedObject::new(
        "EDoorState",
        "/Script/Game",
        ObjectKind::Enum(EnumDescriptor::new(
            EnumForm::EnumClass,
            [("EDoorState::Open", 0), ("EDoorState::Closed", 1)],
        )),
    ));

    let path = dir.join("snapshot.json");
    graph.save(&path).unwrap();
    path
}

fn redecl() -> Command {
    let mut cmd = Command::cargo_bin("redecl").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let snapshot = write_snapshot(dir.path());
    (dir, snapshot)
}

#[test]
fn test_dump_writes_files_and_summary() {
    let (dir, snapshot) = workspace();
    let out = dir.path().join("Source");

    redecl()
        .arg("dump")
        .arg(&snapshot)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"))
        .stdout(predicate::str::contains("Game"))
        .stdout(predicate::str::contains("1 diagnostics"))
        .stdout(predicate::str::contains("Door::Angle"));

    assert!(out.join("Game/Public/Door.h").exists());
    assert!(out.join("Game/Private/Door.cpp").exists());
    assert!(out.join("Game/Public/EDoorState.h").exists());
    assert!(out.join("Game/Game.Build.cs").exists());
    assert!(out.join("Game/Private/GameModule.cpp").exists());

    let header = std::fs::read_to_string(out.join("Game/Public/Door.h")).unwrap();
    assert!(header.contains("class UDoor : public UObject {"));
}

#[test]
fn test_dump_without_build_files() {
    let (dir, snapshot) = workspace();
    let out = dir.path().join("Source");

    redecl()
        .args(["dump", "--no-build-files", "-o"])
        .arg(&out)
        .arg(&snapshot)
        .assert()
        .success();

    assert!(out.join("Game/Public/Door.h").exists());
    assert!(!out.join("Game/Game.Build.cs").exists());
}

#[test]
fn test_dump_honors_config_file() {
    let (dir, snapshot) = workspace();
    let out = dir.path().join("Source");
    let config = dir.path().join("redecl.toml");
    std::fs::write(&config, "[modules]\nprimary = \"Game\"\n").unwrap();

    redecl()
        .arg("dump")
        .arg(&snapshot)
        .arg("-o")
        .arg(&out)
        .arg("-c")
        .arg(&config)
        .assert()
        .success();

    let module = std::fs::read_to_string(out.join("Game/Private/GameModule.cpp")).unwrap();
    assert!(module.contains("IMPLEMENT_PRIMARY_GAME_MODULE"));
}

#[test]
fn test_invalid_config_fails() {
    let (dir, snapshot) = workspace();
    let config = dir.path().join("redecl.toml");
    std::fs::write(&config, "[modules]\nignored = [\"\"]\n").unwrap();

    redecl()
        .arg("dump")
        .arg(&snapshot)
        .arg("-o")
        .arg(dir.path().join("Source"))
        .arg("-c")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}

#[test]
fn test_missing_snapshot_fails() {
    let dir = tempdir().unwrap();

    redecl()
        .arg("dump")
        .arg(dir.path().join("absent.json"))
        .arg("-o")
        .arg(dir.path().join("Source"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load snapshot"));
}

#[test]
fn test_malformed_snapshot_fails() {
    let dir = tempdir().unwrap();
    let snapshot = dir.path().join("broken.json");
    std::fs::write(&snapshot, "{ not json").unwrap();

    redecl()
        .arg("inspect")
        .arg(&snapshot)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_inspect_lists_planned_files() {
    let (dir, snapshot) = workspace();

    redecl()
        .arg("inspect")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("Game (2 objects)"))
        .stdout(predicate::str::contains("Door.h"))
        .stdout(predicate::str::contains("EDoorState.h"))
        .stdout(predicate::str::contains("Object").not());

    // Inspection never writes
    assert!(!dir.path().join("Source").exists());
}

#[test]
fn test_color_flag_is_validated() {
    let (_dir, snapshot) = workspace();

    redecl()
        .args(["--color", "sometimes", "inspect"])
        .arg(&snapshot)
        .assert()
        .failure();

    redecl()
        .args(["--color", "never", "inspect"])
        .arg(&snapshot)
        .assert()
        .success();
}
