use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    dir: TempDir,
    config: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = dir.path().join("config");
        Self { dir, config }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_keyoverlay"))
            .arg("--config-dir")
            .arg(&self.config)
            .args(args)
            .output()
            .expect("Failed to execute binary")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            println!("STDOUT:\n{}", stdout);
            println!("STDERR:\n{}", String::from_utf8_lossy(&output.stderr));
            panic!("keyoverlay {:?} failed", args);
        }
        stdout
    }
}

fn as_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_cli_lists_presets() {
    let ctx = TestContext::new();
    let stdout = ctx.run_ok(&["presets"]);
    for id in ["full", "no_fkeys", "left_half", "wasd", "numpad", "azerty"] {
        assert!(stdout.contains(id), "missing {}", id);
    }
    assert!(stdout.contains("Gaming / WASD"));
}

#[test]
fn test_cli_show_with_held_keys() {
    let ctx = TestContext::new();
    let stdout = ctx.run_ok(&["show", "wasd", "--pressed", "w,mouse:left"]);
    assert!(stdout.contains("Gaming / WASD"));
    assert!(stdout.contains("LMB"));
    assert!(stdout.contains("Overlay size:"));
}

#[test]
fn test_cli_unknown_layout_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["show", "dvorak"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not Found"));
}

#[test]
fn test_cli_export_writes_versioned_document() {
    let ctx = TestContext::new();
    let stdout = ctx.run_ok(&["export", "numpad"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["name"], "Numpad");
    assert_eq!(value["cells"].as_array().unwrap().len(), 16);
}

#[test]
fn test_cli_edit_then_reload_saved_layout() {
    let ctx = TestContext::new();
    ctx.run_ok(&[
        "edit",
        "wasd",
        "-x",
        "move w 2.3 4.7",
        "-x",
        "label space Jump",
        "-x",
        "delete esc",
        "--save-as",
        "mine",
    ]);

    let listing = ctx.run_ok(&["layouts", "list"]);
    assert!(listing.contains("mine"));

    let out = ctx.path("mine.json");
    ctx.run_ok(&["export", "mine", "-o", as_str(&out)]);
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let cells = value["cells"].as_array().unwrap();
    let w = cells.iter().find(|c| c["id"] == "w").unwrap();
    assert_eq!((w["x"].as_f64(), w["y"].as_f64()), (Some(2.0), Some(5.0)));
    assert!(cells.iter().any(|c| c["label"] == "Jump"));
    assert!(!cells.iter().any(|c| c["id"] == "esc"));
}

#[test]
fn test_cli_edit_conflict_is_reported() {
    let ctx = TestContext::new();
    let output = ctx.run(&["edit", "wasd", "-x", "bind q KEY_W", "--save-as", "bad"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Binding Conflict"));
    assert!(!ctx.config.join("configs").join("bad.json").exists());
}

#[test]
fn test_cli_validate_reports_each_file() {
    let ctx = TestContext::new();
    let good = ctx.path("good.json");
    ctx.run_ok(&["export", "wasd", "-o", as_str(&good)]);
    let bad = ctx.path("bad.json");
    fs::write(&bad, r#"{"version": 1, "name": "x", "cells": ["#).unwrap();

    assert!(ctx.run_ok(&["validate", as_str(&good)]).contains("✅"));

    let output = ctx.run(&["validate", as_str(&good), as_str(&bad)]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✅"));
    assert!(stdout.contains("❌"));
}

#[test]
fn test_cli_replay_script() {
    let ctx = TestContext::new();
    let script = ctx.path("typing.txt");
    fs::write(
        &script,
        "# hold a, tap w\ndown a\ndown w\ndown w\nup w\ndown mouse:left\nup mouse:left\n",
    )
    .unwrap();

    let stdout = ctx.run_ok(&["replay", "wasd", as_str(&script), "--verbose"]);
    assert!(stdout.contains("▼ w"));
    assert!(stdout.contains("▲ mouse_left"));
    assert!(stdout.contains("Still held at end of script: a"));
}

#[test]
fn test_cli_use_sets_startup_layout() {
    let ctx = TestContext::new();
    ctx.run_ok(&["layouts", "use", "wasd", "--preset"]);
    let settings = fs::read_to_string(ctx.config.join("settings.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&settings).unwrap();
    assert_eq!(value["last_layout"]["preset"], "wasd");

    let output = ctx.run(&["layouts", "use", "nothing-saved"]);
    assert!(!output.status.success());
}
