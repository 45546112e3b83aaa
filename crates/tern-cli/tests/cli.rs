//! End-to-end tests for the `tern` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tern(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tern").unwrap();
    cmd.current_dir(dir)
        .arg("--no-color")
        .env_remove("RUST_LOG")
        .env_remove("TERN_MODE")
        .env_remove("TERN_CONTEXT")
        .env_remove("TERN_MAX_CHUNKS")
        .env_remove("TERN_OUTPUT__PATH")
        .env_remove("TERN_OUTPUT__PUBLIC_PATH");
    cmd
}

fn project(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/index.js"), "console.log('main')").unwrap();
    fs::write(dir.path().join("src/admin.js"), "console.log('admin')").unwrap();
    fs::write(
        dir.path().join("index.html"),
        "<html><head></head><body></body></html>",
    )
    .unwrap();
    fs::write(dir.path().join("tern.toml"), config).unwrap();
    dir
}

const SITE: &str = r#"
mode = "production"

[entry]
main = "./src/index.js"
admin = "./src/admin.js"

[output]
path = "dist"

[[builtins.html]]
template = "./index.html"
title = "Site"
"#;

#[test]
fn build_writes_html_and_prints_summary() {
    let dir = project(SITE);

    tern(dir.path())
        .arg("build")
        .assert()
        .success()
        .stderr(predicate::str::contains("Build Summary"))
        .stderr(predicate::str::contains("2 chunks, 1 asset"));

    let html = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
    assert!(html.contains("<title>Site</title>"), "{html}");
    let main = html.find("main.js").unwrap();
    let admin = html.find("admin.js").unwrap();
    assert!(main < admin, "{html}");
}

#[test]
fn build_json_reports_stats_on_stdout() {
    let dir = project(SITE);

    let output = tern(dir.path())
        .args(["build", "--json", "--max-chunks", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // Entry chunks are never merged with each other.
    assert_eq!(stats["chunks"].as_array().unwrap().len(), 2);
    assert_eq!(stats["entrypoints"]["main"], serde_json::json!(["main.js"]));
    assert_eq!(stats["assets"][0]["name"], "index.html");
}

#[test]
fn out_dir_flag_redirects_assets() {
    let dir = project(SITE);

    tern(dir.path())
        .args(["build", "--out-dir", "public", "--mode", "development"])
        .assert()
        .success();

    assert!(dir.path().join("public/index.html").is_file());
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn explicit_config_path_is_used() {
    let dir = project(SITE);
    fs::create_dir_all(dir.path().join("configs")).unwrap();
    fs::write(
        dir.path().join("configs/tern.config.json"),
        r#"{ "context": "..", "entry": { "main": "./src/index.js" } }"#,
    )
    .unwrap();

    tern(dir.path())
        .args(["check", "--config", "configs/tern.config.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration is valid (1 entry"));
}

#[test]
fn check_lists_plugins() {
    let dir = project(SITE);

    tern(dir.path())
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration is valid (2 entries, mode production)"))
        .stderr(predicate::str::contains("Plugins: HtmlPlugin"));

    assert!(!dir.path().join("dist").exists());
}

#[test]
fn missing_config_fails_with_hint() {
    let dir = TempDir::new().unwrap();

    tern(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No tern configuration found"))
        .stderr(predicate::str::contains("--config"));
}

#[test]
fn missing_config_file_is_reported() {
    let dir = TempDir::new().unwrap();

    tern(dir.path())
        .args(["build", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn missing_entry_fails_check() {
    let dir = project(
        r#"
[entry]
main = "./src/missing.js"
"#,
    );

    tern(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.js"));
}

#[test]
fn unknown_plugin_fails_check() {
    let dir = project(
        r#"
plugins = ["terser"]

[entry]
main = "./src/index.js"
"#,
    );

    tern(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("terser"));
}

#[test]
fn unknown_profile_fails() {
    let dir = project(SITE);

    tern(dir.path())
        .args(["build", "--profile", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn verbose_and_quiet_are_exclusive() {
    let dir = project(SITE);

    tern(dir.path())
        .args(["--verbose", "--quiet", "check"])
        .assert()
        .failure();
}

#[test]
fn quiet_build_prints_nothing() {
    let dir = project(SITE);

    tern(dir.path())
        .args(["--quiet", "build"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
