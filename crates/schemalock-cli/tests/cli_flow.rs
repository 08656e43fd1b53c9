//! End-to-end flow against the real binary: init a lock, break the tree,
//! watch status fail, force a commit, watch status recover.

use std::fs;
use std::process::Command;

fn schemalock() -> Command {
    Command::new(env!("CARGO_BIN_EXE_schemalock"))
}

const BASE_PROTO: &str = r#"syntax = "proto3";
package demo;

message Channel {
  int64 id = 1;
  string name = 2;
}

service ChannelChanger {
  rpc Next(NextRequest) returns (Channel);
}

message NextRequest {}
"#;

const BREAKING_PROTO: &str = r#"syntax = "proto3";
package demo;

message Channel {
  int32 id = 1;
  string name = 2;
}

service ChannelChanger {
  rpc Next(NextRequest) returns (Channel);
}

message NextRequest {}
"#;

#[test]
fn init_status_commit_flow() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("channels.proto"), BASE_PROTO).unwrap();

    let out = schemalock()
        .current_dir(dir.path())
        .arg("init")
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "init failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(dir.path().join("schema.lock").exists());

    let out = schemalock()
        .current_dir(dir.path())
        .arg("status")
        .output()
        .unwrap();
    assert!(out.status.success());

    fs::write(dir.path().join("channels.proto"), BREAKING_PROTO).unwrap();

    let out = schemalock()
        .current_dir(dir.path())
        .arg("status")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("R4"), "expected a type warning, got: {stdout}");
    assert!(stdout.contains("demo.Channel"));

    let out = schemalock()
        .current_dir(dir.path())
        .arg("commit")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1), "commit must refuse on warnings");

    let out = schemalock()
        .current_dir(dir.path())
        .args(["commit", "--force"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let out = schemalock()
        .current_dir(dir.path())
        .arg("status")
        .output()
        .unwrap();
    assert!(out.status.success(), "status must pass after a forced commit");
}

#[test]
fn json_status_reports_structured_warnings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("channels.proto"), BASE_PROTO).unwrap();

    let out = schemalock()
        .current_dir(dir.path())
        .arg("init")
        .output()
        .unwrap();
    assert!(out.status.success());

    fs::write(dir.path().join("channels.proto"), BREAKING_PROTO).unwrap();

    let out = schemalock()
        .current_dir(dir.path())
        .args(["--json", "status"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["ok"], false);
    let warnings = v["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["rule_id"], "R4");
    assert_eq!(warnings[0]["filepath"], "channels.proto");
    assert_eq!(warnings[0]["path"], "demo.Channel");
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("channels.proto"), BASE_PROTO).unwrap();

    let out = schemalock()
        .current_dir(dir.path())
        .arg("init")
        .output()
        .unwrap();
    assert!(out.status.success());

    let out = schemalock()
        .current_dir(dir.path())
        .arg("init")
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("already exists"));
}

#[test]
fn ignore_globs_exclude_files_from_the_walk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("channels.proto"), BASE_PROTO).unwrap();
    fs::create_dir(dir.path().join("vendor")).unwrap();
    fs::write(
        dir.path().join("vendor").join("third_party.proto"),
        "syntax = \"proto3\";\npackage vendor;\nmessage Skip { int32 a = 1; }\n",
    )
    .unwrap();

    let out = schemalock()
        .current_dir(dir.path())
        .args(["--ignore", "vendor/**", "init"])
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "init failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let lock: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("schema.lock")).unwrap()).unwrap();
    let defs = lock["definitions"].as_array().unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0]["filepath"], "channels.proto");
}

#[test]
fn status_without_lock_points_at_init() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("channels.proto"), BASE_PROTO).unwrap();

    let out = schemalock()
        .current_dir(dir.path())
        .arg("status")
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("schemalock init"));
}
