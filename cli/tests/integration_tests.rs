use std::fs;
use std::path::PathBuf;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("kure_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Minimal kure.toml for a single exported package.
fn write_config(dir: &TempDir) -> PathBuf {
    let toml = r#"
name = "guestbook"

[[export]]
path = "example.dev/guestbook/api/v1"
group = "guestbook.example.dev"
version = "v1"
"#;
    let path = dir.join("kure.toml");
    fs::write(&path, toml).expect("failed to write kure.toml");
    path
}

fn write_manifest(dir: &TempDir) {
    let toml = r#"
module = "example.dev/guestbook"

[[require]]
path = "k8s.io/apimachinery"
version = "v0.29.2"
"#;
    fs::write(dir.join("module.toml"), toml).expect("failed to write module.toml");
}

/// A package model with one string definition.
fn write_packages(dir: &TempDir) -> PathBuf {
    let json = serde_json::json!({
        "packages": [{
            "path": "example.dev/guestbook/api/v1",
            "types": [{
                "name": "Phase",
                "exported": true,
                "doc": "Phase of the guestbook.",
                "rhs": { "kind": "basic", "basic": "string" }
            }],
            "imports": ["k8s.io/apimachinery/pkg/apis/meta/v1"]
        }]
    });
    let path = dir.join("packages.json");
    fs::write(&path, serde_json::to_string_pretty(&json).unwrap())
        .expect("failed to write packages.json");
    path
}

#[test]
fn ingest_writes_schema_tree() {
    let dir = TempDir::new("schema_tree");
    let config = write_config(&dir);
    write_manifest(&dir);
    let packages = write_packages(&dir);
    let output = dir.join("schema");

    let result = std::process::Command::new(env!("CARGO_BIN_EXE_kure-ingest"))
        .current_dir(&dir.path)
        .args([
            "-c",
            config.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            packages.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run kure-ingest");

    assert!(
        result.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert!(String::from_utf8_lossy(&result.stdout).contains("API: guestbook"));

    let index: serde_json::Value =
        serde_json::from_slice(&fs::read(output.join("index.json")).unwrap()).unwrap();
    assert_eq!(index["kind"], "API");
    assert_eq!(index["name"], "guestbook");

    let group: serde_json::Value =
        serde_json::from_slice(&fs::read(output.join("group.json")).unwrap()).unwrap();
    assert_eq!(group["name"], "guestbook.example.dev");
    assert_eq!(group["versions"], serde_json::json!(["v1"]));

    let version: serde_json::Value =
        serde_json::from_slice(&fs::read(output.join("v1.json")).unwrap()).unwrap();
    assert_eq!(version["kind"], "APIGroupVersion");
    assert_eq!(version["definitions"][0]["name"], "Phase");
    assert_eq!(version["definitions"][0]["value"]["variant"], "string");
}

#[test]
fn ingest_chdir_flag() {
    let dir = TempDir::new("chdir");
    write_config(&dir);
    write_manifest(&dir);
    write_packages(&dir);
    let output = dir.join("out");

    // Run from elsewhere, chdir into the fixture directory.
    let result = std::process::Command::new(env!("CARGO_BIN_EXE_kure-ingest"))
        .current_dir(std::env::temp_dir())
        .args([
            "-c",
            dir.join("kure.toml").to_str().unwrap(),
            "-d",
            dir.path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "packages.json",
        ])
        .output()
        .expect("failed to run kure-ingest");

    assert!(
        result.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert!(output.join("index.json").exists());
}

#[test]
fn ingest_missing_config_fails() {
    let dir = TempDir::new("missing_config");
    write_manifest(&dir);
    let packages = write_packages(&dir);

    let result = std::process::Command::new(env!("CARGO_BIN_EXE_kure-ingest"))
        .current_dir(&dir.path)
        .args([
            "-c",
            dir.join("nope.toml").to_str().unwrap(),
            packages.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run kure-ingest");

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}

#[test]
fn ingest_unscanned_export_fails() {
    let dir = TempDir::new("unscanned");
    let config = write_config(&dir);
    write_manifest(&dir);

    // Empty package set: the configured export was never scanned.
    let packages = dir.join("packages.json");
    fs::write(&packages, r#"{"packages": []}"#).unwrap();

    let result = std::process::Command::new(env!("CARGO_BIN_EXE_kure-ingest"))
        .current_dir(&dir.path)
        .args(["-c", config.to_str().unwrap(), packages.to_str().unwrap()])
        .output()
        .expect("failed to run kure-ingest");

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("was not scanned"), "stderr: {stderr}");
}
