//! End-to-end tests for the `codeflow` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn codeflow(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_codeflow"))
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run codeflow")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/app.js"),
        "import { add } from './math';\nconsole.log(add(1, 2));\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/math.js"),
        "export function add(a, b) {\n  return a + b;\n}\n",
    )
    .unwrap();
    dir
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_single_file_as_json() {
    let dir = project();
    let out = codeflow(&["analyze", "src/math.js", "--format", "json"], dir.path());
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["metadata"]["language"], "javascript");
    assert_eq!(json["dependencies"]["exports"][0], "add");
}

#[test]
fn analyze_directory_as_json_array() {
    let dir = project();
    let out = codeflow(&["src", "--format", "json"], dir.path());
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(2));
}

#[test]
fn fail_under_exits_nonzero() {
    let dir = project();
    fs::write(dir.path().join("src/bad.js"), "eval(input);\n").unwrap();
    let out = codeflow(&["analyze", "src/bad.js", "--format", "text", "--fail-under", "4"], dir.path());
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("below 4.0"));
}

#[test]
fn config_disables_rules() {
    let dir = project();
    fs::write(dir.path().join(".codeflow"), "[security]\ndisabled = [\"eval-usage\"]\n").unwrap();
    fs::write(dir.path().join("src/bad.js"), "eval(input);\n").unwrap();
    let out = codeflow(&["analyze", "src/bad.js", "--format", "json"], dir.path());
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["security"]["score"], 5.0);
}

#[test]
fn unknown_format_is_an_error() {
    let dir = project();
    let out = codeflow(&["analyze", "src/app.js", "--format", "xml"], dir.path());
    assert!(!out.status.success());
}

// ---------------------------------------------------------------------------
// compare / project / rules
// ---------------------------------------------------------------------------

#[test]
fn compare_reports_risk() {
    let dir = project();
    fs::write(dir.path().join("before.js"), "function f(x) { return x; }\n").unwrap();
    fs::write(dir.path().join("after.js"), "function f(x) { return eval(x); }\n").unwrap();
    let out = codeflow(&["compare", "before.js", "after.js", "--format", "json"], dir.path());
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["risk_level"], "critical");
    assert_eq!(json["security"]["new_issues"], 1);
}

#[test]
fn project_map_links_files() {
    let dir = project();
    let out = codeflow(&["project", "src", "--format", "json"], dir.path());
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let edges = json["edges"].as_array().unwrap();
    assert!(edges
        .iter()
        .any(|e| e["type"] == "import" && e["from"] == "app.js" && e["to"] == "math.js"));
    assert!(edges
        .iter()
        .any(|e| e["type"] == "call" && e["label"] == "add"));
}

#[test]
fn rules_lists_catalogue() {
    let dir = project();
    let table = stdout(&codeflow(&["rules"], dir.path()));
    for tag in ["eval-usage", "innerHTML-usage", "hardcoded-credential", "unsafe-regex", "aws-sdk"] {
        assert!(table.contains(tag), "missing {tag}");
    }
    let toml = stdout(&codeflow(&["rules", "--format", "toml"], dir.path()));
    assert!(toml.starts_with("[security]"));
}
