//! Fails when any test in the workspace is switched off with `#[ignore]`.

use std::fs;
use std::path::{Path, PathBuf};

const CRATES: &[&str] = &["codeflow-core", "codeflow-cli"];

#[test]
fn workspace_has_no_ignored_tests() {
    let workspace = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crate lives inside the workspace");

    let mut violations = Vec::new();
    for krate in CRATES {
        for dir in ["src", "tests"] {
            for file in rust_files(&workspace.join(krate).join(dir)) {
                violations.extend(ignored_lines(workspace, &file));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "#[ignore] attributes found, fix or delete these tests:\n{}",
        violations.join("\n")
    );
}

fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files = Vec::new();
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    files
}

fn ignored_lines(workspace: &Path, file: &Path) -> Vec<String> {
    let Ok(text) = fs::read_to_string(file) else {
        return Vec::new();
    };
    let shown = file.strip_prefix(workspace).unwrap_or(file);
    text.lines()
        .enumerate()
        .filter(|(_, line)| line.trim_start().starts_with("#[ignore"))
        .map(|(i, line)| format!("  {}:{}: {}", shown.display(), i + 1, line.trim()))
        .collect()
}
