use std::fs;

use codeflow_core::config::{CodeflowConfig, IgnoreRules, CONFIG_FILE_NAME};
use codeflow_core::report::FindingKind;
use codeflow_core::{analyze_file_with, Pipeline};

#[test]
fn nested_file_picks_up_root_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
[security]
disabled = ["innerHTML-usage"]

[[cloud.vendors]]
pattern = "@vercel/"
provider = "Vercel"
service = "Vercel SDK"
usage = "Edge and storage APIs"
"#,
    )
    .unwrap();
    let src = dir.path().join("src/ui");
    fs::create_dir_all(&src).unwrap();
    let file = src.join("page.js");
    fs::write(&file, "import { put } from '@vercel/blob';\nel.innerHTML = html;\neval(code);\n").unwrap();

    let config = CodeflowConfig::load(&file);
    assert_eq!(config.root(), dir.path());
    let report = analyze_file_with(&Pipeline::from_config(&config), &file, None).unwrap();

    let kinds: Vec<_> = report.security.findings.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FindingKind::EvalUsage]);
    assert_eq!(report.cloud_services.len(), 1);
    assert_eq!(report.cloud_services[0].service, "Vercel SDK");
}

#[test]
fn gitignore_and_extra_patterns_combine() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "[ignore]\npatterns = [\"*.min.js\"]\n").unwrap();

    let config = CodeflowConfig::load(dir.path());
    assert!(config.is_ignored(&dir.path().join("build/out.js")));
    assert!(config.is_ignored(&dir.path().join("vendor.min.js")));
    assert!(!config.is_ignored(&dir.path().join("src/app.js")));
}

#[test]
fn gitignore_can_be_switched_off() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "[ignore]\nuse_gitignore = false\n").unwrap();

    let config = CodeflowConfig::load(dir.path());
    assert!(!config.use_gitignore());
    assert!(!config.is_ignored(&dir.path().join("build/out.js")));
}
