use std::path::Path;

use anyhow::{Context, Result};

use codeflow_core::config::CodeflowConfig;
use codeflow_core::project::{build_dependency_map, ProjectFile};
use codeflow_core::{AnalysisError, Language, Pipeline};

use super::analyze::collect_files;
use crate::output;

pub fn run(path: &Path, format: &str) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("{} is not a directory", path.display());
    }
    let config = CodeflowConfig::load(path);
    let pipeline = Pipeline::from_config(&config);

    let mut files = Vec::new();
    for file in collect_files(path, &config) {
        let source = std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let display = file.strip_prefix(path).unwrap_or(&file).display().to_string();
        match pipeline.run(&source, &display, Language::detect(&file)) {
            Ok(report) => files.push(ProjectFile { path: display, source, report }),
            Err(AnalysisError::InvalidInput) => continue,
            Err(err) => return Err(err.into()),
        }
    }

    let map = build_dependency_map(&files);
    match format {
        "json" => println!("{}", output::format_json(&map)?),
        "text" => print!("{}", output::format_map_text(&map)),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }
    Ok(())
}
