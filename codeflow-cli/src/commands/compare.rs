use std::path::Path;

use anyhow::{Context, Result};

use codeflow_core::compare::compare;
use codeflow_core::config::CodeflowConfig;
use codeflow_core::{analyze_file_with, Pipeline};

use crate::output;

pub fn run(before: &Path, after: &Path, format: &str) -> Result<()> {
    let pipeline = Pipeline::from_config(&CodeflowConfig::load(after));
    let old = analyze_file_with(&pipeline, before, None)
        .with_context(|| format!("failed to analyze {}", before.display()))?;
    let new = analyze_file_with(&pipeline, after, None)
        .with_context(|| format!("failed to analyze {}", after.display()))?;

    let cmp = compare(&old, &new);
    match format {
        "json" => println!("{}", output::format_json(&cmp)?),
        "text" => print!("{}", output::format_comparison_pretty(&cmp)),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }
    Ok(())
}
