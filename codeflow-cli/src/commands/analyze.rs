use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use codeflow_core::config::{CodeflowConfig, IgnoreRules};
use codeflow_core::output::OutputFormat;
use codeflow_core::report::AnalysisReport;
use codeflow_core::{analyze_file_with, Language, Pipeline};

use crate::output;

/// Files under `path` whose extension maps to a known language, minus
/// ignored paths.  A file argument is returned as-is.
pub fn collect_files(path: &Path, ignore: &dyn IgnoreRules) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !ignore.is_ignored(e.path()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| Language::detect(p) != Language::Unknown)
        .collect();
    files.sort();
    files
}

/// Explicit config file, or the one discovered upward from `path`.
pub fn load_config(path: &Path, config: Option<&Path>) -> Result<CodeflowConfig> {
    match config {
        Some(file) => CodeflowConfig::from_file(file),
        None => Ok(CodeflowConfig::load(path)),
    }
}

pub fn parse_format(s: &str) -> Result<OutputFormat> {
    s.parse::<OutputFormat>().map_err(anyhow::Error::msg)
}

pub fn format_report(report: &AnalysisReport, fmt: OutputFormat) -> Result<String> {
    Ok(match fmt {
        OutputFormat::Json => output::format_json(report)?,
        OutputFormat::Text => output::format_text(report),
        OutputFormat::Pretty => output::format_pretty(report),
    })
}

pub fn run(
    path: &Path,
    format: &str,
    language: Option<&str>,
    config: Option<&Path>,
    fail_under: Option<f64>,
) -> Result<()> {
    let fmt = parse_format(format)?;
    let language = language
        .map(|l| l.parse::<Language>().map_err(anyhow::Error::msg))
        .transpose()?;
    let config = load_config(path, config)?;
    let pipeline = Pipeline::from_config(&config);

    let files = collect_files(path, &config);
    if files.is_empty() {
        anyhow::bail!("no supported source files found in {}", path.display());
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        match analyze_file_with(&pipeline, file, language) {
            Ok(report) => reports.push(report),
            // Blank files carry nothing to report; skip them in directory scans.
            Err(codeflow_core::AnalysisError::InvalidInput) if files.len() > 1 => {
                tracing::debug!(path = %file.display(), "skipping blank file");
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to analyze {}", file.display()))
            }
        }
    }

    if fmt == OutputFormat::Json && reports.len() > 1 {
        println!("{}", output::format_json(&reports)?);
    } else {
        for report in &reports {
            println!("{}", format_report(report, fmt)?);
        }
    }

    if let Some(threshold) = fail_under {
        let failures: Vec<_> = reports
            .iter()
            .filter(|r| r.security.score < threshold)
            .collect();
        if !failures.is_empty() {
            eprintln!("\n--- CODEFLOW FAILED ---");
            for report in &failures {
                eprintln!(
                    "  {}: security score {:.1} is below {:.1} ({} findings)",
                    report.metadata.filename,
                    report.security.score,
                    threshold,
                    report.security.findings.len(),
                );
            }
            std::process::exit(1);
        } else {
            eprintln!("\nAll files meet the security threshold.");
        }
    }

    Ok(())
}
