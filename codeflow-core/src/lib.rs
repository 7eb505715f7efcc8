#![deny(dead_code)]

pub mod analyzers;
pub mod colors;
pub mod compare;
pub mod config;
pub mod error;
pub mod fallback;
pub mod language;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod project;
pub mod report;
pub mod syntax;

use std::path::Path;

pub use error::{AnalysisError, ParseError, Result};
pub use language::Language;
pub use pipeline::Pipeline;
pub use report::AnalysisReport;

/// Analyze a source string with the default rule set and vendor table.
///
/// Fails only with [`AnalysisError::InvalidInput`] on blank input; a source
/// that does not parse still yields a report (mode `text-fallback`).
pub fn analyze(source: &str, filename: &str, language: Language) -> Result<AnalysisReport> {
    Pipeline::with_defaults().run(source, filename, language)
}

/// Read and analyze a file, detecting the language from its extension or,
/// failing that, its content.
pub fn analyze_file(path: &Path) -> Result<AnalysisReport> {
    analyze_file_with(&Pipeline::with_defaults(), path, None)
}

/// Read and analyze a file with an explicit pipeline.  `language` overrides
/// detection.
pub fn analyze_file_with(
    pipeline: &Pipeline,
    path: &Path,
    language: Option<Language>,
) -> Result<AnalysisReport> {
    let source = std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let language = language.unwrap_or_else(|| Language::detect_source(path, &source));
    pipeline.run(&source, &path.to_string_lossy(), language)
}
