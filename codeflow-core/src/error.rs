use std::path::PathBuf;

use thiserror::Error;

use crate::language::Language;

/// Errors surfaced to callers of the analysis entry points.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Empty or whitespace-only source; rejected before analysis starts.
    #[error("invalid input: source text is empty")]
    InvalidInput,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Every grammar configuration rejected the source.
///
/// Recoverable: the pipeline falls back to text-pattern analysis and never
/// hands this to its caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error ({language}): {}", .attempts.join("; "))]
pub struct ParseError {
    pub language: Language,
    /// One message per failed attempt, in attempt order.
    pub attempts: Vec<String>,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
