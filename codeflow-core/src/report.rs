use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::syntax::SyntaxTree;

/// How a report was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// Parsed successfully; every analyzer ran over the tree.
    Tree,
    /// Parsing failed; text-pattern heuristics filled the report.
    TextFallback,
    /// Language without a parser; text metrics only.
    MetricsOnly,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisMode::Tree => "tree",
            AnalysisMode::TextFallback => "text-fallback",
            AnalysisMode::MetricsOnly => "metrics-only",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub filename: String,
    pub language: Language,
    pub mode: AnalysisMode,
}

// ---------------------------------------------------------------------------
// Complexity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnCategory {
    Void,
    Mixed,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    /// TypeScript annotation text, default-value literal type, or `"unknown"`.
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub line: usize,
    pub complexity: u32,
    pub parameters: Vec<ParameterRecord>,
    pub return_type: ReturnCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityReport {
    pub cyclomatic: u32,
    pub maintainability_index: f64,
    pub halstead_volume: f64,
    pub functions: Vec<FunctionRecord>,
}

impl Default for ComplexityReport {
    fn default() -> Self {
        Self {
            cyclomatic: 1,
            maintainability_index: 0.0,
            halstead_volume: 0.0,
            functions: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Security
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        })
    }
}

/// Type tag of a security finding.  Serialized as the catalogue tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    #[serde(rename = "eval-usage")]
    EvalUsage,
    #[serde(rename = "innerHTML-usage")]
    InnerHtmlUsage,
    #[serde(rename = "hardcoded-credential")]
    HardcodedCredential,
    #[serde(rename = "unsafe-regex")]
    UnsafeRegex,
}

impl FindingKind {
    pub const ALL: &'static [FindingKind] = &[
        FindingKind::EvalUsage,
        FindingKind::InnerHtmlUsage,
        FindingKind::HardcodedCredential,
        FindingKind::UnsafeRegex,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            FindingKind::EvalUsage => "eval-usage",
            FindingKind::InnerHtmlUsage => "innerHTML-usage",
            FindingKind::HardcodedCredential => "hardcoded-credential",
            FindingKind::UnsafeRegex => "unsafe-regex",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FindingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FindingKind::ALL
            .iter()
            .copied()
            .find(|k| k.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown security rule: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityFinding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub severity: Severity,
    pub line: usize,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    /// In `[0, 5]`; 5 means nothing was found.
    pub score: f64,
    pub findings: Vec<SecurityFinding>,
}

impl SecurityReport {
    pub const MAX_SCORE: f64 = 5.0;
}

impl Default for SecurityReport {
    fn default() -> Self {
        Self { score: Self::MAX_SCORE, findings: Vec::new() }
    }
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Function,
    Unknown,
    Undefined,
}

impl ValueType {
    /// Map a `typeof` category name.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "string" => ValueType::String,
            "number" => ValueType::Number,
            "boolean" => ValueType::Boolean,
            "object" => ValueType::Object,
            "function" => ValueType::Function,
            "undefined" => ValueType::Undefined,
            _ => ValueType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableScope {
    Global,
    Function,
    Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub scope: VariableScope,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiClient {
    Fetch,
    Axios,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCall {
    pub client: ApiClient,
    /// Literal URL, `"template_literal"` or `"dynamic"`.
    pub endpoint: String,
    pub method: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataStore {
    MongoDB,
    #[serde(rename = "SQL")]
    Sql,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseOperation {
    pub store: DataStore,
    pub operation: String,
    pub target: String,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub functions: Vec<FunctionRecord>,
    pub variables: Vec<VariableRecord>,
    pub api_calls: Vec<ApiCall>,
    pub database_operations: Vec<DatabaseOperation>,
}

// ---------------------------------------------------------------------------
// Cloud / text metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudServiceUsage {
    pub provider: String,
    pub service: String,
    pub usage: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub empty_lines: usize,
    pub characters: usize,
    pub words: usize,
}

// ---------------------------------------------------------------------------
// AnalysisReport
// ---------------------------------------------------------------------------

/// The full analysis result for one source input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Parsed tree; absent after fallback and never serialized.
    #[serde(skip)]
    pub tree: Option<SyntaxTree>,
    pub metadata: ReportMetadata,
    pub complexity: ComplexityReport,
    pub security: SecurityReport,
    pub dependencies: DependencyReport,
    pub cloud_services: Vec<CloudServiceUsage>,
    pub metrics: TextMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_kind_serializes_as_tag() {
        let json = serde_json::to_string(&FindingKind::InnerHtmlUsage).unwrap();
        assert_eq!(json, "\"innerHTML-usage\"");
        for kind in FindingKind::ALL {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.tag()));
        }
    }

    #[test]
    fn finding_kind_parses_tags_case_insensitively() {
        assert_eq!("innerhtml-usage".parse::<FindingKind>(), Ok(FindingKind::InnerHtmlUsage));
        assert_eq!("eval-usage".parse::<FindingKind>(), Ok(FindingKind::EvalUsage));
        assert!("sql-injection".parse::<FindingKind>().is_err());
    }

    #[test]
    fn severity_orders_by_impact() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn default_sections_are_empty_but_valid() {
        assert_eq!(ComplexityReport::default().cyclomatic, 1);
        assert_eq!(SecurityReport::default().score, 5.0);
        assert!(DependencyReport::default().imports.is_empty());
    }

    #[test]
    fn mode_serializes_kebab_case() {
        let json = serde_json::to_string(&AnalysisMode::TextFallback).unwrap();
        assert_eq!(json, "\"text-fallback\"");
    }

    #[test]
    fn parameter_type_field_is_renamed() {
        let p = ParameterRecord { name: "x".into(), type_name: "number".into() };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "number");
    }
}
