//! Before/after comparison of two reports with a coarse risk rating.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::report::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 5.0 {
            RiskLevel::Critical
        } else if score >= 3.0 {
            RiskLevel::High
        } else if score >= 1.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityChange {
    pub before: u32,
    pub after: u32,
    /// `after - before`.
    pub change: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityChange {
    pub before: f64,
    pub after: f64,
    pub change: f64,
    /// Difference in finding counts; negative when issues were fixed.
    pub new_issues: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub complexity: ComplexityChange,
    pub security: SecurityChange,
    pub imports: NameChanges,
    pub functions: NameChanges,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

const COMPLEXITY_WEIGHT: f64 = 0.5;
const SCORE_DROP_WEIGHT: f64 = 2.0;
const NEW_ISSUE_WEIGHT: f64 = 1.0;

pub fn compare(before: &AnalysisReport, after: &AnalysisReport) -> ComparisonReport {
    let complexity = ComplexityChange {
        before: before.complexity.cyclomatic,
        after: after.complexity.cyclomatic,
        change: i64::from(after.complexity.cyclomatic) - i64::from(before.complexity.cyclomatic),
    };

    let security = SecurityChange {
        before: before.security.score,
        after: after.security.score,
        change: after.security.score - before.security.score,
        new_issues: after.security.findings.len() as i64 - before.security.findings.len() as i64,
    };

    let imports = name_changes(
        before.dependencies.imports.iter().map(String::as_str),
        after.dependencies.imports.iter().map(String::as_str),
    );
    let functions = name_changes(
        before.dependencies.functions.iter().map(|f| f.name.as_str()),
        after.dependencies.functions.iter().map(|f| f.name.as_str()),
    );

    let risk_score = COMPLEXITY_WEIGHT * (complexity.change.max(0) as f64)
        + SCORE_DROP_WEIGHT * (-security.change).max(0.0)
        + NEW_ISSUE_WEIGHT * (security.new_issues.max(0) as f64);

    ComparisonReport {
        complexity,
        security,
        imports,
        functions,
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
    }
}

/// Names present on one side only, each list in its own document order.
fn name_changes<'a>(
    before: impl Iterator<Item = &'a str> + Clone,
    after: impl Iterator<Item = &'a str> + Clone,
) -> NameChanges {
    let added = after
        .clone()
        .filter(|name| !before.clone().any(|b| b == *name))
        .map(str::to_string)
        .collect();
    let removed = before
        .filter(|name| !after.clone().any(|a| a == *name))
        .map(str::to_string)
        .collect();
    NameChanges { added, removed }
}
