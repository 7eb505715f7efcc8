use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;

use crate::compare::ComparisonReport;
use crate::project::{DependencyMap, EdgeKind, MapNode};
use crate::report::AnalysisReport;

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(OutputFormat::Pretty),
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{other}'; expected pretty, text, or json")),
        }
    }
}

/// Pretty-printed JSON for any report type.  The syntax tree is never
/// included.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Format a report as plain text (no colors).
pub fn format_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let meta = &report.metadata;
    let _ = writeln!(out, "File: {} ({}, {})", meta.filename, meta.language, meta.mode);

    let m = &report.metrics;
    let _ = writeln!(
        out,
        "Lines: {} | Code: {} | Comments: {} | Empty: {}",
        m.total_lines, m.code_lines, m.comment_lines, m.empty_lines
    );

    let c = &report.complexity;
    let _ = writeln!(
        out,
        "Complexity: {} | Maintainability: {:.1} | Halstead volume: {:.1}",
        c.cyclomatic, c.maintainability_index, c.halstead_volume
    );
    let _ = writeln!(out, "Security score: {:.1}/5", report.security.score);

    if !c.functions.is_empty() {
        out.push_str("\nFunctions:\n");
        for f in &c.functions {
            let params: Vec<_> = f.parameters.iter().map(|p| p.name.as_str()).collect();
            let _ = writeln!(
                out,
                "  {:<24} line {:<5} complexity {:<3} ({})",
                f.name,
                f.line,
                f.complexity,
                params.join(", ")
            );
        }
    }

    if !report.security.findings.is_empty() {
        out.push_str("\nFindings:\n");
        for finding in &report.security.findings {
            let _ = writeln!(
                out,
                "  [{:<8}] line {:<5} {}: {}",
                finding.severity, finding.line, finding.kind, finding.description
            );
        }
    }

    let deps = &report.dependencies;
    if !deps.imports.is_empty() {
        let _ = writeln!(out, "\nImports: {}", deps.imports.join(", "));
    }
    if !deps.exports.is_empty() {
        let _ = writeln!(out, "Exports: {}", deps.exports.join(", "));
    }
    if !deps.api_calls.is_empty() {
        out.push_str("\nAPI calls:\n");
        for call in &deps.api_calls {
            let _ = writeln!(out, "  line {:<5} {:?} {} {}", call.line, call.client, call.method, call.endpoint);
        }
    }
    if !deps.database_operations.is_empty() {
        out.push_str("\nDatabase operations:\n");
        for op in &deps.database_operations {
            let _ = writeln!(out, "  line {:<5} {:?} {} {}", op.line, op.store, op.operation, op.target);
        }
    }

    if !report.cloud_services.is_empty() {
        out.push_str("\nCloud services:\n");
        for usage in &report.cloud_services {
            let _ = writeln!(out, "  line {:<5} {} ({})", usage.line, usage.service, usage.provider);
        }
    }

    out
}

/// Format a comparison as plain text.
pub fn format_comparison_text(cmp: &ComparisonReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Risk: {} ({:.1})", cmp.risk_level, cmp.risk_score);
    let _ = writeln!(
        out,
        "Complexity: {} -> {} ({:+})",
        cmp.complexity.before, cmp.complexity.after, cmp.complexity.change
    );
    let _ = writeln!(
        out,
        "Security: {:.1} -> {:.1} ({:+.1}), new issues: {:+}",
        cmp.security.before, cmp.security.after, cmp.security.change, cmp.security.new_issues
    );
    for (label, names) in [
        ("Imports added", &cmp.imports.added),
        ("Imports removed", &cmp.imports.removed),
        ("Functions added", &cmp.functions.added),
        ("Functions removed", &cmp.functions.removed),
    ] {
        if !names.is_empty() {
            let _ = writeln!(out, "{label}: {}", names.join(", "));
        }
    }
    out
}

/// Format a dependency map as plain text: files with their functions, then
/// edges.
pub fn format_map_text(map: &DependencyMap) -> String {
    let mut out = String::new();
    for node in &map.nodes {
        match node {
            MapNode::File { id, language, complexity, security } => {
                let _ = writeln!(out, "{id} ({language}) complexity {complexity} security {security:.1}");
            }
            MapNode::Function { label, complexity, line, .. } => {
                let _ = writeln!(out, "  {label} line {line} complexity {complexity}");
            }
        }
    }
    if !map.edges.is_empty() {
        out.push_str("\nEdges:\n");
        for edge in &map.edges {
            let kind = match edge.kind {
                EdgeKind::Import => "import",
                EdgeKind::Call => "call",
            };
            let _ = writeln!(out, "  {} -> {} [{kind}: {}]", edge.from, edge.to, edge.label);
        }
    }
    out
}
