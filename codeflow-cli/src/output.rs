use colored::Colorize;
use codeflow_core::colors::{DefaultTheme, SeverityTheme};
use codeflow_core::compare::ComparisonReport;
use codeflow_core::report::{AnalysisMode, AnalysisReport};

pub fn format_pretty(report: &AnalysisReport) -> String {
    format_pretty_themed(report, &DefaultTheme)
}

/// Format a report with terminal colors, using the supplied [`SeverityTheme`].
pub fn format_pretty_themed(report: &AnalysisReport, theme: &dyn SeverityTheme) -> String {
    let mut out = String::new();
    let meta = &report.metadata;

    out.push_str(&format!("{} {}\n", "File:".bold(), meta.filename));
    let mode = match meta.mode {
        AnalysisMode::Tree => meta.mode.to_string().normal(),
        AnalysisMode::TextFallback => meta.mode.to_string().yellow(),
        AnalysisMode::MetricsOnly => meta.mode.to_string().dimmed(),
    };
    out.push_str(&format!("{} {} ({})\n", "Language:".dimmed(), meta.language, mode));

    let m = &report.metrics;
    out.push_str(&format!(
        "{} {} | {} {} | {} {}\n",
        "Lines:".dimmed(),
        m.total_lines,
        "Code:".dimmed(),
        m.code_lines,
        "Comments:".dimmed(),
        m.comment_lines,
    ));

    let score = report.security.score;
    let score_str = format!("{score:.1}/5");
    out.push_str(&format!(
        "{} {}\n",
        "Security:".bold(),
        score_str.color(theme.score_color(score)).bold()
    ));

    let c = &report.complexity;
    out.push_str(&format!(
        "{} {}  {} {:.1}  {} {:.1}\n",
        "Complexity:".bold(),
        c.cyclomatic,
        "MI:".dimmed(),
        c.maintainability_index,
        "Volume:".dimmed(),
        c.halstead_volume,
    ));

    if !c.functions.is_empty() {
        out.push_str(&format!("\n{}\n", "Functions:".bold()));
        for f in &c.functions {
            let bar = "█".repeat(f.complexity.min(30) as usize);
            out.push_str(&format!(
                "  {:<24} {} {} {}\n",
                f.name,
                format!("L{:<4}", f.line).dimmed(),
                bar.cyan(),
                f.complexity,
            ));
        }
    }

    if !report.security.findings.is_empty() {
        out.push_str(&format!("\n{}\n", "Findings:".bold()));
        for finding in &report.security.findings {
            let sev = format!("{:<8}", finding.severity.to_string());
            out.push_str(&format!(
                "  {} {} {}: {}\n",
                sev.color(theme.severity_color(finding.severity)).bold(),
                format!("L{:<4}", finding.line).dimmed(),
                finding.kind,
                finding.description,
            ));
            if let Some(ref fix) = finding.remediation {
                out.push_str(&format!("           {}\n", fix.dimmed()));
            }
        }
    }

    let deps = &report.dependencies;
    if !deps.imports.is_empty() {
        out.push_str(&format!("\n{} {}\n", "Imports:".bold(), deps.imports.join(", ")));
    }
    if !deps.exports.is_empty() {
        out.push_str(&format!("{} {}\n", "Exports:".bold(), deps.exports.join(", ")));
    }
    if !deps.api_calls.is_empty() {
        out.push_str(&format!("\n{}\n", "API calls:".bold()));
        for call in &deps.api_calls {
            out.push_str(&format!(
                "  {} {:?} {} {}\n",
                format!("L{:<4}", call.line).dimmed(),
                call.client,
                call.method.bold(),
                call.endpoint,
            ));
        }
    }
    if !deps.database_operations.is_empty() {
        out.push_str(&format!("\n{}\n", "Database:".bold()));
        for op in &deps.database_operations {
            out.push_str(&format!(
                "  {} {:?} {} {}\n",
                format!("L{:<4}", op.line).dimmed(),
                op.store,
                op.operation.bold(),
                op.target,
            ));
        }
    }

    if !report.cloud_services.is_empty() {
        out.push_str(&format!("\n{}\n", "Cloud services:".bold()));
        for usage in &report.cloud_services {
            out.push_str(&format!(
                "  {} {} {}\n",
                format!("L{:<4}", usage.line).dimmed(),
                usage.provider.bold(),
                usage.service,
            ));
        }
    }

    out
}

/// Colored comparison summary.
pub fn format_comparison_pretty(cmp: &ComparisonReport) -> String {
    let theme = DefaultTheme;
    let level = cmp.risk_level.to_string().to_uppercase();
    let mut out = format!(
        "{} {} ({:.1})\n",
        "Risk:".bold(),
        level.color(theme.risk_color(cmp.risk_level)).bold(),
        cmp.risk_score
    );
    out.push_str(&format!(
        "{} {} -> {} ({:+})\n",
        "Complexity:".dimmed(),
        cmp.complexity.before,
        cmp.complexity.after,
        cmp.complexity.change
    ));
    out.push_str(&format!(
        "{} {:.1} -> {:.1} ({:+.1}), new issues: {:+}\n",
        "Security:".dimmed(),
        cmp.security.before,
        cmp.security.after,
        cmp.security.change,
        cmp.security.new_issues
    ));
    for (label, names, added) in [
        ("Imports", &cmp.imports.added, true),
        ("Imports", &cmp.imports.removed, false),
        ("Functions", &cmp.functions.added, true),
        ("Functions", &cmp.functions.removed, false),
    ] {
        for name in names {
            let line = if added {
                format!("  + {label}: {name}").green()
            } else {
                format!("  - {label}: {name}").red()
            };
            out.push_str(&format!("{line}\n"));
        }
    }
    out
}

pub use codeflow_core::output::{format_json, format_map_text, format_text};
