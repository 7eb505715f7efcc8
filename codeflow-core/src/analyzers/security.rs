//! Security heuristics over the syntax tree.
//!
//! The catalogue is the static [`SECURITY_RULES`] table.  The analyzer asks a
//! [`RuleProvider`] which entries are enabled, so configuration can switch
//! rules off without touching detection code.

use std::collections::HashSet;

use super::TreeAnalyzer;
use crate::report::{FindingKind, SecurityFinding, SecurityReport, Severity};
use crate::syntax::query::{query, NodePattern, Predicate};
use crate::syntax::{LiteralValue, NodeId, NodeKind, SyntaxKind, SyntaxTree};

// ---------------------------------------------------------------------------
// SECURITY_RULES catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SecurityRule {
    pub kind: FindingKind,
    pub severity: Severity,
    /// Subtracted from the score once per finding.
    pub deduction: f64,
    /// Short description of the matched pattern.
    pub pattern: &'static str,
    pub description: &'static str,
    pub remediation: &'static str,
}

macro_rules! rule {
    ($kind:expr, $sev:expr, $ded:expr, $pat:expr, $desc:expr, $fix:expr) => {
        SecurityRule {
            kind: $kind,
            severity: $sev,
            deduction: $ded,
            pattern: $pat,
            description: $desc,
            remediation: $fix,
        }
    };
}

/// Every rule, in reporting order.
pub static SECURITY_RULES: &[SecurityRule] = &[
    rule!(FindingKind::EvalUsage, Severity::Critical, 2.0,
        "call to eval(...)",
        "Use of eval() can lead to code injection vulnerabilities",
        "Parse data with JSON.parse or dispatch through an explicit lookup table instead of evaluating strings"),
    rule!(FindingKind::InnerHtmlUsage, Severity::Medium, 0.5,
        "member access to innerHTML / outerHTML",
        "Direct innerHTML manipulation can lead to XSS vulnerabilities",
        "Assign textContent, or sanitize markup before inserting it into the DOM"),
    rule!(FindingKind::HardcodedCredential, Severity::High, 1.0,
        "string literal mentioning password / secret / key, longer than 8 characters",
        "Potential hardcoded credential detected",
        "Load secrets from environment variables or a secret manager"),
    rule!(FindingKind::UnsafeRegex, Severity::Medium, 0.5,
        "regex with a quantified group that contains a quantifier",
        "Potentially vulnerable regular expression pattern",
        "Remove nested quantifiers or bound the repetition to avoid catastrophic backtracking"),
];

// ---------------------------------------------------------------------------
// RuleProvider trait
// ---------------------------------------------------------------------------

/// Seam deciding which catalogue rules run.
pub trait RuleProvider: Send + Sync {
    fn is_enabled(&self, kind: FindingKind) -> bool;
}

/// Every rule enabled.
pub struct DefaultRules;

impl RuleProvider for DefaultRules {
    fn is_enabled(&self, _kind: FindingKind) -> bool {
        true
    }
}

/// Rules minus the ones disabled in the `[security]` config section.
pub struct ConfiguredRules {
    disabled: HashSet<FindingKind>,
}

impl ConfiguredRules {
    pub fn from_disabled(disabled: impl IntoIterator<Item = FindingKind>) -> Self {
        Self { disabled: disabled.into_iter().collect() }
    }
}

impl RuleProvider for ConfiguredRules {
    fn is_enabled(&self, kind: FindingKind) -> bool {
        !self.disabled.contains(&kind)
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

pub struct SecurityAnalyzer {
    rules: Box<dyn RuleProvider>,
}

impl SecurityAnalyzer {
    pub fn new(rules: Box<dyn RuleProvider>) -> Self {
        Self { rules }
    }
}

impl Default for SecurityAnalyzer {
    fn default() -> Self {
        Self::new(Box::new(DefaultRules))
    }
}

impl TreeAnalyzer for SecurityAnalyzer {
    type Output = SecurityReport;

    fn name(&self) -> &'static str {
        "security"
    }

    fn analyze(&self, tree: &SyntaxTree, _source: &str) -> SecurityReport {
        let mut report = SecurityReport::default();
        for rule in SECURITY_RULES {
            if !self.rules.is_enabled(rule.kind) {
                continue;
            }
            for id in matches(tree, rule.kind) {
                report.findings.push(SecurityFinding {
                    kind: rule.kind,
                    severity: rule.severity,
                    line: tree.node(id).line(),
                    description: rule.description.to_string(),
                    remediation: Some(rule.remediation.to_string()),
                });
                report.score -= rule.deduction;
            }
        }
        report.score = report.score.clamp(0.0, SecurityReport::MAX_SCORE);
        report
    }
}

/// Run the full catalogue over `tree`.
pub fn analyze_security(tree: &SyntaxTree, source: &str) -> SecurityReport {
    SecurityAnalyzer::default().analyze(tree, source)
}

fn matches(tree: &SyntaxTree, kind: FindingKind) -> Vec<NodeId> {
    match kind {
        FindingKind::EvalUsage => query(
            tree,
            &[NodePattern::kind(SyntaxKind::CallExpression).with(Predicate::CalleeIdentifier("eval"))],
        ),
        FindingKind::InnerHtmlUsage => query(
            tree,
            &[NodePattern::kind(SyntaxKind::MemberExpression)
                .with(Predicate::PropertyNamed(&["innerHTML", "outerHTML"]))],
        ),
        FindingKind::HardcodedCredential => query(
            tree,
            &[NodePattern::kind(SyntaxKind::Literal)
                .with(Predicate::RawContains(&["password", "secret", "key"]))],
        )
        .into_iter()
        .filter(|&id| tree.string_value(id).is_some_and(|s| s.encode_utf16().count() > 8))
        .collect(),
        FindingKind::UnsafeRegex => query(
            tree,
            &[
                NodePattern::kind(SyntaxKind::Literal).with(Predicate::IsRegex),
                NodePattern::kind(SyntaxKind::NewExpression).with(Predicate::CalleeIdentifier("RegExp")),
            ],
        )
        .into_iter()
        .filter(|&id| regex_source(tree, id).is_some_and(is_unsafe_regex))
        .collect(),
    }
}

/// Pattern text of a regex literal or of `new RegExp("…")`.
fn regex_source(tree: &SyntaxTree, id: NodeId) -> Option<&str> {
    match tree.kind(id) {
        NodeKind::Literal(lit) => match &lit.value {
            LiteralValue::Regex { pattern, .. } => Some(pattern),
            _ => None,
        },
        NodeKind::NewExpression { arguments, .. } => {
            arguments.first().and_then(|&arg| tree.string_value(arg))
        }
        _ => None,
    }
}

/// `true` when a repeated group itself contains a repetition: `(a+)+`,
/// `(x*)*`, `(.*)*$`, `((a+)b){2,}`.
pub fn is_unsafe_regex(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    // One entry per open group: does it contain a repetition?
    let mut groups: Vec<bool> = Vec::new();
    let mut closed_group_repeats = false;
    let mut in_class = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let mut just_closed = false;
        match c {
            '\\' => i += 1,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            _ if in_class => {}
            '(' => groups.push(false),
            ')' => {
                let inner = groups.pop().unwrap_or(false);
                if inner {
                    if let Some(outer) = groups.last_mut() {
                        *outer = true;
                    }
                }
                closed_group_repeats = inner;
                just_closed = true;
            }
            '+' | '*' => {
                if closed_group_repeats {
                    return true;
                }
                if let Some(top) = groups.last_mut() {
                    *top = true;
                }
            }
            '{' if chars.get(i + 1).is_some_and(char::is_ascii_digit) => {
                if closed_group_repeats {
                    return true;
                }
                if let Some(top) = groups.last_mut() {
                    *top = true;
                }
            }
            _ => {}
        }
        if !just_closed {
            closed_group_repeats = false;
        }
        i += 1;
    }
    false
}
