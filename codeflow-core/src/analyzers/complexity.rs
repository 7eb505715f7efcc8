use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::functions::{function_nodes, function_record, DECISION_POINTS};
use super::TreeAnalyzer;
use crate::report::ComplexityReport;
use crate::syntax::query::query;
use crate::syntax::SyntaxTree;

static OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+\-*/=<>!&|%^~?:;,.(){}\[\]]").expect("valid regex literal"));

static OPERAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z_$][a-zA-Z0-9_$]*").expect("valid regex literal"));

/// Cyclomatic complexity, Halstead volume and maintainability index.
pub struct ComplexityAnalyzer;

impl TreeAnalyzer for ComplexityAnalyzer {
    type Output = ComplexityReport;

    fn name(&self) -> &'static str {
        "complexity"
    }

    fn analyze(&self, tree: &SyntaxTree, source: &str) -> ComplexityReport {
        compute_complexity(tree, source)
    }
}

pub fn compute_complexity(tree: &SyntaxTree, source: &str) -> ComplexityReport {
    let cyclomatic = 1 + query(tree, &DECISION_POINTS).len() as u32;
    let halstead_volume = halstead_volume(source);
    let lines = source.split('\n').count();
    let functions = function_nodes(tree)
        .into_iter()
        .map(|f| function_record(tree, f))
        .collect();

    ComplexityReport {
        cyclomatic,
        maintainability_index: maintainability_index(halstead_volume, cyclomatic, lines),
        halstead_volume,
        functions,
    }
}

/// `N × log2(n)` over single-character operators and identifier-like operands.
pub fn halstead_volume(source: &str) -> f64 {
    let operators: Vec<&str> = OPERATOR.find_iter(source).map(|m| m.as_str()).collect();
    let operands: Vec<&str> = OPERAND.find_iter(source).map(|m| m.as_str()).collect();

    let vocabulary = operators.iter().collect::<HashSet<_>>().len()
        + operands.iter().collect::<HashSet<_>>().len();
    if vocabulary == 0 {
        return 0.0;
    }
    let length = operators.len() + operands.len();
    length as f64 * (vocabulary as f64).log2()
}

/// `max(0, 171 − 5.2·ln(V) − 0.23·CC − 16.2·ln(LOC))`.  The volume term is
/// dropped when `V` is 0.
pub fn maintainability_index(volume: f64, cyclomatic: u32, lines: usize) -> f64 {
    let volume_term = if volume > 0.0 { 5.2 * volume.ln() } else { 0.0 };
    let lines_term = 16.2 * (lines.max(1) as f64).ln();
    (171.0 - volume_term - 0.23 * cyclomatic as f64 - lines_term).max(0.0)
}
