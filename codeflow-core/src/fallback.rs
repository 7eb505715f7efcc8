//! Text-pattern strategy used when the source does not parse.
//!
//! Everything here works on raw text with regexes, so it always produces a
//! report.  Security and cloud sections stay empty: those heuristics are only
//! trusted on a tree.

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzers::complexity::{halstead_volume, maintainability_index};
use crate::pipeline::{AnalysisStrategy, Sections};
use crate::report::{
    AnalysisMode, ComplexityReport, DependencyReport, FunctionRecord, ReturnCategory,
    SecurityReport, ValueType, VariableRecord, VariableScope,
};

// Function shapes mark the `function` keyword or the arrow as `kw`; a
// function is identified by that position.
static FUNCTION_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<kw>function)\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)\s*\(").expect("valid regex literal")
});

static FUNCTION_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<name>[A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?P<kw>function)\b").expect("valid regex literal")
});

static ARROW_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<name>[A-Za-z_$][\w$]*)\s*=\s*(?:(?:async\s*)?\([^)]*\)|(?:async\s+)?[A-Za-z_$][\w$]*)\s*(?P<kw>=>)",
    )
    .expect("valid regex literal")
});

static ANONYMOUS_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?P<kw>function)\s*\*?\s*\(").expect("valid regex literal"));

static ANONYMOUS_ARROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<kw>=>)").expect("valid regex literal"));

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:let|const|var)\s+([A-Za-z_$][\w$]*)").expect("valid regex literal")
});

static IMPORT_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s[^;]*?\bfrom\s*['"]([^'"]+)['"]"#).expect("valid regex literal")
});

static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex literal")
});

static EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bexport\s+(?:default\s+)?(?:async\s+)?(?:function\s*\*?|class|const|let|var)\s+([A-Za-z_$][\w$]*)")
        .expect("valid regex literal")
});

static BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:if|while|for|switch|catch)\b").expect("valid regex literal"));

/// Regex heuristics over raw text.
pub struct TextPatternStrategy;

impl AnalysisStrategy for TextPatternStrategy {
    fn mode(&self) -> AnalysisMode {
        AnalysisMode::TextFallback
    }

    fn analyze(&self, source: &str) -> Sections {
        let lines = LineIndex::new(source);

        let functions: Vec<FunctionRecord> = function_shapes(source)
            .into_iter()
            .map(|(offset, name)| FunctionRecord {
                name: name.to_string(),
                line: lines.line_of(offset),
                complexity: 1,
                parameters: Vec::new(),
                return_type: ReturnCategory::Unknown,
            })
            .collect();

        let variables = captures(source, &[&*VARIABLE])
            .into_iter()
            .map(|(offset, name)| VariableRecord {
                name: name.to_string(),
                value_type: ValueType::Unknown,
                scope: VariableScope::Global,
                line: lines.line_of(offset),
            })
            .collect();

        let imports = captures(source, &[&*IMPORT_FROM, &*REQUIRE])
            .into_iter()
            .map(|(_, s)| s.to_string())
            .collect();
        let exports = captures(source, &[&*EXPORT])
            .into_iter()
            .map(|(_, s)| s.to_string())
            .collect();

        let cyclomatic = 1 + BRANCH.find_iter(source).count() as u32;
        let volume = halstead_volume(source);
        let complexity = ComplexityReport {
            cyclomatic,
            maintainability_index: maintainability_index(volume, cyclomatic, source.split('\n').count()),
            halstead_volume: volume,
            functions: functions.clone(),
        };

        Sections {
            complexity,
            security: SecurityReport::default(),
            dependencies: DependencyReport {
                imports,
                exports,
                functions,
                variables,
                api_calls: Vec::new(),
                database_operations: Vec::new(),
            },
            cloud_services: Vec::new(),
        }
    }
}

/// One `(offset, name)` per function keyword or arrow, in document order.
///
/// Where shapes overlap, a declared name beats an assigned one, which beats
/// `"anonymous"`.
fn function_shapes(source: &str) -> Vec<(usize, &str)> {
    let shapes: [(&Regex, u8); 5] = [
        (&*FUNCTION_DECL, 0),
        (&*FUNCTION_ASSIGN, 1),
        (&*ARROW_ASSIGN, 1),
        (&*ANONYMOUS_FUNCTION, 2),
        (&*ANONYMOUS_ARROW, 2),
    ];
    let mut hits: Vec<(usize, u8, usize, &str)> = Vec::new();
    for (re, rank) in shapes {
        for caps in re.captures_iter(source) {
            let Some(kw) = caps.name("kw") else { continue };
            let hit = match caps.name("name") {
                Some(name) => (kw.start(), rank, name.start(), name.as_str()),
                None => (kw.start(), rank, kw.start(), "anonymous"),
            };
            hits.push(hit);
        }
    }
    hits.sort_by_key(|&(anchor, rank, ..)| (anchor, rank));
    hits.dedup_by_key(|&mut (anchor, ..)| anchor);
    hits.into_iter().map(|(_, _, offset, name)| (offset, name)).collect()
}

/// First capture group of every match of every regex, ordered by offset.
fn captures<'s>(source: &'s str, regexes: &[&Regex]) -> Vec<(usize, &'s str)> {
    let mut found: Vec<(usize, &str)> = regexes
        .iter()
        .flat_map(|re| re.captures_iter(source))
        .filter_map(|caps| caps.get(1).map(|m| (m.start(), m.as_str())))
        .collect();
    found.sort_by_key(|&(offset, _)| offset);
    found.dedup_by_key(|&mut (offset, _)| offset);
    found
}

/// Byte offset → 1-based line number.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> Sections {
        TextPatternStrategy.analyze(source)
    }

    #[test]
    fn extracts_functions_in_document_order() {
        let source = "\
function first(a) {
const second = (b) => b;
third = function (c) {
";
        let sections = run(source);
        let names: Vec<_> = sections.dependencies.functions.iter().map(|f| (f.name.as_str(), f.line)).collect();
        assert_eq!(names, vec![("first", 1), ("second", 2), ("third", 3)]);
        assert_eq!(sections.complexity.functions.len(), 3);
    }

    #[test]
    fn bare_parameter_arrows_and_unnamed_functions() {
        let source = "\
const double = x => x * 2;
[1].map(function (y) { return y; });
async function g() {
items.forEach(async item => {
";
        let names: Vec<_> = run(source)
            .dependencies
            .functions
            .iter()
            .map(|f| (f.name.clone(), f.line))
            .collect();
        assert_eq!(
            names,
            vec![
                ("double".to_string(), 1),
                ("anonymous".to_string(), 2),
                ("g".to_string(), 3),
                ("anonymous".to_string(), 4),
            ]
        );
    }

    #[test]
    fn named_function_expression_is_one_function() {
        let sections = run("const a = function b(x) {\nlet handler = async function () {");
        let names: Vec<_> = sections.dependencies.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "handler"]);
    }

    #[test]
    fn imports_requires_and_exports() {
        let source = "\
import { a } from 'x'
const b = require(\"y\");
export default function main( {
export const answer = 42;
";
        let sections = run(source);
        assert_eq!(sections.dependencies.imports, vec!["x", "y"]);
        assert_eq!(sections.dependencies.exports, vec!["main", "answer"]);
        let vars: Vec<_> = sections.dependencies.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(vars, vec!["b", "answer"]);
    }

    #[test]
    fn cyclomatic_counts_branch_keywords() {
        let sections = run("if (a) { for (;;) { while (b) {} } } } catch (e) {");
        assert_eq!(sections.complexity.cyclomatic, 5);
        // Keywords inside identifiers do not count.
        assert_eq!(run("const iffy = forEach;").complexity.cyclomatic, 1);
    }

    #[test]
    fn security_and_cloud_stay_empty() {
        let sections = run("eval(x) import aws from 'aws-sdk' {");
        assert!(sections.security.findings.is_empty());
        assert_eq!(sections.security.score, 5.0);
        assert!(sections.cloud_services.is_empty());
    }

    #[test]
    fn line_index_maps_offsets() {
        let idx = LineIndex::new("a\nbc\n\nd");
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(2), 2);
        assert_eq!(idx.line_of(5), 3);
        assert_eq!(idx.line_of(6), 4);
    }
}
