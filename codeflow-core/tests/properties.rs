use codeflow_core::output::format_json;
use codeflow_core::report::{AnalysisMode, FindingKind, ReturnCategory, Severity};
use codeflow_core::{analyze, AnalysisError, Language};
use proptest::prelude::*;

fn js(source: &str) -> codeflow_core::AnalysisReport {
    analyze(source, "input.js", Language::JavaScript).unwrap()
}

#[test]
fn repeated_analysis_is_identical() {
    let source = "import a from 'aws-sdk';\nfunction f(x) { if (x) { eval(x); } return x; }\nel.innerHTML = f(1);";
    let first = format_json(&js(source)).unwrap();
    let second = format_json(&js(source)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn one_more_if_adds_exactly_one() {
    let before = js("function f(x) { return x; }");
    let after = js("function f(x) { if (x) { x += 1; } return x; }");
    assert_eq!(after.complexity.cyclomatic, before.complexity.cyclomatic + 1);
    assert_eq!(after.security.score, before.security.score);
}

#[test]
fn each_eval_costs_two_points() {
    let one = js("eval(a);");
    let two = js("eval(a);\neval(b);");
    assert_eq!(one.security.score, 3.0);
    assert_eq!(two.security.score, 1.0);
    assert_eq!(one.security.score - two.security.score, 2.0);
}

#[test]
fn invalid_text_still_reports() {
    let report = js("function ( { if while ]]]");
    assert_eq!(report.metadata.mode, AnalysisMode::TextFallback);
    assert!(report.complexity.cyclomatic >= 1);
    assert!(report.security.findings.is_empty());
}

#[test]
fn es_import_and_require_are_both_listed() {
    let report = js("import { a } from 'x'; const { b } = require('y');");
    assert_eq!(report.dependencies.imports, vec!["x", "y"]);
}

#[test]
fn single_function_with_branches() {
    let report = js("function f(x) { if (x) { return 1; } else { return 2; } }");
    assert_eq!(report.complexity.cyclomatic, 2);
    assert_eq!(report.dependencies.functions.len(), 1);
    let f = &report.dependencies.functions[0];
    assert_eq!(f.name, "f");
    assert_eq!(f.complexity, 2);
    let params: Vec<_> = f.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["x"]);
    assert_ne!(f.return_type, ReturnCategory::Void);
}

#[test]
fn eval_is_a_critical_finding() {
    let report = js("eval(\"alert(1)\")");
    assert_eq!(report.security.findings.len(), 1);
    assert_eq!(report.security.findings[0].kind, FindingKind::EvalUsage);
    assert_eq!(report.security.findings[0].severity, Severity::Critical);
    assert_eq!(report.security.score, 3.0);
}

#[test]
fn deeply_nested_input_still_reports() {
    for depth in [300, 5_000] {
        let source = format!("const x = {}1{};\n", "[".repeat(depth), "]".repeat(depth));
        let report = js(&source);
        assert_eq!(report.metadata.mode, AnalysisMode::TextFallback);
        assert_eq!(report.dependencies.variables[0].name, "x");
        assert_eq!(report.complexity.cyclomatic, 1);
    }
}

#[test]
fn empty_input_is_rejected() {
    let err = analyze("", "empty.js", Language::JavaScript).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidInput));
}

// ── Generated inputs ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn analysis_is_deterministic(source in "[a-z(){};=+.'\\n ]{1,80}") {
        prop_assume!(!source.trim().is_empty());
        let first = analyze(&source, "gen.js", Language::JavaScript).unwrap();
        let second = analyze(&source, "gen.js", Language::JavaScript).unwrap();
        prop_assert_eq!(format_json(&first).unwrap(), format_json(&second).unwrap());
    }

    #[test]
    fn score_stays_in_bounds(evals in 0usize..6, html in 0usize..6) {
        let mut source = String::from("let x = 1;\n");
        for i in 0..evals {
            source.push_str(&format!("eval(s{i});\n"));
        }
        for i in 0..html {
            source.push_str(&format!("el{i}.innerHTML = x;\n"));
        }
        let report = analyze(&source, "gen.js", Language::JavaScript).unwrap();
        let expected = (5.0 - 2.0 * evals as f64 - 0.5 * html as f64).max(0.0);
        prop_assert!((0.0..=5.0).contains(&report.security.score));
        prop_assert_eq!(report.security.score, expected);
        prop_assert_eq!(report.security.findings.len(), evals + html);
    }

    #[test]
    fn unclosed_source_never_errors(source in "[a-z(); ]{0,60}") {
        let text = format!("{source} {{");
        let report = analyze(&text, "gen.js", Language::JavaScript).unwrap();
        prop_assert_eq!(report.metadata.mode, AnalysisMode::TextFallback);
        prop_assert!(report.complexity.cyclomatic >= 1);
        prop_assert!(report.security.findings.is_empty());
        prop_assert_eq!(report.security.score, 5.0);
    }
}
