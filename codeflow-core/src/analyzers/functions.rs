//! Per-function facts shared by the complexity and dependency analyzers.

use std::sync::LazyLock;

use crate::report::{FunctionRecord, ParameterRecord, ReturnCategory};
use crate::syntax::query::{query, query_from, NodePattern, Predicate, Scope};
use crate::syntax::{LogicalOperator, NodeId, NodeKind, Param, SyntaxKind, SyntaxTree};

/// Nodes that add one path through the code.
pub static DECISION_POINTS: LazyLock<Vec<NodePattern>> = LazyLock::new(|| {
    vec![
        NodePattern::kinds(&[
            SyntaxKind::IfStatement,
            SyntaxKind::WhileStatement,
            SyntaxKind::ForStatement,
            SyntaxKind::ForInStatement,
            SyntaxKind::ForOfStatement,
            SyntaxKind::SwitchCase,
            SyntaxKind::ConditionalExpression,
            SyntaxKind::CatchClause,
        ]),
        NodePattern::kind(SyntaxKind::LogicalExpression)
            .with(Predicate::LogicalOperator(LogicalOperator::And)),
        NodePattern::kind(SyntaxKind::LogicalExpression)
            .with(Predicate::LogicalOperator(LogicalOperator::Or)),
    ]
});

/// Every function-like node in document order.
pub fn function_nodes(tree: &SyntaxTree) -> Vec<NodeId> {
    query(tree, &[NodePattern::kinds(SyntaxKind::FUNCTIONS)])
}

/// 1 + decision points whose innermost enclosing function is `func`.
pub fn function_complexity(tree: &SyntaxTree, func: NodeId) -> u32 {
    1 + query_from(tree, func, &DECISION_POINTS, Scope::StopAtFunctions).len() as u32
}

/// Declared name, or the name of the binding the function value is
/// assigned to (variable, property, assignment target, default parameter).
pub fn function_name(tree: &SyntaxTree, func: NodeId) -> Option<String> {
    let declared = tree.kind(func).as_function().and_then(|f| f.name.clone());
    if declared.is_some() {
        return declared;
    }
    let parent = tree.parent(func)?;
    let name = match tree.kind(parent) {
        NodeKind::VariableDeclarator { id, init: Some(init) } if *init == func => {
            tree.identifier_name(*id)
        }
        NodeKind::Property { value: Some(value), .. } if *value == func => {
            tree.property_key(parent)
        }
        NodeKind::AssignmentExpression { left, right, .. } if *right == func => tree
            .identifier_name(*left)
            .or_else(|| tree.member_property_name(*left)),
        NodeKind::AssignmentPattern { left, right } if *right == func => {
            tree.identifier_name(*left)
        }
        _ => None,
    };
    name.map(str::to_string)
}

pub fn parameters(tree: &SyntaxTree, func: NodeId) -> Vec<ParameterRecord> {
    tree.kind(func)
        .as_function()
        .map(|f| f.params.iter().map(|p| parameter(tree, p)).collect())
        .unwrap_or_default()
}

fn parameter(tree: &SyntaxTree, param: &Param) -> ParameterRecord {
    let default = match tree.kind(param.pattern) {
        NodeKind::AssignmentPattern { right, .. } => Some(*right),
        _ => None,
    };
    let type_name = param
        .type_annotation
        .clone()
        .or_else(|| {
            default
                .and_then(|d| tree.literal(d))
                .map(|lit| lit.value.type_name().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());
    ParameterRecord { name: pattern_label(tree, param.pattern), type_name }
}

/// Bound name of a simple, default-valued or rest parameter; a placeholder
/// for destructuring patterns.
fn pattern_label(tree: &SyntaxTree, pattern: NodeId) -> String {
    match tree.kind(pattern) {
        NodeKind::Identifier { name } => name.clone(),
        NodeKind::AssignmentPattern { left, .. } => pattern_label(tree, *left),
        NodeKind::RestElement { argument } => pattern_label(tree, *argument),
        NodeKind::ObjectPattern { .. } => "ObjectPattern".to_string(),
        NodeKind::ArrayPattern { .. } => "ArrayPattern".to_string(),
        _ => "unknown".to_string(),
    }
}

/// `void` when the function's own body has no `return`; expression-bodied
/// arrows always produce a value.
pub fn return_category(tree: &SyntaxTree, func: NodeId) -> ReturnCategory {
    let Some(f) = tree.kind(func).as_function() else {
        return ReturnCategory::Unknown;
    };
    if tree.kind(f.body).syntax_kind() != SyntaxKind::BlockStatement {
        return ReturnCategory::Mixed;
    }
    let returns = query_from(
        tree,
        f.body,
        &[NodePattern::kind(SyntaxKind::ReturnStatement)],
        Scope::StopAtFunctions,
    );
    if returns.is_empty() {
        ReturnCategory::Void
    } else {
        ReturnCategory::Mixed
    }
}

/// Full record for one function-like node.  Unnamed functions are reported
/// as `"anonymous"`.
pub fn function_record(tree: &SyntaxTree, func: NodeId) -> FunctionRecord {
    FunctionRecord {
        name: function_name(tree, func).unwrap_or_else(|| "anonymous".to_string()),
        line: tree.node(func).line(),
        complexity: function_complexity(tree, func),
        parameters: parameters(tree, func),
        return_type: return_category(tree, func),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::syntax::parse;

    fn records(source: &str, language: Language) -> Vec<FunctionRecord> {
        let tree = parse(source, language).unwrap();
        function_nodes(&tree)
            .into_iter()
            .map(|f| function_record(&tree, f))
            .collect()
    }

    #[test]
    fn names_are_inferred_from_bindings() {
        let source = "\
const a = () => 1;
const obj = { b: function () {}, c() {} };
module.exports.d = async () => {};
e = function () {};
[1].map(x => x);
";
        let names: Vec<_> = records(source, Language::JavaScript)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e", "anonymous"]);
    }

    #[test]
    fn nested_decisions_are_not_double_counted() {
        let source = "\
function outer(a) {
  if (a) {}
  const inner = () => { if (a && a.b) {} };
}";
        let recs = records(source, Language::JavaScript);
        assert_eq!(recs[0].name, "outer");
        assert_eq!(recs[0].complexity, 2);
        assert_eq!(recs[1].name, "inner");
        assert_eq!(recs[1].complexity, 3);
    }

    #[test]
    fn parameter_shapes_and_types() {
        let source = "function f(a, { b }, [c], d = 'x', ...rest) {}";
        let params = &records(source, Language::JavaScript)[0].parameters;
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "ObjectPattern", "ArrayPattern", "d", "rest"]);
        assert_eq!(params[3].type_name, "string");
        assert_eq!(params[0].type_name, "unknown");
    }

    #[test]
    fn typescript_annotations_win() {
        let params = &records("function f(id: string, n = 3) {}", Language::TypeScript)[0].parameters;
        assert_eq!(params[0].type_name, "string");
        assert_eq!(params[1].type_name, "number");
    }

    #[test]
    fn return_category_is_scoped_to_own_body() {
        let source = "\
function noReturn() { const g = () => { return 1; }; }
function withReturn() { return 2; }
const expr = () => 3;
";
        let recs = records(source, Language::JavaScript);
        assert_eq!(recs[0].return_type, ReturnCategory::Void);
        assert_eq!(recs[1].name, "g");
        assert_eq!(recs[1].return_type, ReturnCategory::Mixed);
        assert_eq!(recs[2].return_type, ReturnCategory::Mixed);
        assert_eq!(recs[3].return_type, ReturnCategory::Mixed);
    }
}
