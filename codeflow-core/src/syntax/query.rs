//! Structural pattern matching over a [`SyntaxTree`].
//!
//! A [`NodePattern`] is a disjunctive set of [`SyntaxKind`]s plus a
//! conjunction of [`Predicate`]s.  A query carries several patterns and a
//! node matches when any one of them does.  Results come back in pre-order,
//! which is document order for this tree.

use super::{LiteralValue, LogicalOperator, NodeId, NodeKind, SyntaxKind, SyntaxTree};

/// Attribute constraint on a matched node.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Call / `new` whose callee is the identifier `name`.
    CalleeIdentifier(&'static str),
    /// Call / `new` whose callee is `name.<member>`.
    CalleeObjectIdentifier(&'static str),
    /// Non-computed member access whose property is one of the names.
    PropertyNamed(&'static [&'static str]),
    LogicalOperator(LogicalOperator),
    /// Regex literal.
    IsRegex,
    /// Literal whose raw source text contains any of the needles.
    RawContains(&'static [&'static str]),
    /// String literal whose value contains any of the needles.
    StringValueContains(&'static [&'static str]),
    Custom(fn(&SyntaxTree, NodeId) -> bool),
}

impl Predicate {
    fn holds(&self, tree: &SyntaxTree, id: NodeId) -> bool {
        let kind = tree.kind(id);
        match self {
            Predicate::CalleeIdentifier(name) => {
                callee(kind).and_then(|c| tree.identifier_name(c)) == Some(*name)
            }
            Predicate::CalleeObjectIdentifier(name) => match callee(kind).map(|c| tree.kind(c)) {
                Some(NodeKind::MemberExpression { object, .. }) => {
                    tree.identifier_name(*object) == Some(*name)
                }
                _ => false,
            },
            Predicate::PropertyNamed(names) => tree
                .member_property_name(id)
                .map(|p| names.contains(&p))
                .unwrap_or(false),
            Predicate::LogicalOperator(op) => {
                matches!(kind, NodeKind::LogicalExpression { operator, .. } if operator == op)
            }
            Predicate::IsRegex => matches!(
                tree.literal(id).map(|l| &l.value),
                Some(LiteralValue::Regex { .. })
            ),
            Predicate::RawContains(needles) => tree
                .literal(id)
                .map(|l| needles.iter().any(|n| l.raw.contains(n)))
                .unwrap_or(false),
            Predicate::StringValueContains(needles) => tree
                .string_value(id)
                .map(|s| needles.iter().any(|n| s.contains(n)))
                .unwrap_or(false),
            Predicate::Custom(f) => f(tree, id),
        }
    }
}

fn callee(kind: &NodeKind) -> Option<NodeId> {
    match kind {
        NodeKind::CallExpression { callee, .. } | NodeKind::NewExpression { callee, .. } => {
            Some(*callee)
        }
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct NodePattern {
    kinds: Vec<SyntaxKind>,
    predicates: Vec<Predicate>,
}

impl NodePattern {
    pub fn kind(kind: SyntaxKind) -> Self {
        Self::kinds(&[kind])
    }

    pub fn kinds(kinds: &[SyntaxKind]) -> Self {
        Self { kinds: kinds.to_vec(), predicates: Vec::new() }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn matches(&self, tree: &SyntaxTree, id: NodeId) -> bool {
        self.kinds.contains(&tree.kind(id).syntax_kind())
            && self.predicates.iter().all(|p| p.holds(tree, id))
    }
}

/// How far a scoped query descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Whole subtree.
    Deep,
    /// Nested function-like nodes are still matched, but their bodies are not
    /// searched.  The start node itself is always searched.
    StopAtFunctions,
}

/// All nodes of `tree` matching any of `patterns`, in document order.
pub fn query(tree: &SyntaxTree, patterns: &[NodePattern]) -> Vec<NodeId> {
    query_from(tree, tree.root(), patterns, Scope::Deep)
}

/// Query the subtree rooted at `start` (inclusive).
pub fn query_from(
    tree: &SyntaxTree,
    start: NodeId,
    patterns: &[NodePattern],
    scope: Scope,
) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let kind = tree.kind(id);
        if patterns.iter().any(|p| p.matches(tree, id)) {
            out.push(id);
        }
        if scope == Scope::StopAtFunctions && id != start && kind.syntax_kind().is_function() {
            continue;
        }
        stack.extend(kind.children().into_iter().rev());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::syntax::parse;

    fn tree(source: &str) -> SyntaxTree {
        parse(source, Language::JavaScript).expect("valid source")
    }

    #[test]
    fn matches_callee_identifier() {
        let t = tree("eval('a'); foo.eval('b'); eval(x);");
        let hits = query(
            &t,
            &[NodePattern::kind(SyntaxKind::CallExpression).with(Predicate::CalleeIdentifier("eval"))],
        );
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn results_are_in_document_order() {
        let t = tree("a();\nfunction f() { b(); }\nc();\n");
        let hits = query(&t, &[NodePattern::kind(SyntaxKind::CallExpression)]);
        let lines: Vec<_> = hits.iter().map(|&id| t.node(id).line()).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn multiple_patterns_are_disjunctive() {
        let t = tree("x.innerHTML = y; z.outerHTML; w.textContent;");
        let hits = query(
            &t,
            &[
                NodePattern::kind(SyntaxKind::MemberExpression).with(Predicate::PropertyNamed(&["innerHTML"])),
                NodePattern::kind(SyntaxKind::MemberExpression).with(Predicate::PropertyNamed(&["outerHTML"])),
            ],
        );
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn scoped_query_stops_at_nested_functions() {
        let t = tree("function outer() { if (a) {} const g = () => { if (b) {} }; }");
        let outer = query(&t, &[NodePattern::kind(SyntaxKind::FunctionDeclaration)])[0];
        let pattern = [NodePattern::kind(SyntaxKind::IfStatement)];
        assert_eq!(query_from(&t, outer, &pattern, Scope::StopAtFunctions).len(), 1);
        assert_eq!(query_from(&t, outer, &pattern, Scope::Deep).len(), 2);
    }

    #[test]
    fn logical_operator_and_literal_predicates() {
        let t = tree("const re = /x+/; const s = 'my secret'; a || b; c && d;");
        let or = query(
            &t,
            &[NodePattern::kind(SyntaxKind::LogicalExpression)
                .with(Predicate::LogicalOperator(LogicalOperator::Or))],
        );
        assert_eq!(or.len(), 1);
        let regex = query(&t, &[NodePattern::kind(SyntaxKind::Literal).with(Predicate::IsRegex)]);
        assert_eq!(regex.len(), 1);
        let raw = query(
            &t,
            &[NodePattern::kind(SyntaxKind::Literal).with(Predicate::RawContains(&["secret"]))],
        );
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn no_match_is_empty() {
        let t = tree("let a = 1;");
        assert!(query(&t, &[NodePattern::kind(SyntaxKind::TryStatement)]).is_empty());
    }

    #[test]
    fn custom_predicate() {
        fn is_answer(tree: &SyntaxTree, id: NodeId) -> bool {
            matches!(tree.literal(id).map(|l| &l.value), Some(LiteralValue::Number(n)) if *n == 42.0)
        }
        let t = tree("f(41, 42, 43);");
        let hits = query(&t, &[NodePattern::kind(SyntaxKind::Literal).with(Predicate::Custom(is_answer))]);
        assert_eq!(hits.len(), 1);
    }
}
