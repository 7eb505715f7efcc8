//! Owned syntax tree for JavaScript / TypeScript sources.
//!
//! The tree is an arena: nodes live in a single `Vec` and refer to their
//! children by [`NodeId`].  Each node carries a closed [`NodeKind`] with one
//! variant per syntax kind the analyzers care about; everything else is kept
//! as [`NodeKind::Other`] so traversal still reaches nested code.
//!
//! Parent links are not stored in nodes.  [`SyntaxTree::new`] builds an
//! auxiliary parent table in one pass, which answers enclosing-scope queries
//! in O(depth) without a cyclic ownership graph.

pub mod parser;
pub mod query;

use std::fmt;

pub use parser::parse;

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source location of a node.  Lines are 1-based, offsets are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Span {
    pub fn contains(&self, other: &Span) -> bool {
        self.start_offset <= other.start_offset && other.end_offset <= self.end_offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub span: Span,
    pub kind: NodeKind,
}

impl Node {
    pub fn line(&self) -> usize {
        self.span.start_line
    }
}

/// Shared payload of every function-like node.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Declared name, or the method key for methods.
    pub name: Option<String>,
    pub params: Vec<Param>,
    /// A `BlockStatement`, or an expression for concise arrow bodies.
    pub body: NodeId,
}

/// A formal parameter: its binding pattern plus an optional type annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub pattern: NodeId,
    pub type_annotation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: Option<String>,
    pub superclass: Option<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Nullish,
}

impl LogicalOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "&&" => Some(LogicalOperator::And),
            "||" => Some(LogicalOperator::Or),
            "??" => Some(LogicalOperator::Nullish),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Regex { pattern: String, flags: String },
}

impl LiteralValue {
    /// The value's JavaScript `typeof` category.
    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::String(_) => "string",
            LiteralValue::Number(_) => "number",
            LiteralValue::Boolean(_) => "boolean",
            LiteralValue::Null | LiteralValue::Regex { .. } => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// Source text including quotes / slashes.
    pub raw: String,
    pub value: LiteralValue,
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program { body: Vec<NodeId> },

    FunctionDeclaration(Function),
    FunctionExpression(Function),
    ArrowFunction(Function),
    MethodDefinition(Function),

    ClassDeclaration(Class),
    ClassExpression(Class),

    VariableDeclaration { kind: DeclarationKind, declarators: Vec<NodeId> },
    VariableDeclarator { id: NodeId, init: Option<NodeId> },

    ObjectPattern { properties: Vec<NodeId> },
    ArrayPattern { elements: Vec<NodeId> },
    AssignmentPattern { left: NodeId, right: NodeId },
    RestElement { argument: NodeId },

    ImportDeclaration { source: String, specifiers: Vec<String> },
    ExportNamedDeclaration {
        declaration: Option<NodeId>,
        specifiers: Vec<String>,
        source: Option<String>,
    },
    ExportDefaultDeclaration { declaration: NodeId },

    BlockStatement { body: Vec<NodeId> },
    ExpressionStatement { expression: NodeId },
    ReturnStatement { argument: Option<NodeId> },
    IfStatement { test: NodeId, consequent: NodeId, alternate: Option<NodeId> },
    WhileStatement { test: NodeId, body: NodeId },
    DoWhileStatement { body: NodeId, test: NodeId },
    ForStatement {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    ForInStatement { left: NodeId, right: NodeId, body: NodeId },
    ForOfStatement { left: NodeId, right: NodeId, body: NodeId },
    SwitchStatement { discriminant: NodeId, cases: Vec<NodeId> },
    /// `test` is `None` for `default:`.
    SwitchCase { test: Option<NodeId>, consequent: Vec<NodeId> },
    TryStatement { block: NodeId, handler: Option<NodeId>, finalizer: Option<NodeId> },
    CatchClause { param: Option<NodeId>, body: NodeId },

    ConditionalExpression { test: NodeId, consequent: NodeId, alternate: NodeId },
    LogicalExpression { operator: LogicalOperator, left: NodeId, right: NodeId },
    BinaryExpression { operator: String, left: NodeId, right: NodeId },
    AssignmentExpression { operator: String, left: NodeId, right: NodeId },
    CallExpression { callee: NodeId, arguments: Vec<NodeId> },
    NewExpression { callee: NodeId, arguments: Vec<NodeId> },
    MemberExpression { object: NodeId, property: NodeId, computed: bool },
    ArrayExpression { elements: Vec<NodeId> },
    ObjectExpression { properties: Vec<NodeId> },
    /// Object literal / object pattern entry.  `value` is `None` for shorthand.
    Property { key: NodeId, value: Option<NodeId> },
    TemplateLiteral { raw: String, expressions: Vec<NodeId> },

    Identifier { name: String },
    Literal(Literal),

    /// Any syntax kind without a dedicated variant.
    Other { kind: &'static str, children: Vec<NodeId> },
}

/// Fieldless mirror of [`NodeKind`] used by the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Program,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    MethodDefinition,
    ClassDeclaration,
    ClassExpression,
    VariableDeclaration,
    VariableDeclarator,
    ObjectPattern,
    ArrayPattern,
    AssignmentPattern,
    RestElement,
    ImportDeclaration,
    ExportNamedDeclaration,
    ExportDefaultDeclaration,
    BlockStatement,
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    SwitchStatement,
    SwitchCase,
    TryStatement,
    CatchClause,
    ConditionalExpression,
    LogicalExpression,
    BinaryExpression,
    AssignmentExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    ArrayExpression,
    ObjectExpression,
    Property,
    TemplateLiteral,
    Identifier,
    Literal,
    Other,
}

impl SyntaxKind {
    /// Function-like kinds; each one opens a new complexity / scope boundary.
    pub const FUNCTIONS: &'static [SyntaxKind] = &[
        SyntaxKind::FunctionDeclaration,
        SyntaxKind::FunctionExpression,
        SyntaxKind::ArrowFunction,
        SyntaxKind::MethodDefinition,
    ];

    pub fn is_function(self) -> bool {
        Self::FUNCTIONS.contains(&self)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl NodeKind {
    pub fn syntax_kind(&self) -> SyntaxKind {
        match self {
            NodeKind::Program { .. } => SyntaxKind::Program,
            NodeKind::FunctionDeclaration(_) => SyntaxKind::FunctionDeclaration,
            NodeKind::FunctionExpression(_) => SyntaxKind::FunctionExpression,
            NodeKind::ArrowFunction(_) => SyntaxKind::ArrowFunction,
            NodeKind::MethodDefinition(_) => SyntaxKind::MethodDefinition,
            NodeKind::ClassDeclaration(_) => SyntaxKind::ClassDeclaration,
            NodeKind::ClassExpression(_) => SyntaxKind::ClassExpression,
            NodeKind::VariableDeclaration { .. } => SyntaxKind::VariableDeclaration,
            NodeKind::VariableDeclarator { .. } => SyntaxKind::VariableDeclarator,
            NodeKind::ObjectPattern { .. } => SyntaxKind::ObjectPattern,
            NodeKind::ArrayPattern { .. } => SyntaxKind::ArrayPattern,
            NodeKind::AssignmentPattern { .. } => SyntaxKind::AssignmentPattern,
            NodeKind::RestElement { .. } => SyntaxKind::RestElement,
            NodeKind::ImportDeclaration { .. } => SyntaxKind::ImportDeclaration,
            NodeKind::ExportNamedDeclaration { .. } => SyntaxKind::ExportNamedDeclaration,
            NodeKind::ExportDefaultDeclaration { .. } => SyntaxKind::ExportDefaultDeclaration,
            NodeKind::BlockStatement { .. } => SyntaxKind::BlockStatement,
            NodeKind::ExpressionStatement { .. } => SyntaxKind::ExpressionStatement,
            NodeKind::ReturnStatement { .. } => SyntaxKind::ReturnStatement,
            NodeKind::IfStatement { .. } => SyntaxKind::IfStatement,
            NodeKind::WhileStatement { .. } => SyntaxKind::WhileStatement,
            NodeKind::DoWhileStatement { .. } => SyntaxKind::DoWhileStatement,
            NodeKind::ForStatement { .. } => SyntaxKind::ForStatement,
            NodeKind::ForInStatement { .. } => SyntaxKind::ForInStatement,
            NodeKind::ForOfStatement { .. } => SyntaxKind::ForOfStatement,
            NodeKind::SwitchStatement { .. } => SyntaxKind::SwitchStatement,
            NodeKind::SwitchCase { .. } => SyntaxKind::SwitchCase,
            NodeKind::TryStatement { .. } => SyntaxKind::TryStatement,
            NodeKind::CatchClause { .. } => SyntaxKind::CatchClause,
            NodeKind::ConditionalExpression { .. } => SyntaxKind::ConditionalExpression,
            NodeKind::LogicalExpression { .. } => SyntaxKind::LogicalExpression,
            NodeKind::BinaryExpression { .. } => SyntaxKind::BinaryExpression,
            NodeKind::AssignmentExpression { .. } => SyntaxKind::AssignmentExpression,
            NodeKind::CallExpression { .. } => SyntaxKind::CallExpression,
            NodeKind::NewExpression { .. } => SyntaxKind::NewExpression,
            NodeKind::MemberExpression { .. } => SyntaxKind::MemberExpression,
            NodeKind::ArrayExpression { .. } => SyntaxKind::ArrayExpression,
            NodeKind::ObjectExpression { .. } => SyntaxKind::ObjectExpression,
            NodeKind::Property { .. } => SyntaxKind::Property,
            NodeKind::TemplateLiteral { .. } => SyntaxKind::TemplateLiteral,
            NodeKind::Identifier { .. } => SyntaxKind::Identifier,
            NodeKind::Literal(_) => SyntaxKind::Literal,
            NodeKind::Other { .. } => SyntaxKind::Other,
        }
    }

    /// The function payload of a function-like node.
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            NodeKind::FunctionDeclaration(f)
            | NodeKind::FunctionExpression(f)
            | NodeKind::ArrowFunction(f)
            | NodeKind::MethodDefinition(f) => Some(f),
            _ => None,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        fn opt(out: &mut Vec<NodeId>, id: &Option<NodeId>) {
            if let Some(id) = id {
                out.push(*id);
            }
        }

        let mut out = Vec::new();
        match self {
            NodeKind::Program { body }
            | NodeKind::BlockStatement { body } => out.extend(body),
            NodeKind::FunctionDeclaration(f)
            | NodeKind::FunctionExpression(f)
            | NodeKind::ArrowFunction(f)
            | NodeKind::MethodDefinition(f) => {
                out.extend(f.params.iter().map(|p| p.pattern));
                out.push(f.body);
            }
            NodeKind::ClassDeclaration(c) | NodeKind::ClassExpression(c) => {
                opt(&mut out, &c.superclass);
                out.extend(&c.body);
            }
            NodeKind::VariableDeclaration { declarators, .. } => out.extend(declarators),
            NodeKind::VariableDeclarator { id, init } => {
                out.push(*id);
                opt(&mut out, init);
            }
            NodeKind::ObjectPattern { properties } | NodeKind::ObjectExpression { properties } => {
                out.extend(properties)
            }
            NodeKind::ArrayPattern { elements } | NodeKind::ArrayExpression { elements } => {
                out.extend(elements)
            }
            NodeKind::AssignmentPattern { left, right }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::AssignmentExpression { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::RestElement { argument } => out.push(*argument),
            NodeKind::ImportDeclaration { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::Literal(_) => {}
            NodeKind::ExportNamedDeclaration { declaration, .. } => opt(&mut out, declaration),
            NodeKind::ExportDefaultDeclaration { declaration } => out.push(*declaration),
            NodeKind::ExpressionStatement { expression } => out.push(*expression),
            NodeKind::ReturnStatement { argument } => opt(&mut out, argument),
            NodeKind::IfStatement { test, consequent, alternate } => {
                out.push(*test);
                out.push(*consequent);
                opt(&mut out, alternate);
            }
            NodeKind::WhileStatement { test, body } => {
                out.push(*test);
                out.push(*body);
            }
            NodeKind::DoWhileStatement { body, test } => {
                out.push(*body);
                out.push(*test);
            }
            NodeKind::ForStatement { init, test, update, body } => {
                opt(&mut out, init);
                opt(&mut out, test);
                opt(&mut out, update);
                out.push(*body);
            }
            NodeKind::ForInStatement { left, right, body }
            | NodeKind::ForOfStatement { left, right, body } => {
                out.push(*left);
                out.push(*right);
                out.push(*body);
            }
            NodeKind::SwitchStatement { discriminant, cases } => {
                out.push(*discriminant);
                out.extend(cases);
            }
            NodeKind::SwitchCase { test, consequent } => {
                opt(&mut out, test);
                out.extend(consequent);
            }
            NodeKind::TryStatement { block, handler, finalizer } => {
                out.push(*block);
                opt(&mut out, handler);
                opt(&mut out, finalizer);
            }
            NodeKind::CatchClause { param, body } => {
                opt(&mut out, param);
                out.push(*body);
            }
            NodeKind::ConditionalExpression { test, consequent, alternate } => {
                out.push(*test);
                out.push(*consequent);
                out.push(*alternate);
            }
            NodeKind::CallExpression { callee, arguments }
            | NodeKind::NewExpression { callee, arguments } => {
                out.push(*callee);
                out.extend(arguments);
            }
            NodeKind::MemberExpression { object, property, .. } => {
                out.push(*object);
                out.push(*property);
            }
            NodeKind::Property { key, value } => {
                out.push(*key);
                opt(&mut out, value);
            }
            NodeKind::TemplateLiteral { expressions, .. } => out.extend(expressions),
            NodeKind::Other { children, .. } => out.extend(children),
        }
        out
    }
}

/// A source comment, kept apart from the node tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub span: Span,
    pub text: String,
}

/// Immutable parsed program.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
    comments: Vec<Comment>,
    parents: Vec<Option<NodeId>>,
}

impl SyntaxTree {
    /// Take ownership of the arena and build the parent table.
    pub(crate) fn new(nodes: Vec<Node>, root: NodeId, comments: Vec<Comment>) -> Self {
        let mut parents = vec![None; nodes.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in nodes[id.index()].kind.children() {
                parents[child.index()] = Some(id);
                stack.push(child);
            }
        }
        Self { nodes, root, comments, parents }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Nearest enclosing function-like node, if any.
    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&a| self.kind(a).syntax_kind().is_function())
    }

    /// Name of an identifier node.
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    pub fn literal(&self, id: NodeId) -> Option<&Literal> {
        match self.kind(id) {
            NodeKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn string_value(&self, id: NodeId) -> Option<&str> {
        self.literal(id).and_then(Literal::as_str)
    }

    /// Key of an object property: identifier name or string literal value.
    pub fn property_key(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Property { key, .. } => {
                self.identifier_name(*key).or_else(|| self.string_value(*key))
            }
            _ => None,
        }
    }

    /// Non-computed member property name (`obj.name`).
    pub fn member_property_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::MemberExpression { property, computed: false, .. } => {
                self.identifier_name(*property)
            }
            _ => None,
        }
    }

    /// Identifier names bound by a declaration pattern, in source order.
    pub fn bound_names(&self, pattern: NodeId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut stack = vec![pattern];
        while let Some(id) = stack.pop() {
            match self.kind(id) {
                NodeKind::Identifier { name } => names.push(name.as_str()),
                NodeKind::ObjectPattern { properties } => {
                    stack.extend(properties.iter().rev())
                }
                NodeKind::ArrayPattern { elements } => stack.extend(elements.iter().rev()),
                NodeKind::Property { key, value } => stack.push(value.unwrap_or(*key)),
                NodeKind::AssignmentPattern { left, .. } => stack.push(*left),
                NodeKind::RestElement { argument } => stack.push(*argument),
                _ => {}
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn tree(source: &str) -> SyntaxTree {
        parse(source, Language::JavaScript).expect("valid source")
    }

    #[test]
    fn parent_map_links_children_to_parents() {
        let t = tree("function f() { return 1; }");
        let root = t.root();
        assert_eq!(t.parent(root), None);
        for id in (0..t.len()).map(|i| NodeId(i as u32)) {
            if id != root {
                let parent = t.parent(id).expect("non-root node has a parent");
                assert!(t.kind(parent).children().contains(&id));
            }
        }
    }

    #[test]
    fn child_spans_are_contained_in_parent_spans() {
        let t = tree("const a = [1, 2, { b: `x${a}` }];\nclass C extends D { m() {} }\n");
        for id in (0..t.len()).map(|i| NodeId(i as u32)) {
            if let Some(parent) = t.parent(id) {
                assert!(t.node(parent).span.contains(&t.node(id).span));
            }
        }
    }

    #[test]
    fn enclosing_function_walks_ancestors() {
        let t = tree("function outer() { const inner = () => { x(); }; }");
        let call = (0..t.len())
            .map(|i| NodeId(i as u32))
            .find(|&id| matches!(t.kind(id), NodeKind::CallExpression { .. }))
            .unwrap();
        let func = t.enclosing_function(call).unwrap();
        assert_eq!(t.kind(func).syntax_kind(), SyntaxKind::ArrowFunction);
    }

    #[test]
    fn bound_names_expands_destructuring() {
        let t = tree("const { a, b: [c, ...d], e = 1 } = obj;");
        let declarator = (0..t.len())
            .map(|i| NodeId(i as u32))
            .find(|&id| matches!(t.kind(id), NodeKind::VariableDeclarator { .. }))
            .unwrap();
        let NodeKind::VariableDeclarator { id, .. } = t.kind(declarator) else {
            unreachable!()
        };
        assert_eq!(t.bound_names(*id), vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn comments_are_collected_separately() {
        let t = tree("// leading\nlet x = 1; /* trailing */\n");
        assert_eq!(t.comments().len(), 2);
        assert_eq!(t.comments()[0].text, "// leading");
        assert_eq!(t.comments()[1].span.start_line, 2);
    }
}
