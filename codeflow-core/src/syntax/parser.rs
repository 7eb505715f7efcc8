use std::fmt;

use tracing::debug;
use tree_sitter::Node as TsNode;

use super::{
    Class, Comment, DeclarationKind, Function, Literal, LiteralValue, LogicalOperator, Node,
    NodeId, NodeKind, Param, Span, SyntaxTree,
};
use crate::error::ParseError;
use crate::language::Language;

/// Tree-sitter grammar used for one parse attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    JavaScript,
    TypeScript,
    Tsx,
}

impl Grammar {
    /// Grammar configurations tried for `language`: primary first, then the
    /// alternate that accepts the other dialect's top-level syntax.
    pub fn attempts(language: Language) -> &'static [Grammar] {
        match language {
            Language::TypeScript => &[Grammar::TypeScript, Grammar::Tsx],
            _ => &[Grammar::JavaScript, Grammar::Tsx],
        }
    }

    pub fn ts_language(self) -> tree_sitter::Language {
        match self {
            Grammar::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Grammar::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Grammar::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Grammar::JavaScript => "javascript",
            Grammar::TypeScript => "typescript",
            Grammar::Tsx => "tsx",
        })
    }
}

/// Parse `source` into a [`SyntaxTree`].
///
/// Tries each grammar from [`Grammar::attempts`] in turn and returns the first
/// tree that contains no error or missing nodes.
pub fn parse(source: &str, language: Language) -> Result<SyntaxTree, ParseError> {
    let mut attempts = Vec::new();
    for &grammar in Grammar::attempts(language) {
        match parse_with(source, grammar) {
            Ok(tree) => {
                debug!(%grammar, nodes = tree.len(), "parsed source");
                return Ok(tree);
            }
            Err(reason) => {
                debug!(%grammar, %reason, "parse attempt failed");
                attempts.push(format!("{grammar}: {reason}"));
            }
        }
    }
    Err(ParseError { language, attempts })
}

/// Single strict parse with one grammar.
pub fn parse_with(source: &str, grammar: Grammar) -> Result<SyntaxTree, String> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&grammar.ts_language())
        .map_err(|e| format!("grammar error: {e}"))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| "parser produced no tree".to_string())?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(first_error(root));
    }
    if exceeds_depth(root, MAX_TREE_DEPTH) {
        return Err(format!("nesting deeper than {MAX_TREE_DEPTH} levels"));
    }
    Ok(Builder::new(source).finish(root))
}

/// Deepest named-node nesting lowered into the arena.  The lowering
/// recurses once per level, so deeper sources are refused and take the
/// text-pattern path instead.
pub const MAX_TREE_DEPTH: usize = 128;

fn exceeds_depth(root: TsNode<'_>, limit: usize) -> bool {
    let mut stack = vec![(root, 1usize)];
    while let Some((node, depth)) = stack.pop() {
        if depth > limit {
            return true;
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().map(|c| (c, depth + 1)));
    }
    false
}

fn first_error(root: TsNode<'_>) -> String {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() {
            return format!("syntax error at line {}", node.start_position().row + 1);
        }
        if node.is_missing() {
            return format!("missing `{}` at line {}", node.kind(), node.start_position().row + 1);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).filter(|c| c.has_error()).collect();
        stack.extend(children.into_iter().rev());
    }
    "syntax error".to_string()
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "comment" | "html_comment")
}

fn named_children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !is_comment(c.kind()))
        .collect()
}

fn has_token(node: TsNode<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| !c.is_named() && c.kind() == token);
    found
}

fn span_of(node: TsNode<'_>) -> Span {
    Span {
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
        start_offset: node.start_byte(),
        end_offset: node.end_byte(),
    }
}

/// Converts a tree-sitter CST into the owned arena.
struct Builder<'s> {
    src: &'s str,
    nodes: Vec<Node>,
    comments: Vec<Comment>,
}

impl<'s> Builder<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, nodes: Vec::new(), comments: Vec::new() }
    }

    fn finish(mut self, root: TsNode<'_>) -> SyntaxTree {
        self.collect_comments(root);
        let root = self.convert(root);
        SyntaxTree::new(self.nodes, root, self.comments)
    }

    fn text(&self, node: TsNode<'_>) -> &'s str {
        self.src.get(node.byte_range()).unwrap_or("")
    }

    fn push(&mut self, node: TsNode<'_>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { span: span_of(node), kind });
        id
    }

    fn collect_comments(&mut self, root: TsNode<'_>) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if is_comment(node.kind()) {
                let text = self.text(node).to_string();
                self.comments.push(Comment { span: span_of(node), text });
                continue;
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }

    fn convert_all(&mut self, nodes: Vec<TsNode<'_>>) -> Vec<NodeId> {
        nodes.into_iter().map(|n| self.convert(n)).collect()
    }

    fn field(&mut self, node: TsNode<'_>, name: &str) -> Option<NodeId> {
        node.child_by_field_name(name).map(|c| self.convert(c))
    }

    /// Required field; an empty `Other` placeholder keeps the tree total when
    /// a grammar omits it.
    fn required(&mut self, node: TsNode<'_>, name: &str) -> NodeId {
        match node.child_by_field_name(name) {
            Some(child) => self.convert(child),
            None => self.push(node, NodeKind::Other { kind: "missing", children: vec![] }),
        }
    }

    fn first_named(&mut self, node: TsNode<'_>) -> Option<NodeId> {
        named_children(node).into_iter().next().map(|c| self.convert(c))
    }

    fn convert(&mut self, node: TsNode<'_>) -> NodeId {
        let kind = match node.kind() {
            "program" => NodeKind::Program { body: self.convert_all(named_children(node)) },

            "function_declaration" | "generator_function_declaration" => {
                NodeKind::FunctionDeclaration(self.function(node))
            }
            "function_expression" | "function" | "generator_function" => {
                NodeKind::FunctionExpression(self.function(node))
            }
            "arrow_function" => NodeKind::ArrowFunction(self.function(node)),
            "method_definition" => NodeKind::MethodDefinition(self.function(node)),

            "class_declaration" | "abstract_class_declaration" => {
                NodeKind::ClassDeclaration(self.class(node))
            }
            "class" => NodeKind::ClassExpression(self.class(node)),

            "variable_declaration" | "lexical_declaration" => {
                let kind = match node.child_by_field_name("kind").map(|k| self.text(k)) {
                    Some("let") => DeclarationKind::Let,
                    Some("const") => DeclarationKind::Const,
                    _ => DeclarationKind::Var,
                };
                let declarators = named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() == "variable_declarator")
                    .collect();
                NodeKind::VariableDeclaration { kind, declarators: self.convert_all(declarators) }
            }
            "variable_declarator" => NodeKind::VariableDeclarator {
                id: self.required(node, "name"),
                init: self.field(node, "value"),
            },

            "object_pattern" => NodeKind::ObjectPattern {
                properties: self.convert_all(named_children(node)),
            },
            "array_pattern" => NodeKind::ArrayPattern {
                elements: self.convert_all(named_children(node)),
            },
            "assignment_pattern" | "object_assignment_pattern" => NodeKind::AssignmentPattern {
                left: self.required(node, "left"),
                right: self.required(node, "right"),
            },
            "rest_pattern" => match self.first_named(node) {
                Some(argument) => NodeKind::RestElement { argument },
                None => NodeKind::Other { kind: node.kind(), children: vec![] },
            },
            "pair" | "pair_pattern" => {
                let key = match node.child_by_field_name("key") {
                    Some(k) => self.property_key(k),
                    None => self.push(node, NodeKind::Other { kind: "missing", children: vec![] }),
                };
                NodeKind::Property { key, value: self.field(node, "value") }
            }

            "import_statement" => {
                // `import x = require("y")` keeps its source on the clause.
                let source = node
                    .child_by_field_name("source")
                    .or_else(|| {
                        named_children(node)
                            .into_iter()
                            .find(|c| c.kind() == "import_require_clause")
                            .and_then(|c| c.child_by_field_name("source"))
                    })
                    .map(|s| string_value(self.text(s)))
                    .unwrap_or_default();
                let mut specifiers = Vec::new();
                for child in named_children(node) {
                    if child.kind() == "import_clause" {
                        self.import_names(child, &mut specifiers);
                    }
                }
                NodeKind::ImportDeclaration { source, specifiers }
            }
            "export_statement" => self.export(node),

            "statement_block" => NodeKind::BlockStatement {
                body: self.convert_all(named_children(node)),
            },
            "expression_statement" => match self.first_named(node) {
                Some(expression) => NodeKind::ExpressionStatement { expression },
                None => NodeKind::Other { kind: node.kind(), children: vec![] },
            },
            "return_statement" => NodeKind::ReturnStatement { argument: self.first_named(node) },
            "if_statement" => {
                let test = self.required(node, "condition");
                let consequent = self.required(node, "consequence");
                let alternate = node
                    .child_by_field_name("alternative")
                    .and_then(|alt| self.first_named(alt));
                NodeKind::IfStatement { test, consequent, alternate }
            }
            "while_statement" => NodeKind::WhileStatement {
                test: self.required(node, "condition"),
                body: self.required(node, "body"),
            },
            "do_statement" => NodeKind::DoWhileStatement {
                body: self.required(node, "body"),
                test: self.required(node, "condition"),
            },
            "for_statement" => NodeKind::ForStatement {
                init: self.field(node, "initializer"),
                test: self.field(node, "condition"),
                update: self.field(node, "increment"),
                body: self.required(node, "body"),
            },
            "for_in_statement" => {
                let is_of = node
                    .child_by_field_name("operator")
                    .map(|op| op.kind() == "of")
                    .unwrap_or(false);
                let left = self.required(node, "left");
                let right = self.required(node, "right");
                let body = self.required(node, "body");
                if is_of {
                    NodeKind::ForOfStatement { left, right, body }
                } else {
                    NodeKind::ForInStatement { left, right, body }
                }
            }
            "switch_statement" => {
                let discriminant = self.required(node, "value");
                let cases = node
                    .child_by_field_name("body")
                    .map(named_children)
                    .unwrap_or_default();
                NodeKind::SwitchStatement { discriminant, cases: self.convert_all(cases) }
            }
            "switch_case" | "switch_default" => {
                let test = self.field(node, "value");
                let mut cursor = node.walk();
                let body: Vec<_> = node
                    .children_by_field_name("body", &mut cursor)
                    .filter(|c| !is_comment(c.kind()))
                    .collect();
                NodeKind::SwitchCase { test, consequent: self.convert_all(body) }
            }
            "try_statement" => NodeKind::TryStatement {
                block: self.required(node, "body"),
                handler: self.field(node, "handler"),
                finalizer: node
                    .child_by_field_name("finalizer")
                    .and_then(|f| self.field(f, "body")),
            },
            "catch_clause" => NodeKind::CatchClause {
                param: self.field(node, "parameter"),
                body: self.required(node, "body"),
            },

            "ternary_expression" => NodeKind::ConditionalExpression {
                test: self.required(node, "condition"),
                consequent: self.required(node, "consequence"),
                alternate: self.required(node, "alternative"),
            },
            "binary_expression" => {
                let operator = node
                    .child_by_field_name("operator")
                    .map(|op| op.kind())
                    .unwrap_or("");
                let left = self.required(node, "left");
                let right = self.required(node, "right");
                match LogicalOperator::from_token(operator) {
                    Some(operator) => NodeKind::LogicalExpression { operator, left, right },
                    None => NodeKind::BinaryExpression { operator: operator.to_string(), left, right },
                }
            }
            "assignment_expression" | "augmented_assignment_expression" => {
                let operator = node
                    .child_by_field_name("operator")
                    .map(|op| self.text(op).to_string())
                    .unwrap_or_else(|| "=".to_string());
                NodeKind::AssignmentExpression {
                    operator,
                    left: self.required(node, "left"),
                    right: self.required(node, "right"),
                }
            }
            "call_expression" => {
                let callee = self.required(node, "function");
                let arguments = self.arguments(node);
                NodeKind::CallExpression { callee, arguments }
            }
            "new_expression" => {
                let callee = self.required(node, "constructor");
                let arguments = self.arguments(node);
                NodeKind::NewExpression { callee, arguments }
            }
            "member_expression" => NodeKind::MemberExpression {
                object: self.required(node, "object"),
                property: self.required(node, "property"),
                computed: false,
            },
            "subscript_expression" => NodeKind::MemberExpression {
                object: self.required(node, "object"),
                property: self.required(node, "index"),
                computed: true,
            },
            "array" => NodeKind::ArrayExpression { elements: self.convert_all(named_children(node)) },
            "object" => {
                let mut properties = Vec::new();
                for child in named_children(node) {
                    if child.kind() == "shorthand_property_identifier" {
                        let key = self.identifier(child);
                        properties.push(self.push(child, NodeKind::Property { key, value: None }));
                    } else {
                        properties.push(self.convert(child));
                    }
                }
                NodeKind::ObjectExpression { properties }
            }
            "template_string" => {
                let raw = self.text(node).to_string();
                let substitutions = named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() == "template_substitution")
                    .collect::<Vec<_>>();
                let mut expressions = Vec::new();
                for sub in substitutions {
                    if let Some(expr) = self.first_named(sub) {
                        expressions.push(expr);
                    }
                }
                NodeKind::TemplateLiteral { raw, expressions }
            }
            "parenthesized_expression" | "else_clause" | "finally_clause" => {
                let inner = named_children(node);
                if inner.len() == 1 {
                    return self.convert(inner[0]);
                }
                NodeKind::Other { kind: node.kind(), children: self.convert_all(inner) }
            }

            "identifier"
            | "property_identifier"
            | "shorthand_property_identifier"
            | "shorthand_property_identifier_pattern"
            | "private_property_identifier"
            | "statement_identifier"
            | "type_identifier"
            | "undefined"
            | "import" => NodeKind::Identifier { name: self.text(node).to_string() },

            "string" => {
                let raw = self.text(node);
                NodeKind::Literal(Literal {
                    raw: raw.to_string(),
                    value: LiteralValue::String(string_value(raw)),
                })
            }
            "number" => {
                let raw = self.text(node);
                NodeKind::Literal(Literal {
                    raw: raw.to_string(),
                    value: LiteralValue::Number(number_value(raw)),
                })
            }
            "true" | "false" => NodeKind::Literal(Literal {
                raw: self.text(node).to_string(),
                value: LiteralValue::Boolean(node.kind() == "true"),
            }),
            "null" => NodeKind::Literal(Literal {
                raw: "null".to_string(),
                value: LiteralValue::Null,
            }),
            "regex" => {
                let pattern = node
                    .child_by_field_name("pattern")
                    .map(|p| self.text(p).to_string())
                    .unwrap_or_default();
                let flags = node
                    .child_by_field_name("flags")
                    .map(|f| self.text(f).to_string())
                    .unwrap_or_default();
                NodeKind::Literal(Literal {
                    raw: self.text(node).to_string(),
                    value: LiteralValue::Regex { pattern, flags },
                })
            }

            other => NodeKind::Other {
                kind: other,
                children: self.convert_all(named_children(node)),
            },
        };
        self.push(node, kind)
    }

    fn identifier(&mut self, node: TsNode<'_>) -> NodeId {
        let name = self.text(node).to_string();
        self.push(node, NodeKind::Identifier { name })
    }

    fn property_key(&mut self, key: TsNode<'_>) -> NodeId {
        match key.kind() {
            "property_identifier" | "private_property_identifier" => self.identifier(key),
            _ => self.convert(key),
        }
    }

    fn arguments(&mut self, node: TsNode<'_>) -> Vec<NodeId> {
        match node.child_by_field_name("arguments") {
            Some(args) if args.kind() == "arguments" => self.convert_all(named_children(args)),
            // Tagged template: the template itself is the only argument.
            Some(template) => vec![self.convert(template)],
            None => Vec::new(),
        }
    }

    fn function(&mut self, node: TsNode<'_>) -> Function {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string());
        let params = match node.child_by_field_name("parameters") {
            Some(list) => named_children(list)
                .into_iter()
                .map(|p| self.param(p))
                .collect(),
            None => node
                .child_by_field_name("parameter")
                .map(|p| vec![self.param(p)])
                .unwrap_or_default(),
        };
        let body = match node.child_by_field_name("body") {
            Some(body) => self.convert(body),
            None => self.push(node, NodeKind::BlockStatement { body: vec![] }),
        };
        Function { name, params, body }
    }

    fn param(&mut self, node: TsNode<'_>) -> Param {
        match node.kind() {
            "required_parameter" | "optional_parameter" => {
                let type_annotation = node
                    .child_by_field_name("type")
                    .map(|t| self.text(t).trim_start_matches(':').trim().to_string());
                let pattern = self.required(node, "pattern");
                let pattern = match node.child_by_field_name("value") {
                    Some(value) => {
                        let right = self.convert(value);
                        self.push(node, NodeKind::AssignmentPattern { left: pattern, right })
                    }
                    None => pattern,
                };
                Param { pattern, type_annotation }
            }
            _ => Param { pattern: self.convert(node), type_annotation: None },
        }
    }

    fn class(&mut self, node: TsNode<'_>) -> Class {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string());
        let heritage = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "class_heritage");
        let superclass = heritage.and_then(|h| self.superclass(h));
        let members = node
            .child_by_field_name("body")
            .map(named_children)
            .unwrap_or_default();
        Class { name, superclass, body: self.convert_all(members) }
    }

    fn superclass(&mut self, heritage: TsNode<'_>) -> Option<NodeId> {
        let first = named_children(heritage).into_iter().next()?;
        match first.kind() {
            "extends_clause" => self.field(first, "value"),
            "implements_clause" => None,
            _ => Some(self.convert(first)),
        }
    }

    fn import_names(&self, clause: TsNode<'_>, out: &mut Vec<String>) {
        for child in named_children(clause) {
            match child.kind() {
                "identifier" => out.push(self.text(child).to_string()),
                "namespace_import" | "named_imports" => self.import_names(child, out),
                "import_specifier" => {
                    let local = child
                        .child_by_field_name("alias")
                        .or_else(|| child.child_by_field_name("name"));
                    if let Some(local) = local {
                        out.push(string_value(self.text(local)));
                    }
                }
                _ => {}
            }
        }
    }

    fn export(&mut self, node: TsNode<'_>) -> NodeKind {
        let is_default = has_token(node, "default");
        if let Some(decl) = node.child_by_field_name("declaration") {
            let declaration = self.convert(decl);
            return if is_default {
                NodeKind::ExportDefaultDeclaration { declaration }
            } else {
                NodeKind::ExportNamedDeclaration { declaration: Some(declaration), specifiers: vec![], source: None }
            };
        }
        if let Some(value) = node.child_by_field_name("value") {
            return NodeKind::ExportDefaultDeclaration { declaration: self.convert(value) };
        }

        let mut specifiers = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "export_clause" => {
                    for spec in named_children(child) {
                        let exported = spec
                            .child_by_field_name("alias")
                            .or_else(|| spec.child_by_field_name("name"));
                        if let Some(exported) = exported {
                            specifiers.push(string_value(self.text(exported)));
                        }
                    }
                }
                "namespace_export" => {
                    if let Some(name) = named_children(child).into_iter().next() {
                        specifiers.push(string_value(self.text(name)));
                    }
                }
                _ => {}
            }
        }
        let source = node
            .child_by_field_name("source")
            .map(|s| string_value(self.text(s)));
        NodeKind::ExportNamedDeclaration { declaration: None, specifiers, source }
    }
}

/// Value of a quoted string literal; unquoted text is returned unchanged.
fn string_value(raw: &str) -> String {
    let quoted = raw.len() >= 2
        && (raw.starts_with('"') || raw.starts_with('\''))
        && raw.ends_with(&raw[..1]);
    if quoted {
        unescape(&raw[1..raw.len() - 1])
    } else {
        raw.to_string()
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &hex, "\\x");
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|&c| c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut out, &hex, "\\u");
            }
            // Line continuation.
            Some('\n') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_code_point(out: &mut String, hex: &str, prefix: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => {
            out.push_str(prefix);
            out.push_str(hex);
        }
    }
}

fn number_value(raw: &str) -> f64 {
    let cleaned = raw.replace('_', "");
    let cleaned = cleaned.trim_end_matches('n');
    let radix = |prefix: &str, radix: u32| {
        cleaned
            .strip_prefix(prefix)
            .or_else(|| cleaned.strip_prefix(&prefix.to_ascii_uppercase()))
            .map(|digits| i64::from_str_radix(digits, radix).map(|v| v as f64).unwrap_or(f64::NAN))
    };
    radix("0x", 16)
        .or_else(|| radix("0o", 8))
        .or_else(|| radix("0b", 2))
        .unwrap_or_else(|| cleaned.parse().unwrap_or(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxKind;

    fn kinds(tree: &SyntaxTree) -> Vec<SyntaxKind> {
        (0..tree.len())
            .map(|i| tree.kind(NodeId(i as u32)).syntax_kind())
            .collect()
    }

    fn find<'t>(tree: &'t SyntaxTree, kind: SyntaxKind) -> Vec<&'t NodeKind> {
        (0..tree.len())
            .map(|i| tree.kind(NodeId(i as u32)))
            .filter(|k| k.syntax_kind() == kind)
            .collect()
    }

    #[test]
    fn parses_functions_arrows_and_classes() {
        let source = "\
function outer(a) { const inner = (b) => b * 2; return inner(a); }
class Child extends Base { method() { return 1; } }
";
        let tree = parse(source, Language::JavaScript).unwrap();
        let k = kinds(&tree);
        assert!(k.contains(&SyntaxKind::FunctionDeclaration));
        assert!(k.contains(&SyntaxKind::ArrowFunction));
        assert!(k.contains(&SyntaxKind::MethodDefinition));

        let classes = find(&tree, SyntaxKind::ClassDeclaration);
        let NodeKind::ClassDeclaration(class) = classes[0] else { unreachable!() };
        assert_eq!(class.name.as_deref(), Some("Child"));
        let superclass = class.superclass.expect("superclass present");
        assert_eq!(tree.identifier_name(superclass), Some("Base"));
    }

    #[test]
    fn regex_literal_keeps_pattern_source() {
        let tree = parse("const re = /(a+)+$/gi;", Language::JavaScript).unwrap();
        let regex = find(&tree, SyntaxKind::Literal)
            .into_iter()
            .find_map(|k| match k {
                NodeKind::Literal(Literal { value: LiteralValue::Regex { pattern, flags }, .. }) => {
                    Some((pattern.clone(), flags.clone()))
                }
                _ => None,
            })
            .expect("regex literal");
        assert_eq!(regex, ("(a+)+$".to_string(), "gi".to_string()));
    }

    #[test]
    fn string_literals_are_unescaped() {
        let tree = parse(r#"const s = 'it\'s A\x42';"#, Language::JavaScript).unwrap();
        let value = find(&tree, SyntaxKind::Literal)
            .into_iter()
            .find_map(|k| match k {
                NodeKind::Literal(lit) => lit.as_str().map(str::to_string),
                _ => None,
            })
            .unwrap();
        assert_eq!(value, "it's AB");
    }

    #[test]
    fn logical_operators_become_logical_expressions() {
        let tree = parse("a && b || c; d ?? e; x + y;", Language::JavaScript).unwrap();
        assert_eq!(find(&tree, SyntaxKind::LogicalExpression).len(), 3);
        assert_eq!(find(&tree, SyntaxKind::BinaryExpression).len(), 1);
    }

    #[test]
    fn for_of_and_for_in_are_distinguished() {
        let tree = parse("for (const a of xs) {} for (const k in obj) {}", Language::JavaScript).unwrap();
        assert_eq!(find(&tree, SyntaxKind::ForOfStatement).len(), 1);
        assert_eq!(find(&tree, SyntaxKind::ForInStatement).len(), 1);
    }

    #[test]
    fn switch_default_is_a_case_without_test() {
        let tree = parse("switch (x) { case 1: a(); break; default: b(); }", Language::JavaScript).unwrap();
        let cases = find(&tree, SyntaxKind::SwitchCase);
        assert_eq!(cases.len(), 2);
        assert!(matches!(cases.last(), Some(NodeKind::SwitchCase { test: None, .. })));
    }

    #[test]
    fn typescript_parameter_annotations_are_kept() {
        let tree = parse("function add(a: number, b = 2): number { return a + b; }", Language::TypeScript).unwrap();
        let funcs = find(&tree, SyntaxKind::FunctionDeclaration);
        let f = funcs[0].as_function().unwrap();
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0].type_annotation.as_deref(), Some("number"));
        assert_eq!(tree.kind(f.params[1].pattern).syntax_kind(), SyntaxKind::AssignmentPattern);
    }

    #[test]
    fn import_and_export_payloads() {
        let source = "\
import def, { a as b, c } from './mod';
export { x, y as z };
export const w = 1;
export default function main() {}
";
        let tree = parse(source, Language::JavaScript).unwrap();
        let imports = find(&tree, SyntaxKind::ImportDeclaration);
        assert!(matches!(
            imports[0],
            NodeKind::ImportDeclaration { source, specifiers }
                if source == "./mod" && specifiers == &["def", "b", "c"]
        ));
        let named = find(&tree, SyntaxKind::ExportNamedDeclaration);
        assert_eq!(named.len(), 2);
        assert!(matches!(
            named[0],
            NodeKind::ExportNamedDeclaration { specifiers, .. } if specifiers == &["x", "z"]
        ));
        assert_eq!(find(&tree, SyntaxKind::ExportDefaultDeclaration).len(), 1);
    }

    #[test]
    fn unbalanced_braces_fail_every_attempt() {
        let err = parse("function broken( {", Language::JavaScript).unwrap_err();
        assert_eq!(err.language, Language::JavaScript);
        assert_eq!(err.attempts.len(), 2);
        assert!(err.attempts[0].starts_with("javascript:"));
        assert!(err.attempts[1].starts_with("tsx:"));
    }

    #[test]
    fn alternate_grammar_accepts_annotated_javascript() {
        // Type annotations are not JavaScript; the TSX attempt accepts them.
        assert!(parse_with("let n: number = 1;", Grammar::JavaScript).is_err());
        assert!(parse("let n: number = 1;", Language::JavaScript).is_ok());
    }

    #[test]
    fn deep_nesting_is_refused_before_lowering() {
        let nested = |n: usize| format!("const x = {}1{};", "[".repeat(n), "]".repeat(n));
        let err = parse_with(&nested(MAX_TREE_DEPTH + 50), Grammar::JavaScript).unwrap_err();
        assert!(err.contains("nesting deeper than"), "{err}");
        assert!(parse_with(&nested(40), Grammar::JavaScript).is_ok());
    }

    #[test]
    fn parsing_is_deterministic() {
        let source = "const a = { b: [1, 2], c: () => d?.e };";
        let first = parse(source, Language::JavaScript).unwrap();
        let second = parse(source, Language::JavaScript).unwrap();
        assert_eq!(kinds(&first), kinds(&second));
    }

    #[test]
    fn number_literals_in_all_radixes() {
        assert_eq!(number_value("0x1F"), 31.0);
        assert_eq!(number_value("0b101"), 5.0);
        assert_eq!(number_value("1_000"), 1000.0);
        assert_eq!(number_value("10n"), 10.0);
        assert_eq!(number_value("1.5e2"), 150.0);
    }
}
