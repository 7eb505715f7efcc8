use super::functions::{function_nodes, function_name, function_record};
use super::TreeAnalyzer;
use crate::report::{
    ApiCall, ApiClient, DataStore, DatabaseOperation, DependencyReport, ValueType,
    VariableRecord, VariableScope,
};
use crate::syntax::query::{query, NodePattern, Predicate};
use crate::syntax::{NodeId, NodeKind, SyntaxKind, SyntaxTree};

const MONGO_OPERATIONS: &[&str] = &["find", "findOne", "insert", "update", "delete", "aggregate"];
const SQL_KEYWORDS: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP"];

/// Imports, exports, functions, variables, outbound API calls and database
/// operations.
pub struct DependencyAnalyzer;

impl TreeAnalyzer for DependencyAnalyzer {
    type Output = DependencyReport;

    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn analyze(&self, tree: &SyntaxTree, source: &str) -> DependencyReport {
        extract_dependencies(tree, source)
    }
}

pub fn extract_dependencies(tree: &SyntaxTree, _source: &str) -> DependencyReport {
    DependencyReport {
        imports: import_sources(tree).into_iter().map(|i| i.source).collect(),
        exports: exports(tree),
        functions: function_nodes(tree)
            .into_iter()
            .filter(|&f| function_name(tree, f).is_some())
            .map(|f| function_record(tree, f))
            .collect(),
        variables: variables(tree),
        api_calls: api_calls(tree),
        database_operations: database_operations(tree),
    }
}

// ---------------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------------

/// A module specifier with the line it appears on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSource {
    pub source: String,
    pub line: usize,
}

/// ES imports, `require("x")` and `import("x")` in document order.  Calls
/// with a non-literal first argument are skipped.
pub fn import_sources(tree: &SyntaxTree) -> Vec<ImportSource> {
    let patterns = [
        NodePattern::kind(SyntaxKind::ImportDeclaration),
        NodePattern::kind(SyntaxKind::CallExpression).with(Predicate::CalleeIdentifier("require")),
        NodePattern::kind(SyntaxKind::CallExpression).with(Predicate::CalleeIdentifier("import")),
    ];
    query(tree, &patterns)
        .into_iter()
        .filter_map(|id| {
            let source = match tree.kind(id) {
                NodeKind::ImportDeclaration { source, .. } if !source.is_empty() => source.as_str(),
                NodeKind::CallExpression { arguments, .. } => {
                    arguments.first().and_then(|&arg| tree.string_value(arg))?
                }
                _ => return None,
            };
            Some(ImportSource { source: source.to_string(), line: tree.node(id).line() })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

fn exports(tree: &SyntaxTree) -> Vec<String> {
    let patterns = [NodePattern::kinds(&[
        SyntaxKind::ExportNamedDeclaration,
        SyntaxKind::ExportDefaultDeclaration,
    ])];
    let mut names = Vec::new();
    for id in query(tree, &patterns) {
        match tree.kind(id) {
            NodeKind::ExportNamedDeclaration { declaration, specifiers, .. } => {
                if let Some(decl) = declaration {
                    names.extend(declared_names(tree, *decl));
                }
                names.extend(specifiers.iter().cloned());
            }
            NodeKind::ExportDefaultDeclaration { declaration } => {
                names.extend(declared_names(tree, *declaration));
            }
            _ => {}
        }
    }
    names
}

/// Names introduced by a function, class or variable declaration.
fn declared_names(tree: &SyntaxTree, decl: NodeId) -> Vec<String> {
    match tree.kind(decl) {
        NodeKind::FunctionDeclaration(f) | NodeKind::FunctionExpression(f) => {
            f.name.iter().cloned().collect()
        }
        NodeKind::ClassDeclaration(c) | NodeKind::ClassExpression(c) => {
            c.name.iter().cloned().collect()
        }
        NodeKind::VariableDeclaration { declarators, .. } => declarators
            .iter()
            .filter_map(|&d| match tree.kind(d) {
                NodeKind::VariableDeclarator { id, .. } => Some(*id),
                _ => None,
            })
            .flat_map(|pattern| tree.bound_names(pattern))
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

fn variables(tree: &SyntaxTree) -> Vec<VariableRecord> {
    let mut out = Vec::new();
    for declarator in query(tree, &[NodePattern::kind(SyntaxKind::VariableDeclarator)]) {
        let NodeKind::VariableDeclarator { id, init } = tree.kind(declarator) else {
            continue;
        };
        let destructured = tree.identifier_name(*id).is_none();
        let value_type = if destructured {
            ValueType::Unknown
        } else {
            infer_value_type(tree, *init)
        };
        let scope = variable_scope(tree, declarator);
        let line = tree.node(declarator).line();
        for name in tree.bound_names(*id) {
            out.push(VariableRecord { name: name.to_string(), value_type, scope, line });
        }
    }
    out
}

fn infer_value_type(tree: &SyntaxTree, init: Option<NodeId>) -> ValueType {
    let Some(init) = init else {
        return ValueType::Undefined;
    };
    match tree.kind(init) {
        NodeKind::Literal(lit) => ValueType::from_type_name(lit.value.type_name()),
        NodeKind::TemplateLiteral { .. } => ValueType::String,
        NodeKind::ArrayExpression { .. } => ValueType::Array,
        NodeKind::ObjectExpression { .. } => ValueType::Object,
        NodeKind::FunctionExpression(_) | NodeKind::ArrowFunction(_) => ValueType::Function,
        _ => ValueType::Unknown,
    }
}

fn variable_scope(tree: &SyntaxTree, declarator: NodeId) -> VariableScope {
    if tree.enclosing_function(declarator).is_some() {
        VariableScope::Function
    } else if tree
        .ancestors(declarator)
        .any(|a| tree.kind(a).syntax_kind() == SyntaxKind::BlockStatement)
    {
        VariableScope::Block
    } else {
        VariableScope::Global
    }
}

// ---------------------------------------------------------------------------
// API calls
// ---------------------------------------------------------------------------

fn api_calls(tree: &SyntaxTree) -> Vec<ApiCall> {
    let patterns = [
        NodePattern::kind(SyntaxKind::CallExpression).with(Predicate::CalleeIdentifier("fetch")),
        NodePattern::kind(SyntaxKind::CallExpression).with(Predicate::CalleeObjectIdentifier("axios")),
    ];
    query(tree, &patterns)
        .into_iter()
        .filter_map(|id| {
            let NodeKind::CallExpression { callee, arguments } = tree.kind(id) else {
                return None;
            };
            let client = if tree.identifier_name(*callee) == Some("fetch") {
                ApiClient::Fetch
            } else {
                ApiClient::Axios
            };
            let endpoint = match arguments.first().map(|&a| (tree.string_value(a), tree.kind(a))) {
                Some((Some(url), _)) => url.to_string(),
                Some((None, NodeKind::TemplateLiteral { .. })) => "template_literal".to_string(),
                _ => "dynamic".to_string(),
            };
            let method = match client {
                ApiClient::Fetch => fetch_method(tree, arguments.get(1).copied()),
                ApiClient::Axios => "unknown".to_string(),
            };
            Some(ApiCall { client, endpoint, method, line: tree.node(id).line() })
        })
        .collect()
}

/// `method` of an object-literal options argument, defaulting to `GET`.
fn fetch_method(tree: &SyntaxTree, options: Option<NodeId>) -> String {
    let declared = options.and_then(|opts| match tree.kind(opts) {
        NodeKind::ObjectExpression { properties } => properties
            .iter()
            .find(|&&p| tree.property_key(p) == Some("method"))
            .and_then(|&p| match tree.kind(p) {
                NodeKind::Property { value: Some(value), .. } => tree.string_value(*value),
                _ => None,
            }),
        _ => None,
    });
    declared.unwrap_or("GET").to_string()
}

// ---------------------------------------------------------------------------
// Database operations
// ---------------------------------------------------------------------------

fn mongo_callee(tree: &SyntaxTree, id: NodeId) -> bool {
    mongo_operation(tree, id).is_some()
}

fn mongo_operation(tree: &SyntaxTree, call: NodeId) -> Option<&str> {
    let NodeKind::CallExpression { callee, .. } = tree.kind(call) else {
        return None;
    };
    let name = tree.member_property_name(*callee)?;
    MONGO_OPERATIONS.iter().any(|op| name.contains(op)).then_some(name)
}

fn database_operations(tree: &SyntaxTree) -> Vec<DatabaseOperation> {
    let calls = query(
        tree,
        &[NodePattern::kind(SyntaxKind::CallExpression).with(Predicate::Custom(mongo_callee))],
    );
    let mut out: Vec<DatabaseOperation> = calls
        .into_iter()
        .filter_map(|id| {
            mongo_operation(tree, id).map(|op| DatabaseOperation {
                store: DataStore::MongoDB,
                operation: op.to_string(),
                target: "collection".to_string(),
                line: tree.node(id).line(),
            })
        })
        .collect();

    let literals = query(
        tree,
        &[NodePattern::kind(SyntaxKind::Literal).with(Predicate::StringValueContains(SQL_KEYWORDS))],
    );
    for id in literals {
        let Some(text) = tree.string_value(id) else {
            continue;
        };
        if let Some(keyword) = SQL_KEYWORDS.iter().find(|k| text.contains(*k)) {
            out.push(DatabaseOperation {
                store: DataStore::Sql,
                operation: keyword.to_string(),
                target: "unknown".to_string(),
                line: tree.node(id).line(),
            });
        }
    }
    out
}
