//! Cross-file dependency map built from per-file reports.
//!
//! Pure post-processing: nothing here reads the filesystem or re-runs the
//! analyzers.

use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::report::AnalysisReport;

/// One analyzed file of a project.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    /// Path as displayed to the user; also the file node id.
    pub path: String,
    pub source: String,
    pub report: AnalysisReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MapNode {
    File {
        id: String,
        language: Language,
        complexity: u32,
        security: f64,
    },
    Function {
        id: String,
        label: String,
        parent: String,
        complexity: u32,
        line: usize,
    },
}

impl MapNode {
    pub fn id(&self) -> &str {
        match self {
            MapNode::File { id, .. } | MapNode::Function { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Import,
    Call,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    /// Import source or the exported name that was referenced.
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyMap {
    pub nodes: Vec<MapNode>,
    pub edges: Vec<MapEdge>,
}

pub fn build_dependency_map(files: &[ProjectFile]) -> DependencyMap {
    let mut map = DependencyMap::default();

    for file in files {
        let report = &file.report;
        map.nodes.push(MapNode::File {
            id: file.path.clone(),
            language: report.metadata.language,
            complexity: report.complexity.cyclomatic,
            security: report.security.score,
        });
        for func in &report.dependencies.functions {
            map.nodes.push(MapNode::Function {
                id: format!("{}#{}", file.path, func.name),
                label: func.name.clone(),
                parent: file.path.clone(),
                complexity: func.complexity,
                line: func.line,
            });
        }
    }

    for (i, file) in files.iter().enumerate() {
        for import in &file.report.dependencies.imports {
            let needle = import.strip_prefix("./").unwrap_or(import);
            if needle.is_empty() {
                continue;
            }
            for target in others(files, i).filter(|t| t.path.contains(needle)) {
                map.edges.push(MapEdge {
                    from: file.path.clone(),
                    to: target.path.clone(),
                    kind: EdgeKind::Import,
                    label: import.clone(),
                });
            }
        }
    }

    for (i, caller) in files.iter().enumerate() {
        for callee in others(files, i) {
            for name in &callee.report.dependencies.exports {
                if !name.is_empty() && caller.source.contains(name.as_str()) {
                    map.edges.push(MapEdge {
                        from: caller.path.clone(),
                        to: callee.path.clone(),
                        kind: EdgeKind::Call,
                        label: name.clone(),
                    });
                }
            }
        }
    }

    map
}

/// Every file except the one at `skip`.
fn others(files: &[ProjectFile], skip: usize) -> impl Iterator<Item = &ProjectFile> {
    files
        .iter()
        .enumerate()
        .filter(move |&(j, _)| j != skip)
        .map(|(_, f)| f)
}
