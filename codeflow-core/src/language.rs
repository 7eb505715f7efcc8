use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Source languages recognised by the engine.
///
/// Only JavaScript and TypeScript receive tree-based analysis; every other
/// language gets the text metrics with empty analysis sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    Cpp,
    C,
    Php,
    Ruby,
    Go,
    Rust,
    Unknown,
}

impl Language {
    /// Map a file extension (without the dot) to a language.
    pub fn from_extension(ext: &str) -> Language {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "py" => Language::Python,
            "java" => Language::Java,
            "cpp" => Language::Cpp,
            "c" => Language::C,
            "php" => Language::Php,
            "rb" => Language::Ruby,
            "go" => Language::Go,
            "rs" => Language::Rust,
            _ => Language::Unknown,
        }
    }

    /// Detect the language of a file from its extension.
    pub fn detect(path: &Path) -> Language {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Language::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Guess a language from file content, for sources without a usable
    /// extension.  Module or block-scoped declarations mean JavaScript, then
    /// `def ` means Python, then class-member visibility means Java;
    /// anything else is taken as JavaScript.
    pub fn sniff(source: &str) -> Language {
        const SCRIPT: &[&str] = &["import ", "export ", "const ", "let "];
        if SCRIPT.iter().any(|kw| source.contains(kw)) {
            Language::JavaScript
        } else if source.contains("def ") {
            Language::Python
        } else if source.contains("public class") || source.contains("private ") {
            Language::Java
        } else {
            Language::JavaScript
        }
    }

    /// Extension first; content when the extension is missing or unknown.
    pub fn detect_source(path: &Path, source: &str) -> Language {
        match Language::detect(path) {
            Language::Unknown => Language::sniff(source),
            known => known,
        }
    }

    /// `true` for the languages the syntax parser understands.
    pub fn is_tree_analyzable(self) -> bool {
        matches!(self, Language::JavaScript | Language::TypeScript)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "javascript" | "js" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "python" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "cpp" => Ok(Language::Cpp),
            "c" => Ok(Language::C),
            "php" => Ok(Language::Php),
            "ruby" => Ok(Language::Ruby),
            "go" => Ok(Language::Go),
            "rust" => Ok(Language::Rust),
            "unknown" => Ok(Language::Unknown),
            other => Err(format!("unknown language: {other}")),
        }
    }
}
