//! `.codeflow` configuration: ignore rules, disabled security rules and
//! extra cloud vendors.
//!
//! Directory traversal depends only on the [`IgnoreRules`] trait.
//! [`CodeflowConfig`] is the production implementation; it discovers and
//! parses a `.codeflow` TOML file (walking upward to the git root) and
//! honours `.gitignore` by default.  [`AllowAll`] and [`PatternIgnore`] are
//! test doubles with no filesystem access.

use std::path::{Path, PathBuf};

use anyhow::Context;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::Deserialize;
use tracing::warn;

use crate::analyzers::cloud::Vendor;
use crate::report::FindingKind;

pub const CONFIG_FILE_NAME: &str = ".codeflow";

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Decides which paths a directory scan skips.
pub trait IgnoreRules: Send + Sync {
    fn is_ignored(&self, path: &Path) -> bool;
}

/// Skips nothing.
pub struct AllowAll;

impl IgnoreRules for AllowAll {
    #[inline]
    fn is_ignored(&self, _path: &Path) -> bool {
        false
    }
}

/// Skips any path with a component equal to one of the given names.
///
/// ```
/// use codeflow_core::config::{IgnoreRules, PatternIgnore};
/// use std::path::Path;
///
/// let rules = PatternIgnore(vec!["node_modules".into(), "dist".into()]);
/// assert!(rules.is_ignored(Path::new("/project/node_modules/x/index.js")));
/// assert!(!rules.is_ignored(Path::new("/project/src/distance.js")));
/// ```
pub struct PatternIgnore(pub Vec<String>);

impl IgnoreRules for PatternIgnore {
    fn is_ignored(&self, path: &Path) -> bool {
        path.components()
            .any(|c| self.0.iter().any(|name| c.as_os_str() == name.as_str()))
    }
}

// ---------------------------------------------------------------------------
// TOML config types
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    ignore: IgnoreSection,
    #[serde(default)]
    security: SecuritySection,
    #[serde(default)]
    cloud: CloudSection,
}

#[derive(Deserialize)]
struct IgnoreSection {
    /// Additional gitignore-style patterns to exclude.
    #[serde(default)]
    patterns: Vec<String>,
    #[serde(default = "bool_true")]
    use_gitignore: bool,
}

impl Default for IgnoreSection {
    fn default() -> Self {
        Self { patterns: vec![], use_gitignore: true }
    }
}

#[derive(Deserialize, Default)]
struct SecuritySection {
    /// Catalogue tags to skip, e.g. `"unsafe-regex"`.
    #[serde(default)]
    disabled: Vec<String>,
}

#[derive(Deserialize, Default)]
struct CloudSection {
    #[serde(default)]
    vendors: Vec<Vendor>,
}

fn bool_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// CodeflowConfig
// ---------------------------------------------------------------------------

/// Loaded `.codeflow` settings.
///
/// ```toml
/// [ignore]
/// patterns = ["dist/", "*.min.js"]   # gitignore syntax, additive
/// use_gitignore = true
///
/// [security]
/// disabled = ["unsafe-regex"]
///
/// [[cloud.vendors]]
/// pattern  = "@vercel/"
/// provider = "Vercel"
/// service  = "Vercel SDK"
/// usage    = "Edge and storage APIs"
/// ```
pub struct CodeflowConfig {
    root: PathBuf,
    use_gitignore: bool,
    /// Root `.gitignore` rules plus the extra patterns.
    matcher: Gitignore,
    disabled_rules: Vec<FindingKind>,
    vendors: Vec<Vendor>,
}

impl CodeflowConfig {
    /// Discover and load the nearest `.codeflow`, walking upward from `start`
    /// to the git root.  Uses defaults when none is found; a file that cannot
    /// be parsed is reported with `warn!` and replaced by defaults.
    pub fn load(start: &Path) -> Self {
        let root = find_config_root(start);
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Self::from_parts(root, ConfigFile::default());
        }
        match read_config(&path) {
            Ok(file) => Self::from_parts(root, file),
            Err(err) => {
                warn!(path = %path.display(), error = %format!("{err:#}"), "ignoring unreadable config; using defaults");
                Self::from_parts(root, ConfigFile::default())
            }
        }
    }

    /// Load an explicit config file.  Errors if it cannot be read or parsed,
    /// or names an unknown security rule.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let file = read_config(path)?;
        let root = path.parent().unwrap_or(path).to_path_buf();
        Ok(Self::from_parts(root, file))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn use_gitignore(&self) -> bool {
        self.use_gitignore
    }

    pub fn disabled_rules(&self) -> &[FindingKind] {
        &self.disabled_rules
    }

    /// Vendors declared in `[[cloud.vendors]]`, in file order.
    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    fn from_parts(root: PathBuf, file: ConfigFile) -> Self {
        let matcher = build_matcher(&root, &file.ignore.patterns, file.ignore.use_gitignore);
        let disabled_rules = file
            .security
            .disabled
            .iter()
            .filter_map(|tag| tag.parse().ok())
            .collect();
        Self {
            root,
            use_gitignore: file.ignore.use_gitignore,
            matcher,
            disabled_rules,
            vendors: file.cloud.vendors,
        }
    }
}

impl Default for CodeflowConfig {
    fn default() -> Self {
        Self::from_parts(PathBuf::from("."), ConfigFile::default())
    }
}

impl IgnoreRules for CodeflowConfig {
    /// Matches the path or any of its parents, so files inside an ignored
    /// directory are ignored too.
    fn is_ignored(&self, path: &Path) -> bool {
        // The matcher only accepts paths below its root.
        let rel = match path.strip_prefix(&self.root) {
            Ok(rel) => rel,
            Err(_) if path.has_root() => return false,
            Err(_) => path,
        };
        if rel.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(rel, path.is_dir())
            .is_ignore()
    }
}

fn read_config(path: &Path) -> anyhow::Result<ConfigFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: ConfigFile = toml::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    for tag in &file.security.disabled {
        tag.parse::<FindingKind>()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid [security] entry in {}", path.display()))?;
    }
    Ok(file)
}

/// Walk upward from `start` looking for a `.codeflow` file or a `.git`
/// directory.  Falls back to `start` (as a directory) when neither exists.
fn find_config_root(start: &Path) -> PathBuf {
    let dir = if start.is_file() {
        start.parent().unwrap_or(start)
    } else {
        start
    };

    let mut current = dir;
    loop {
        if current.join(CONFIG_FILE_NAME).is_file() || current.join(".git").is_dir() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(p) => current = p,
            None => return dir.to_path_buf(),
        }
    }
}

fn build_matcher(root: &Path, patterns: &[String], use_gitignore: bool) -> Gitignore {
    let mut b = GitignoreBuilder::new(root);
    if use_gitignore {
        let gi = root.join(".gitignore");
        if gi.is_file() {
            if let Some(err) = b.add(gi) {
                warn!(error = %err, "skipping malformed .gitignore");
            }
        }
    }
    for p in patterns {
        if let Err(err) = b.add_line(None, p) {
            warn!(pattern = %p, error = %err, "skipping invalid ignore pattern");
        }
    }
    b.build().unwrap_or_else(|_| Gitignore::empty())
}
