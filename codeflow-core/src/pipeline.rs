use tracing::debug;

use crate::analyzers::cloud::{CloudAnalyzer, VendorTable};
use crate::analyzers::complexity::ComplexityAnalyzer;
use crate::analyzers::dependencies::DependencyAnalyzer;
use crate::analyzers::run_guarded;
use crate::analyzers::security::{ConfiguredRules, SecurityAnalyzer};
use crate::config::CodeflowConfig;
use crate::error::{AnalysisError, Result};
use crate::fallback::TextPatternStrategy;
use crate::language::Language;
use crate::metrics::text_metrics;
use crate::report::{
    AnalysisMode, AnalysisReport, CloudServiceUsage, ComplexityReport, DependencyReport,
    ReportMetadata, SecurityReport,
};
use crate::syntax::{parse, SyntaxTree};

/// The four analysis sections every strategy fills in.
#[derive(Debug, Default)]
pub struct Sections {
    pub complexity: ComplexityReport,
    pub security: SecurityReport,
    pub dependencies: DependencyReport,
    pub cloud_services: Vec<CloudServiceUsage>,
}

/// One way of turning source text into report sections.
///
/// The pipeline picks exactly one strategy per input: the tree strategy when
/// parsing succeeds, [`TextPatternStrategy`] when it fails, and the
/// metrics-only strategy for languages without a parser.
pub trait AnalysisStrategy: Send + Sync {
    fn mode(&self) -> AnalysisMode;

    fn analyze(&self, source: &str) -> Sections;
}

/// Runs every tree analyzer over an already-parsed tree.
struct TreeStrategy<'a> {
    tree: &'a SyntaxTree,
    pipeline: &'a Pipeline,
}

impl AnalysisStrategy for TreeStrategy<'_> {
    fn mode(&self) -> AnalysisMode {
        AnalysisMode::Tree
    }

    fn analyze(&self, source: &str) -> Sections {
        let p = self.pipeline;
        Sections {
            complexity: run_guarded(&p.complexity, self.tree, source),
            security: run_guarded(&p.security, self.tree, source),
            dependencies: run_guarded(&p.dependencies, self.tree, source),
            cloud_services: run_guarded(&p.cloud, self.tree, source),
        }
    }
}

/// Empty sections; only the text metrics carry information.
struct MetricsOnlyStrategy;

impl AnalysisStrategy for MetricsOnlyStrategy {
    fn mode(&self) -> AnalysisMode {
        AnalysisMode::MetricsOnly
    }

    fn analyze(&self, _source: &str) -> Sections {
        Sections::default()
    }
}

/// Orchestrates parsing, strategy selection and the analyzers.
///
/// Holds only read-only tables, so one pipeline can serve concurrent calls.
pub struct Pipeline {
    complexity: ComplexityAnalyzer,
    security: SecurityAnalyzer,
    dependencies: DependencyAnalyzer,
    cloud: CloudAnalyzer,
}

impl Pipeline {
    /// Construct with an explicit rule set and vendor table.
    pub fn new(security: SecurityAnalyzer, cloud: CloudAnalyzer) -> Self {
        Self {
            complexity: ComplexityAnalyzer,
            security,
            dependencies: DependencyAnalyzer,
            cloud,
        }
    }

    /// Every security rule enabled and the built-in vendor table.
    pub fn with_defaults() -> Self {
        Self::new(SecurityAnalyzer::default(), CloudAnalyzer::default())
    }

    /// Apply the `[security]` and `[[cloud.vendors]]` sections of a loaded
    /// config.  Configured vendors are matched after the built-ins.
    pub fn from_config(config: &CodeflowConfig) -> Self {
        let rules = ConfiguredRules::from_disabled(config.disabled_rules().iter().copied());
        let vendors = VendorTable::with_extra(config.vendors().to_vec());
        Self::new(
            SecurityAnalyzer::new(Box::new(rules)),
            CloudAnalyzer::new(vendors),
        )
    }

    /// Vendor table consulted by the cloud detector.
    pub fn vendors(&self) -> &VendorTable {
        self.cloud.table()
    }

    /// Analyze one source text.
    ///
    /// Fails only on empty or whitespace-only input.  A parse failure is
    /// absorbed by switching to text-pattern analysis.
    pub fn run(&self, source: &str, filename: &str, language: Language) -> Result<AnalysisReport> {
        if source.trim().is_empty() {
            return Err(AnalysisError::InvalidInput);
        }

        let tree = if language.is_tree_analyzable() {
            match parse(source, language) {
                Ok(tree) => Some(tree),
                Err(err) => {
                    debug!(filename, error = %err, "parse failed");
                    None
                }
            }
        } else {
            None
        };

        let strategy = self.strategy(language, tree.as_ref());
        let mode = strategy.mode();
        debug!(filename, %language, %mode, "selected analysis strategy");
        let sections = strategy.analyze(source);
        drop(strategy);

        Ok(AnalysisReport {
            tree,
            metadata: ReportMetadata {
                filename: filename.to_string(),
                language,
                mode,
            },
            complexity: sections.complexity,
            security: sections.security,
            dependencies: sections.dependencies,
            cloud_services: sections.cloud_services,
            metrics: text_metrics(source),
        })
    }

    fn strategy<'a>(
        &'a self,
        language: Language,
        tree: Option<&'a SyntaxTree>,
    ) -> Box<dyn AnalysisStrategy + 'a> {
        match tree {
            Some(tree) => Box::new(TreeStrategy { tree, pipeline: self }),
            None if language.is_tree_analyzable() => Box::new(TextPatternStrategy),
            None => Box::new(MetricsOnlyStrategy),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FindingKind;

    fn run(source: &str, language: Language) -> AnalysisReport {
        Pipeline::with_defaults().run(source, "input", language).unwrap()
    }

    #[test]
    fn parsed_source_uses_tree_mode_and_keeps_tree() {
        let report = run("function f(a) { if (a) { return 1; } }", Language::JavaScript);
        assert_eq!(report.metadata.mode, AnalysisMode::Tree);
        assert!(report.tree.is_some());
        assert_eq!(report.complexity.cyclomatic, 2);
        assert_eq!(report.dependencies.functions[0].name, "f");
    }

    #[test]
    fn unparseable_source_falls_back_to_text_patterns() {
        let report = run("function broken(a) { if (a) {", Language::TypeScript);
        assert_eq!(report.metadata.mode, AnalysisMode::TextFallback);
        assert!(report.tree.is_none());
        assert_eq!(report.complexity.cyclomatic, 2);
        assert_eq!(report.dependencies.functions[0].name, "broken");
        assert_eq!(report.security.score, 5.0);
    }

    #[test]
    fn other_languages_get_metrics_only() {
        let report = run("def f(x):\n    return eval(x)\n", Language::Python);
        assert_eq!(report.metadata.mode, AnalysisMode::MetricsOnly);
        assert_eq!(report.complexity.cyclomatic, 1);
        assert!(report.security.findings.is_empty());
        assert_eq!(report.metrics.total_lines, 3);
    }

    #[test]
    fn blank_source_is_invalid_input() {
        let pipeline = Pipeline::with_defaults();
        for source in ["", "   \n\t "] {
            let err = pipeline.run(source, "blank.js", Language::JavaScript).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidInput));
        }
    }

    #[test]
    fn metadata_echoes_inputs() {
        let report = Pipeline::with_defaults()
            .run("let a = 1;", "src/a.js", Language::JavaScript)
            .unwrap();
        assert_eq!(report.metadata.filename, "src/a.js");
        assert_eq!(report.metadata.language, Language::JavaScript);
    }

    #[test]
    fn from_config_applies_disabled_rules_and_vendors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(crate::config::CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[security]\ndisabled = [\"eval-usage\"]\n\n[[cloud.vendors]]\npattern = \"stripe\"\nprovider = \"Stripe\"\nservice = \"Stripe SDK\"\nusage = \"Payments\"\n",
        )
        .unwrap();
        let config = CodeflowConfig::from_file(&path).unwrap();
        let pipeline = Pipeline::from_config(&config);

        let source = "import Stripe from 'stripe';\neval(code);\nel.innerHTML = html;";
        let report = pipeline.run(source, "pay.js", Language::JavaScript).unwrap();
        let kinds: Vec<_> = report.security.findings.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FindingKind::InnerHtmlUsage]);
        assert_eq!(report.cloud_services.len(), 1);
        assert_eq!(report.cloud_services[0].provider, "Stripe");
        assert_eq!(pipeline.vendors().vendors().len(), 6);
    }

    #[test]
    fn pipeline_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }
}
