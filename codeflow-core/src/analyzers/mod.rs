pub mod cloud;
pub mod complexity;
pub mod dependencies;
pub mod functions;
pub mod security;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::syntax::SyntaxTree;

/// An analyzer that derives one report section from a parsed tree.
///
/// Implementations must not mutate shared state: the same analyzer value is
/// reused across calls and threads.
pub trait TreeAnalyzer: Send + Sync {
    /// Section produced by this analyzer.  `Default` is the empty result used
    /// when the analyzer faults.
    type Output: Default;

    /// A short name identifying this analyzer in logs.
    fn name(&self) -> &'static str;

    fn analyze(&self, tree: &SyntaxTree, source: &str) -> Self::Output;
}

/// Run `analyzer`, containing a panic to this analyzer alone.
///
/// A fault is logged with `warn!` and replaced by the analyzer's empty
/// result so the remaining analyzers still contribute to the report.
pub fn run_guarded<A: TreeAnalyzer + ?Sized>(
    analyzer: &A,
    tree: &SyntaxTree,
    source: &str,
) -> A::Output {
    match panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(tree, source))) {
        Ok(output) => output,
        Err(payload) => {
            warn!(
                analyzer = analyzer.name(),
                reason = panic_message(payload.as_ref()),
                "analyzer faulted; using empty result"
            );
            A::Output::default()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
