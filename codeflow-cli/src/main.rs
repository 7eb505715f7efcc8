#![deny(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "codeflow",
    about = "Static analysis for JavaScript and TypeScript: complexity, security, dependencies and cloud usage",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// File or directory to analyze (shorthand for `codeflow analyze <path>`).
    path: Option<PathBuf>,

    #[command(flatten)]
    analyze: AnalyzeOptions,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a file or directory (same as the bare-path form).
    Analyze(AnalyzeArgs),

    /// Compare two versions of a file and rate the risk of the change.
    Compare(CompareArgs),

    /// Build the cross-file dependency map of a directory.
    Project(ProjectArgs),

    /// List the security rules and cloud vendor table.
    Rules(RulesArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// File or directory to analyze.
    path: PathBuf,

    #[command(flatten)]
    options: AnalyzeOptions,
}

#[derive(Args)]
struct AnalyzeOptions {
    /// Output format: pretty, text, or json.
    #[arg(long, default_value = "pretty")]
    format: String,

    /// Force a language instead of detecting it from the extension.
    #[arg(long)]
    language: Option<String>,

    /// Explicit `.codeflow` config file (default: discovered upward).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exit 1 if any file's security score is below this value.
    #[arg(long)]
    fail_under: Option<f64>,
}

#[derive(Args)]
struct CompareArgs {
    /// The earlier version.
    before: PathBuf,

    /// The later version.
    after: PathBuf,

    /// Output format: text or json.
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Args)]
struct ProjectArgs {
    /// Project root directory.
    path: PathBuf,

    /// Output format: text or json.
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Args)]
struct RulesArgs {
    /// Output format: table or toml.
    #[arg(long, default_value = "table")]
    format: String,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Analyze(a)) => run_analyze(&a.path, a.options),

        Some(Command::Compare(a)) => commands::compare::run(&a.before, &a.after, &a.format),

        Some(Command::Project(a)) => commands::project::run(&a.path, &a.format),

        Some(Command::Rules(a)) => commands::rules::run(&a.format),

        None => match cli.path {
            Some(path) => run_analyze(&path, cli.analyze),
            None => {
                let cwd = std::env::current_dir()?;
                run_analyze(&cwd, cli.analyze)
            }
        },
    }
}

fn run_analyze(path: &std::path::Path, opts: AnalyzeOptions) -> Result<()> {
    commands::analyze::run(
        path,
        &opts.format,
        opts.language.as_deref(),
        opts.config.as_deref(),
        opts.fail_under,
    )
}
