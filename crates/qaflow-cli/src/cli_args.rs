use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "qaflow", about = "Local exerciser for the QA automation core", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BrowserArg {
    Chrome,
    Firefox,
    Edge,
    Chromium,
    Webkit,
}

impl From<BrowserArg> for qaflow_contract::BrowserKind {
    fn from(value: BrowserArg) -> Self {
        match value {
            BrowserArg::Chrome => Self::Chrome,
            BrowserArg::Firefox => Self::Firefox,
            BrowserArg::Edge => Self::Edge,
            BrowserArg::Chromium => Self::Chromium,
            BrowserArg::Webkit => Self::Webkit,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AnalysisView {
    Flaky,
    Perf,
    Patterns,
    Health,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a test from a script file, submit one run, and print the
    /// terminal Run once it settles.
    Run(RunArgs),
    /// Create a schedule for a test and trigger it immediately, printing
    /// the ScheduleEntry once the triggered run settles.
    Schedule(ScheduleArgs),
    /// Run a Flakiness Analyzer view over a `RunHistory` JSON array.
    Analyze(AnalyzeArgs),
    /// Run the Fix Agent against a test script, using the recorded
    /// history to decide whether it is still flaky.
    Fix(FixArgs),
    /// Print aggregate artifact store statistics for a root directory.
    ArtifactStats(ArtifactStatsArgs),
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Path to a JSON array of Step objects.
    #[arg(long)]
    pub script: PathBuf,
    #[arg(long, default_value = "cli test")]
    pub name: String,
    #[arg(long, default_value = "playwright")]
    pub framework: String,
    #[arg(long, value_enum, default_value = "chrome")]
    pub browser: BrowserArg,
    #[arg(long, default_value = "default")]
    pub environment: String,
}

#[derive(Debug, clap::Args)]
pub struct ScheduleArgs {
    #[arg(long)]
    pub script: PathBuf,
    #[arg(long, default_value = "cli scheduled test")]
    pub name: String,
    #[arg(long, default_value = "playwright")]
    pub framework: String,
    #[arg(long)]
    pub cron: String,
    #[arg(long, default_value = "UTC")]
    pub timezone: String,
}

#[derive(Debug, clap::Args)]
pub struct AnalyzeArgs {
    /// Path to a JSON array of RunHistory objects.
    #[arg(long)]
    pub history: PathBuf,
    #[arg(long, value_enum)]
    pub view: AnalysisView,
}

#[derive(Debug, clap::Args)]
pub struct FixArgs {
    #[arg(long)]
    pub script: PathBuf,
    #[arg(long, default_value = "cli flaky test")]
    pub name: String,
    #[arg(long, default_value = "playwright")]
    pub framework: String,
    /// Path to a JSON array of RunHistory objects used to confirm
    /// flakiness on each iteration.
    #[arg(long)]
    pub history: PathBuf,
    #[arg(long, default_value_t = 10)]
    pub max_iter: u32,
    #[arg(long, default_value_t = 5)]
    pub verification_runs: u32,
    #[arg(long, default_value_t = 1_000)]
    pub budget: u64,
    #[arg(long, default_value_t = 600_000)]
    pub deadline_ms: u64,
}

#[derive(Debug, clap::Args)]
pub struct ArtifactStatsArgs {
    #[arg(long)]
    pub root: PathBuf,
}
