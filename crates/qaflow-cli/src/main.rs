mod bootstrap_helpers;
mod cli_args;
mod history_source;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use qaflow_agent::{AgentConfig, FixAgent, WaitInjectionProposer};
use qaflow_contract::{RunHistory, Step};
use qaflow_core::CancellationToken;
use qaflow_driver::{BrowserDriver, NullDriver};
use qaflow_orchestrator::{Orchestrator, QaConfig, RunOptions};
use qaflow_scheduler::{ScheduleRegistry, SchedulerConfig, SchedulerRuntime};

use cli_args::{AnalysisView, ArtifactStatsArgs, AnalyzeArgs, Cli, Command, FixArgs, RunArgs, ScheduleArgs};
use history_source::StaticHistorySource;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap_helpers::init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_command(args).await,
        Command::Schedule(args) => schedule_command(args).await,
        Command::Analyze(args) => analyze_command(args),
        Command::Fix(args) => fix_command(args).await,
        Command::ArtifactStats(args) => artifact_stats_command(args),
    }
}

fn load_script(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading script file {}", path.display()))?;
    let script: Vec<Step> = serde_json::from_str(&text).context("parsing script JSON as an array of steps")?;
    Ok(script)
}

fn load_history(path: &Path) -> Result<Vec<RunHistory>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading history file {}", path.display()))?;
    let history: Vec<RunHistory> = serde_json::from_str(&text).context("parsing history JSON as an array of RunHistory rows")?;
    Ok(history)
}

fn new_orchestrator() -> Orchestrator {
    let driver: Arc<dyn BrowserDriver> = Arc::new(NullDriver);
    Orchestrator::new(QaConfig::default(), driver, None)
}

async fn await_terminal(orchestrator: &Orchestrator, run_id: &str) -> Result<qaflow_contract::Run> {
    loop {
        let run = orchestrator.get(run_id)?;
        if run.status.is_terminal() {
            return Ok(run);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn run_command(args: RunArgs) -> Result<()> {
    let script = load_script(&args.script)?;
    let orchestrator = new_orchestrator();
    let test_id = orchestrator.create_test(&args.name, &args.framework, script, 0, serde_json::Value::Null)?;
    let run_id = orchestrator.submit(
        &test_id,
        RunOptions {
            browser: args.browser.into(),
            environment: args.environment,
            ..RunOptions::default()
        },
    )?;
    let run = await_terminal(&orchestrator, &run_id).await?;
    println!("{}", serde_json::to_string_pretty(&run)?);
    Ok(())
}

async fn schedule_command(args: ScheduleArgs) -> Result<()> {
    let script = load_script(&args.script)?;
    let orchestrator = new_orchestrator();
    let test_id = orchestrator.create_test(&args.name, &args.framework, script, 0, serde_json::Value::Null)?;

    let registry = Arc::new(ScheduleRegistry::new());
    let schedule_id = registry.create(&test_id, &args.cron, &args.timezone)?;
    let runtime = SchedulerRuntime::new(orchestrator, registry.clone(), SchedulerConfig::default());

    let run_id = runtime.trigger_now(&schedule_id)?;
    loop {
        let entry = registry.get(&schedule_id).expect("schedule exists");
        if !entry.running {
            break;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    println!("run_id: {run_id}");
    println!("{}", serde_json::to_string_pretty(&registry.get(&schedule_id).expect("schedule exists"))?);
    Ok(())
}

fn analyze_command(args: AnalyzeArgs) -> Result<()> {
    let history = load_history(&args.history)?;
    match args.view {
        AnalysisView::Flaky => println!("{:#?}", qaflow_flaky::flaky(&history)),
        AnalysisView::Perf => println!("{:#?}", qaflow_flaky::perf(&history)),
        AnalysisView::Patterns => println!("{:#?}", qaflow_flaky::patterns(&history)),
        AnalysisView::Health => println!("{:#?}", qaflow_flaky::suite_health(&history)),
    }
    Ok(())
}

async fn fix_command(args: FixArgs) -> Result<()> {
    let script = load_script(&args.script)?;
    let history = load_history(&args.history)?;
    let orchestrator = new_orchestrator();
    let test_id = orchestrator.create_test(&args.name, &args.framework, script, 0, serde_json::Value::Null)?;

    let config = AgentConfig {
        max_iter: args.max_iter,
        verification_runs: args.verification_runs,
        budget: args.budget,
        deadline_ms: args.deadline_ms,
    };
    let agent = FixAgent::new(
        orchestrator,
        Box::new(StaticHistorySource::new(history)),
        Box::new(WaitInjectionProposer::default()),
        config,
    );
    let execution = agent.run(&test_id, &args.name, CancellationToken::new()).await;
    println!("{}", serde_json::to_string_pretty(&execution)?);
    Ok(())
}

fn artifact_stats_command(args: ArtifactStatsArgs) -> Result<()> {
    let store = qaflow_artifacts::ArtifactStore::new(qaflow_artifacts::ArtifactStoreConfig {
        root: args.root,
        ..qaflow_artifacts::ArtifactStoreConfig::default()
    });
    let stats = store.stats();
    println!("{stats:#?}");
    Ok(())
}
