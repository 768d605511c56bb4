//! Simulation Regression Runner
//!
//! Command-line front end for the harness:
//! - Resolves the requested scenario(s) from the built-in catalog
//! - Runs each in its own working directory, or in place
//! - Logs a verdict summary and optionally writes a JSON report
//! - Exits 0 when everything passed, 1 on any failure, 2 on setup errors

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use sim_tester::{HarnessConfig, TestScenarios};

#[derive(Parser)]
#[command(name = "sim-tester")]
#[command(about = "Regression harness for the 1-D gas-dynamics solver pipeline")]
struct Args {
    /// Test scenario to run ("all" runs every scenario)
    #[arg(long, default_value = "piston")]
    scenario: String,

    /// List available scenarios and exit
    #[arg(long)]
    list: bool,

    /// Root directory holding the scenarios' case directories
    #[arg(long)]
    case_dir: Option<PathBuf>,

    /// Parent directory for isolated run directories
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Run in the case directory itself instead of an isolated copy
    #[arg(long)]
    in_place: bool,

    /// Directory searched first for the external tools
    #[arg(long)]
    tool_dir: Option<PathBuf>,

    /// Per-stage timeout in seconds (0 disables it)
    #[arg(long, default_value = "0")]
    timeout_secs: u64,

    /// Write a JSON report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Run independent scenarios concurrently
    #[arg(long)]
    parallel: bool,

    /// Enable verbose tracing output
    #[arg(long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn to_config(&self) -> HarnessConfig {
        let mut builder = HarnessConfig::builder()
            .in_place(self.in_place)
            .parallel(self.parallel)
            .stage_timeout((self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)))
            .log_level(if self.verbose { "debug" } else { self.log_level.as_str() });

        if let Some(ref case_dir) = self.case_dir {
            builder = builder.case_root(case_dir);
        }
        if let Some(ref scratch_dir) = self.scratch_dir {
            builder = builder.scratch_root(scratch_dir);
        }
        if let Some(ref tool_dir) = self.tool_dir {
            builder = builder.tool_dir(tool_dir);
        }
        if let Some(ref report) = self.report {
            builder = builder.report(report);
        }

        builder.build()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if args.list {
        for name in TestScenarios::available_scenarios() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    let config = args.to_config();
    shared::logging::init_tracing_with_level(Some(&config.log_level));

    tracing::info!("🧪 Starting simulation regression harness");
    tracing::info!("Scenario: {}, Parallel: {}", args.scenario, config.parallel);

    match run(&args.scenario, config).await {
        Ok(true) => {
            tracing::info!("🏁 All scenarios passed");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            tracing::error!("❌ One or more scenarios failed");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!("💥 Harness setup failed: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Run the requested scenarios; Ok(passed) unless the harness itself could not run
async fn run(scenario: &str, config: HarnessConfig) -> anyhow::Result<bool> {
    config.validate().context("invalid harness configuration")?;

    let scenarios = TestScenarios::resolve(scenario).context("could not resolve scenario")?;
    let runner = Arc::new(config.runner());
    let harness = TestScenarios::new(config.clone());

    let summary = harness
        .run_all(scenarios, runner)
        .await
        .context("could not prepare scenario run")?;

    summary.log_summary();

    if let Some(ref path) = config.report_path {
        summary
            .write_json(path)
            .await
            .with_context(|| format!("could not write report to {}", path.display()))?;
    }

    Ok(summary.passed())
}
