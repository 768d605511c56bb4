//! Stage sequencer
//!
//! Runs a scenario's stages strictly in order inside one working directory.
//! The first failing stage ends the run: later stages are never launched and
//! nothing is retried. Files the stages wrote stay where they are.

use chrono::Utc;
use std::time::Instant;

use crate::core::{FailureReason, SequenceState};
use crate::error::{TesterError, TesterResult};
use crate::runtime::RunWorkspace;
use crate::scenarios::{Scenario, StagePlan};
use crate::testing::{ScenarioReport, StageReport, StageStatus};
use crate::traits::ProcessRunner;
use shared::logging::{log_error, log_startup, log_success};
use shared::{stage_debug, stage_error, stage_info, stage_warn, ProcessResult, Verdict};

/// Lines of stderr kept in a non-zero exit failure
pub const STDERR_TAIL_LINES: usize = 40;

pub struct StageSequencer<P: ProcessRunner> {
    runner: P,
}

impl<P: ProcessRunner> StageSequencer<P> {
    pub fn new(runner: P) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &P {
        &self.runner
    }

    /// Run every stage of `scenario` in `workspace`
    ///
    /// Never returns an error: every failure ends up in the report's outcome.
    pub async fn run(&self, scenario: &Scenario, workspace: &RunWorkspace) -> ScenarioReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut state = SequenceState::Pending;
        let mut stages = Vec::with_capacity(scenario.stages().len());

        log_startup(
            scenario.name(),
            &format!(
                "{} stage(s) in {} (run {})",
                scenario.stages().len(),
                workspace.path().display(),
                workspace.run_id().short()
            ),
        );

        if let Err((bad_index, error)) = scenario.validate() {
            log_error(scenario.name(), "Scenario validation", &error);
            let reason = FailureReason::from(&error);
            for (index, plan) in scenario.stages().iter().enumerate() {
                let mut report = StageReport::skipped(index, plan.stage().name(), plan.stage().command_line());
                if index == bad_index {
                    report.status = StageStatus::Failed;
                    report.failure = Some(reason.clone());
                }
                stages.push(report);
            }
            let bad_name = scenario.stages()[bad_index].stage().name().to_string();
            state.fail(bad_index, &bad_name, reason);

            return self.finish(scenario, workspace, started_at, clock, stages, state);
        }

        for (index, plan) in scenario.stages().iter().enumerate() {
            let stage = plan.stage();
            state.start_stage(index, stage.name());
            stage_info!(stage.name(), "▶️  Stage {} of {}", index + 1, scenario.stages().len());

            let stage_clock = Instant::now();
            let outcome = self.run_stage(plan, workspace).await;
            let elapsed_ms = stage_clock.elapsed().as_millis() as u64;

            match outcome {
                Ok((result, verdicts)) => {
                    stage_debug!(stage.name(), "stage finished in {} ms", elapsed_ms);
                    stages.push(StageReport {
                        index,
                        name: stage.name().to_string(),
                        command: stage.command_line(),
                        status: StageStatus::Passed,
                        exit_code: result.exit_code,
                        elapsed_ms,
                        verdicts,
                        failure: None,
                    });
                }
                Err((exit_code, error)) => {
                    stage_error!(stage.name(), "💥 {}", error);
                    let reason = FailureReason::from(&error);
                    stages.push(StageReport {
                        index,
                        name: stage.name().to_string(),
                        command: stage.command_line(),
                        status: StageStatus::Failed,
                        exit_code,
                        elapsed_ms,
                        verdicts: Vec::new(),
                        failure: Some(reason.clone()),
                    });
                    state.fail(index, stage.name(), reason);

                    for (later, rest) in scenario.stages().iter().enumerate().skip(index + 1) {
                        stages.push(StageReport::skipped(later, rest.stage().name(), rest.stage().command_line()));
                    }
                    break;
                }
            }
        }

        if !state.is_terminal() {
            state.pass();
        }

        self.finish(scenario, workspace, started_at, clock, stages, state)
    }

    /// Launch one stage and evaluate its checks
    ///
    /// On failure the exit code (when the process ran at all) travels with the error.
    async fn run_stage(
        &self,
        plan: &StagePlan,
        workspace: &RunWorkspace,
    ) -> Result<(ProcessResult, Vec<Verdict>), (Option<i32>, TesterError)> {
        let stage = plan.stage();
        let result = self
            .runner
            .run(stage, workspace.path())
            .await
            .map_err(|e| (None, e))?;

        if !result.success {
            if stage.requires_success() {
                return Err((
                    result.exit_code,
                    TesterError::NonZeroExit {
                        stage: stage.name().to_string(),
                        exit_code: result.exit_code,
                        stderr: result.stderr_tail(STDERR_TAIL_LINES),
                    },
                ));
            }
            stage_warn!(
                stage.name(),
                "⚠️  exited with {:?}; continuing because failure is allowed",
                result.exit_code
            );
        }

        let verdicts = self
            .evaluate_checks(plan, &result, workspace)
            .await
            .map_err(|e| (result.exit_code, e))?;

        Ok((result, verdicts))
    }

    async fn evaluate_checks(
        &self,
        plan: &StagePlan,
        result: &ProcessResult,
        workspace: &RunWorkspace,
    ) -> TesterResult<Vec<Verdict>> {
        let mut verdicts = Vec::new();
        for check in plan.checks() {
            stage_debug!(plan.stage().name(), "🔍 check '{}' on {}", check.description(), check.source());
            let check_verdicts = check.evaluate(result, workspace.path()).await?;
            for verdict in &check_verdicts {
                stage_info!(plan.stage().name(), "{}", verdict);
            }
            verdicts.extend(check_verdicts);
        }
        Ok(verdicts)
    }

    fn finish(
        &self,
        scenario: &Scenario,
        workspace: &RunWorkspace,
        started_at: chrono::DateTime<Utc>,
        clock: Instant,
        stages: Vec<StageReport>,
        outcome: SequenceState,
    ) -> ScenarioReport {
        let report = ScenarioReport {
            scenario: scenario.name().to_string(),
            run_id: workspace.run_id(),
            working_dir: workspace.path().to_path_buf(),
            started_at,
            elapsed_ms: clock.elapsed().as_millis() as u64,
            stages,
            outcome,
        };

        if report.passed() {
            log_success(scenario.name(), &format!("all {} stage(s) passed", scenario.stages().len()));
        } else {
            log_error(scenario.name(), "Scenario", &report.outcome);
        }

        report
    }
}
