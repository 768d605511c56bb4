//! Run reports
//!
//! Per-stage and per-scenario results, serializable to JSON and printable
//! as a short human summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::{FailureReason, SequenceState};
use crate::error::{TesterError, TesterResult};
use crate::scenarios::Scenario;
use shared::{RunId, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Passed,
    Failed,
    /// Never started because an earlier stage failed
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub index: usize,
    pub name: String,
    pub command: String,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub verdicts: Vec<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
}

impl StageReport {
    pub fn skipped(index: usize, name: &str, command: String) -> Self {
        Self {
            index,
            name: name.to_string(),
            command,
            status: StageStatus::Skipped,
            exit_code: None,
            elapsed_ms: 0,
            verdicts: Vec::new(),
            failure: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub run_id: RunId,
    pub working_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub stages: Vec<StageReport>,
    pub outcome: SequenceState,
}

impl ScenarioReport {
    /// Report for a scenario whose working directory could not be prepared
    ///
    /// No stage ran; the first one carries the failure and the rest are skipped.
    pub fn not_started(scenario: &Scenario, working_dir: PathBuf, error: &TesterError) -> Self {
        let reason = FailureReason::from(error);
        let stages: Vec<StageReport> = scenario
            .stages()
            .iter()
            .enumerate()
            .map(|(index, plan)| {
                let mut report = StageReport::skipped(index, plan.stage().name(), plan.stage().command_line());
                if index == 0 {
                    report.status = StageStatus::Failed;
                    report.failure = Some(reason.clone());
                }
                report
            })
            .collect();
        let first_stage = stages.first().map(|s| s.name.clone()).unwrap_or_default();

        Self {
            scenario: scenario.name().to_string(),
            run_id: RunId::new(),
            working_dir,
            started_at: Utc::now(),
            elapsed_ms: 0,
            stages,
            outcome: SequenceState::Failed {
                index: 0,
                stage: first_stage,
                reason,
            },
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.is_passed()
    }

    /// All verdicts in stage order, including those of a failed check
    pub fn verdicts(&self) -> Vec<&Verdict> {
        self.stages
            .iter()
            .flat_map(|stage| {
                stage
                    .verdicts
                    .iter()
                    .chain(stage.failure.iter().flat_map(|f| f.verdicts.iter()))
            })
            .collect()
    }

    /// Names of stages that actually ran
    pub fn executed_stages(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|stage| stage.status != StageStatus::Skipped)
            .map(|stage| stage.name.as_str())
            .collect()
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.outcome {
            SequenceState::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Log a one-block summary of this scenario
    pub fn log_summary(&self) {
        for stage in &self.stages {
            let mark = match stage.status {
                StageStatus::Passed => "✅",
                StageStatus::Failed => "❌",
                StageStatus::Skipped => "⏭️",
            };
            tracing::info!("  {} [{}] {} ({} ms)", mark, stage.index, stage.name, stage.elapsed_ms);
            for verdict in stage
                .verdicts
                .iter()
                .chain(stage.failure.iter().flat_map(|f| f.verdicts.iter()))
            {
                tracing::info!("      {}", verdict);
            }
            if let Some(ref failure) = stage.failure {
                tracing::error!("      {}", failure);
                if let Some(stderr) = &failure.stderr
                    && !stderr.trim().is_empty()
                {
                    tracing::error!("      stderr:\n{}", stderr);
                }
            }
        }

        if self.passed() {
            tracing::info!("🏆 Scenario '{}' PASSED ({} ms)", self.scenario, self.elapsed_ms);
        } else {
            tracing::error!(
                "💥 Scenario '{}' FAILED: {} (artifacts kept in {})",
                self.scenario,
                self.outcome,
                self.working_dir.display()
            );
        }
    }
}

/// Reports for every scenario in one harness invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Utc>, scenarios: Vec<ScenarioReport>) -> Self {
        Self { started_at, scenarios }
    }

    pub fn passed(&self) -> bool {
        !self.scenarios.is_empty() && self.scenarios.iter().all(ScenarioReport::passed)
    }

    pub fn failed_count(&self) -> usize {
        self.scenarios.iter().filter(|s| !s.passed()).count()
    }

    /// Write the summary as pretty JSON, creating parent directories
    pub async fn write_json(&self, path: &Path) -> TesterResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| TesterError::Report {
            message: e.to_string(),
        })?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, json).await?;

        tracing::info!("📝 Report written to {}", path.display());
        Ok(())
    }

    pub fn log_summary(&self) {
        for scenario in &self.scenarios {
            scenario.log_summary();
        }
        tracing::info!(
            "📊 {} scenario(s), {} passed, {} failed",
            self.scenarios.len(),
            self.scenarios.len() - self.failed_count(),
            self.failed_count()
        );
    }
}
