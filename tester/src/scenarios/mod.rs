//! Test Scenarios
//!
//! The built-in scenario catalog and the runner that executes scenarios,
//! one after another or concurrently in isolated directories.

pub mod piston;
pub mod scenario;

pub use scenario::{Scenario, StagePlan};

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::config::HarnessConfig;
use crate::core::StageSequencer;
use crate::error::{TesterError, TesterResult};
use crate::runtime::RunWorkspace;
use crate::testing::{RunSummary, ScenarioReport};
use crate::traits::ProcessRunner;
use shared::RunId;
use shared::logging::{log_error, log_progress};

#[derive(Debug, Clone)]
pub struct TestScenarios {
    config: HarnessConfig,
}

impl TestScenarios {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Get list of available scenarios
    pub fn available_scenarios() -> Vec<&'static str> {
        vec![
            "piston-prep", // Preparation stages only
            "piston",      // Full pipeline with numeric checks
            "all",         // Every scenario above
        ]
    }

    /// Build a scenario by name
    pub fn build(name: &str) -> TesterResult<Scenario> {
        match name {
            "piston-prep" => piston::prep_scenario(),
            "piston" => piston::full_scenario(),
            _ => Err(TesterError::configuration(format!(
                "Unknown test scenario: '{}'. Available: {}",
                name,
                Self::available_scenarios().join(", ")
            ))),
        }
    }

    /// Resolve a scenario name, expanding "all"
    pub fn resolve(name: &str) -> TesterResult<Vec<Scenario>> {
        let scenarios = if name == "all" {
            Self::available_scenarios()
                .into_iter()
                .filter(|n| *n != "all")
                .map(Self::build)
                .collect::<TesterResult<Vec<_>>>()?
        } else {
            vec![Self::build(name)?]
        };

        for scenario in &scenarios {
            if scenario.stages().is_empty() {
                return Err(TesterError::configuration(format!(
                    "scenario '{}' has no stages",
                    scenario.name()
                )));
            }
        }

        Ok(scenarios)
    }

    /// Prepare a working directory for `scenario` and run it
    pub async fn run_scenario<P: ProcessRunner>(
        &self,
        scenario: &Scenario,
        runner: P,
    ) -> TesterResult<ScenarioReport> {
        let run_id = RunId::new();
        let workspace = if self.config.in_place {
            RunWorkspace::in_place(self.config.in_place_dir_for(scenario.case_subdir()), run_id)
        } else {
            let case_dir = self.config.case_dir_for(scenario.case_subdir());
            RunWorkspace::isolated(&self.config.scratch_root, scenario.name(), run_id, case_dir.as_deref()).await?
        };

        log_progress(
            scenario.name(),
            if workspace.is_isolated() { "Isolated run" } else { "In-place run" },
            &workspace.path().display().to_string(),
        );

        Ok(StageSequencer::new(runner).run(scenario, &workspace).await)
    }

    /// Run a scenario, turning a setup failure into a failed report
    async fn run_reported<P: ProcessRunner>(&self, scenario: &Scenario, runner: P) -> ScenarioReport {
        match self.run_scenario(scenario, runner).await {
            Ok(report) => report,
            Err(error) => {
                log_error(scenario.name(), "Working directory setup", &error);
                ScenarioReport::not_started(scenario, self.config.scratch_root.clone(), &error)
            }
        }
    }

    /// Run every scenario, concurrently when configured to
    ///
    /// Reports come back in the order the scenarios were given. A scenario
    /// that cannot be set up is reported as failed; the others still run.
    pub async fn run_all<P>(&self, scenarios: Vec<Scenario>, runner: Arc<P>) -> TesterResult<RunSummary>
    where
        P: ProcessRunner + 'static,
    {
        let started_at = Utc::now();
        let mut reports = Vec::with_capacity(scenarios.len());

        if self.config.parallel && scenarios.len() > 1 {
            tracing::info!("🔀 Running {} scenarios concurrently", scenarios.len());
            let mut tasks = JoinSet::new();
            for (position, scenario) in scenarios.into_iter().enumerate() {
                let harness = self.clone();
                let runner = Arc::clone(&runner);
                tasks.spawn(async move { (position, harness.run_reported(&scenario, runner).await) });
            }

            let mut indexed = Vec::new();
            while let Some(joined) = tasks.join_next().await {
                let (position, report) = joined.map_err(|e| TesterError::Io(std::io::Error::other(e)))?;
                indexed.push((position, report));
            }
            indexed.sort_by_key(|(position, _)| *position);
            reports.extend(indexed.into_iter().map(|(_, report)| report));
        } else {
            for scenario in &scenarios {
                reports.push(self.run_reported(scenario, Arc::clone(&runner)).await);
            }
        }

        Ok(RunSummary::new(started_at, reports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_build_known_scenarios() {
        assert_eq!(TestScenarios::build("piston").unwrap().name(), "piston");
        assert_eq!(TestScenarios::build("piston-prep").unwrap().name(), "piston-prep");
    }

    #[test]
    fn test_unknown_scenario_lists_available() {
        let error = TestScenarios::build("cylinder").unwrap_err();
        assert_matches!(error, TesterError::Configuration { ref message } if message.contains("piston-prep"));
    }

    #[test]
    fn test_all_expands_to_every_scenario() {
        let names: Vec<String> = TestScenarios::resolve("all")
            .unwrap()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["piston-prep", "piston"]);
    }
}
