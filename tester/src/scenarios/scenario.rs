//! Scenario definitions
//!
//! A scenario is an ordered list of stages, each optionally followed by
//! checks over what that stage produced.

use std::path::{Path, PathBuf};

use crate::error::TesterResult;
use crate::testing::Check;
use shared::Stage;

/// One stage together with the checks run after it succeeds
#[derive(Debug, Clone, PartialEq)]
pub struct StagePlan {
    stage: Stage,
    checks: Vec<Check>,
}

impl StagePlan {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            checks: Vec::new(),
        }
    }

    /// Attach a check (fluent API)
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    name: String,
    description: String,
    /// Case directory relative to the configured case root
    case_subdir: PathBuf,
    stages: Vec<StagePlan>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            case_subdir: PathBuf::new(),
            stages: Vec::new(),
        }
    }

    pub fn with_case_subdir(mut self, subdir: impl Into<PathBuf>) -> Self {
        self.case_subdir = subdir.into();
        self
    }

    pub fn with_stage(mut self, plan: StagePlan) -> Self {
        self.stages.push(plan);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn case_subdir(&self) -> &Path {
        &self.case_subdir
    }

    pub fn stages(&self) -> &[StagePlan] {
        &self.stages
    }

    /// Number of checks across all stages
    pub fn check_count(&self) -> usize {
        self.stages.iter().map(|plan| plan.checks.len()).sum()
    }

    /// Validate every check, returning the index of the first offending stage
    pub fn validate(&self) -> Result<(), (usize, crate::error::TesterError)> {
        for (index, plan) in self.stages.iter().enumerate() {
            for check in &plan.checks {
                check.validate().map_err(|e| (index, e))?;
            }
        }
        Ok(())
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|plan| plan.stage.name()).collect()
    }
}

/// Convenience for building a stage plan from a command line
pub fn stage(name: &str, command_line: &str) -> TesterResult<StagePlan> {
    Ok(StagePlan::new(Stage::from_command_line(name, command_line)?))
}
