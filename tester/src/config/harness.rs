//! Harness Configuration
//!
//! Everything a run needs is passed in explicitly here; scenarios read no
//! global state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::runtime::TokioProcessRunner;
use shared::{SharedError, SharedResult};

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Root holding each scenario's case directory (e.g. the solver's examples tree)
    pub case_root: Option<PathBuf>,
    /// Parent of the per-run isolated working directories
    pub scratch_root: PathBuf,
    /// Run directly in the case directory instead of an isolated copy
    pub in_place: bool,
    /// Directory searched first for the external tools
    pub tool_dir: Option<PathBuf>,
    /// Timeout for stages that do not set their own
    pub stage_timeout: Option<Duration>,
    /// Where to write the JSON report
    pub report_path: Option<PathBuf>,
    /// Run independent scenarios concurrently
    pub parallel: bool,
    pub log_level: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            case_root: None,
            scratch_root: std::env::temp_dir().join("sim-tester"),
            in_place: false,
            tool_dir: None,
            stage_timeout: None,
            report_path: None,
            parallel: false,
            log_level: "info".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Create a new builder
    pub fn builder() -> crate::config::builder::HarnessConfigBuilder {
        crate::config::builder::HarnessConfigBuilder::new()
    }

    /// Case directory for a scenario, if a case root is configured
    pub fn case_dir_for(&self, case_subdir: &Path) -> Option<PathBuf> {
        self.case_root.as_ref().map(|root| root.join(case_subdir))
    }

    /// Directory an in-place run executes in
    pub fn in_place_dir_for(&self, case_subdir: &Path) -> PathBuf {
        self.case_dir_for(case_subdir).unwrap_or_else(|| PathBuf::from("."))
    }

    /// Process runner configured from this harness configuration
    pub fn runner(&self) -> TokioProcessRunner {
        TokioProcessRunner::new()
            .with_tool_dir(self.tool_dir.clone())
            .with_default_timeout(self.stage_timeout)
    }

    /// Check this configuration is usable
    pub fn validate(&self) -> SharedResult<()> {
        if self.stage_timeout == Some(Duration::ZERO) {
            return Err(SharedError::InvalidConfig {
                field: "stage_timeout".to_string(),
                value: "0s".to_string(),
            });
        }

        if self.in_place && self.parallel {
            // Concurrent runs in one directory would trample each other's files
            return Err(SharedError::InvalidConfig {
                field: "parallel".to_string(),
                value: "true (with in_place)".to_string(),
            });
        }

        if let Some(tool_dir) = &self.tool_dir
            && !tool_dir.is_dir()
        {
            return Err(SharedError::InvalidConfig {
                field: "tool_dir".to_string(),
                value: tool_dir.display().to_string(),
            });
        }

        Ok(())
    }
}
