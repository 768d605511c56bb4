//! Harness Configuration Builder
//!
//! Provides a flexible builder pattern for constructing harness configurations

use super::HarnessConfig;
use std::path::PathBuf;
use std::time::Duration;

pub struct HarnessConfigBuilder {
    config: HarnessConfig,
}

impl HarnessConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: HarnessConfig::default(),
        }
    }

    /// Set the root holding scenario case directories
    pub fn case_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.config.case_root = Some(root.into());
        self
    }

    /// Set the parent directory for isolated run directories
    pub fn scratch_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.config.scratch_root = root.into();
        self
    }

    /// Run in the case directory itself
    pub fn in_place(mut self, in_place: bool) -> Self {
        self.config.in_place = in_place;
        self
    }

    /// Set the directory searched first for tools
    pub fn tool_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.tool_dir = Some(dir.into());
        self
    }

    /// Set the default stage timeout (None disables it)
    pub fn stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.stage_timeout = timeout;
        self
    }

    /// Set the JSON report path
    pub fn report<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.report_path = Some(path.into());
        self
    }

    /// Run scenarios concurrently
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set log level (trace, debug, info, warn, error)
    pub fn log_level<S: Into<String>>(mut self, level: S) -> Self {
        self.config.log_level = level.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> HarnessConfig {
        self.config
    }
}

impl Default for HarnessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let config = HarnessConfigBuilder::new()
            .case_root("/opt/solver/examples")
            .scratch_root("/tmp/runs")
            .stage_timeout(Some(Duration::from_secs(600)))
            .report("report.json")
            .parallel(true)
            .log_level("debug")
            .build();

        assert_eq!(config.case_root, Some(PathBuf::from("/opt/solver/examples")));
        assert_eq!(config.scratch_root, PathBuf::from("/tmp/runs"));
        assert_eq!(config.stage_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.report_path, Some(PathBuf::from("report.json")));
        assert!(config.parallel);
        assert!(!config.in_place);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_case_dir_resolution() {
        let config = HarnessConfigBuilder::new().case_root("/opt/examples").build();
        let subdir = std::path::Path::new("l1d/piston");

        assert_eq!(config.case_dir_for(subdir), Some(PathBuf::from("/opt/examples/l1d/piston")));
        assert_eq!(config.in_place_dir_for(subdir), PathBuf::from("/opt/examples/l1d/piston"));

        let bare = HarnessConfig::default();
        assert_eq!(bare.case_dir_for(subdir), None);
        assert_eq!(bare.in_place_dir_for(subdir), PathBuf::from("."));
    }

    #[test]
    fn test_validate_rejects_bad_combinations() {
        assert!(HarnessConfig::default().validate().is_ok());

        let zero_timeout = HarnessConfigBuilder::new().stage_timeout(Some(Duration::ZERO)).build();
        assert!(zero_timeout.validate().is_err());

        let shared_dir = HarnessConfigBuilder::new().in_place(true).parallel(true).build();
        assert!(shared_dir.validate().is_err());

        let missing_tools = HarnessConfigBuilder::new().tool_dir("/definitely/not/here").build();
        assert!(missing_tools.validate().is_err());
    }
}
