//! Test helper functions and utilities
//!
//! Builds a directory of shell scripts standing in for the real tools, and
//! a case directory holding the inputs they read.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use sim_tester::{HarnessConfig, HarnessConfigBuilder};

use super::TestFixtures;

/// Scripted stand-ins for prep-gas, l1d4-prep and l1d4
pub struct FakeToolchain {
    root: TempDir,
    solver_exit: i32,
    history: &'static str,
    solver_sleep_secs: u32,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
            solver_exit: 0,
            history: TestFixtures::GOOD_HISTORY,
            solver_sleep_secs: 0,
        }
    }

    /// Make the solver stage exit with `code`
    pub fn with_solver_exit(mut self, code: i32) -> Self {
        self.solver_exit = code;
        self
    }

    /// History file contents the post-processor writes
    pub fn with_history(mut self, history: &'static str) -> Self {
        self.history = history;
        self
    }

    /// Make the solver hang for `secs` before printing anything
    pub fn with_solver_sleep(mut self, secs: u32) -> Self {
        self.solver_sleep_secs = secs;
        self
    }

    /// Write the scripts and the case directory, returning the layout
    pub fn install(self) -> InstalledToolchain {
        let tool_dir = self.root.path().join("bin");
        let case_root = self.root.path().join("cases");
        let case_dir = case_root.join("l1d").join("piston");
        let scratch_root = self.root.path().join("scratch");
        fs::create_dir_all(&tool_dir).unwrap();
        fs::create_dir_all(&case_dir).unwrap();

        fs::write(case_dir.join("ideal-air.inp"), TestFixtures::GAS_INPUT).unwrap();
        fs::write(case_dir.join("piston.py"), "config.title = 'piston'\n").unwrap();

        write_script(
            &tool_dir.join("prep-gas"),
            "[ -f \"$1\" ] || { echo \"cannot open $1\" >&2; exit 1; }\necho 'model' > \"$2\"",
        );
        write_script(
            &tool_dir.join("l1d4-prep"),
            "[ -f ideal-air-gas-model.lua ] || { echo 'gas model missing' >&2; exit 1; }\ntouch piston.config",
        );
        write_script(
            &tool_dir.join("l1d4"),
            &format!(
                "case \"$1\" in\n\
                 --run-simulation)\n\
                 [ -f piston.config ] || {{ echo 'not prepared' >&2; exit 1; }}\n\
                 sleep {sleep}\n\
                 cat <<'OUT'\n{stdout}\nOUT\n\
                 exit {exit}\n\
                 ;;\n\
                 --piston-history)\n\
                 cat > {history_file} <<'OUT'\n{history}\nOUT\n\
                 ;;\n\
                 *) echo \"unknown option $1\" >&2; exit 2 ;;\n\
                 esac",
                sleep = self.solver_sleep_secs,
                stdout = TestFixtures::SOLVER_STDOUT,
                exit = self.solver_exit,
                history_file = TestFixtures::HISTORY_FILE,
                history = self.history,
            ),
        );

        InstalledToolchain {
            _root: self.root,
            tool_dir,
            case_root,
            case_dir,
            scratch_root,
        }
    }
}

pub struct InstalledToolchain {
    _root: TempDir,
    pub tool_dir: PathBuf,
    pub case_root: PathBuf,
    pub case_dir: PathBuf,
    pub scratch_root: PathBuf,
}

impl InstalledToolchain {
    /// Harness configuration pointing at this tool chain
    pub fn config(&self) -> HarnessConfigBuilder {
        HarnessConfig::builder()
            .case_root(&self.case_root)
            .scratch_root(&self.scratch_root)
            .tool_dir(&self.tool_dir)
            .stage_timeout(Some(Duration::from_secs(30)))
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

pub struct TestHelpers;

impl TestHelpers {
    /// Directories created under the scratch root
    pub fn run_dirs(scratch_root: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(scratch_root)
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default();
        dirs.sort();
        dirs
    }
}
