//! Trait definitions with mockall annotations for testing
//!
//! The harness reaches the external tool chain only through these seams,
//! so the sequencer can be exercised against scripted process results.

use crate::error::TesterResult;
use shared::{ProcessResult, Stage};
use std::path::Path;

/// External process execution abstraction
///
/// Implementations run one stage's command line to completion and hand back
/// everything it printed. A non-zero exit is returned as data
/// (`ProcessResult::success == false`); only launch failures and timeouts
/// are errors.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a stage's command in `working_dir` and wait for it to finish
    ///
    /// # Returns
    /// Captured stdout/stderr and exit status, or
    /// `TesterError::LaunchFailure` / `TesterError::TimedOut`
    async fn run(&self, stage: &Stage, working_dir: &Path) -> TesterResult<ProcessResult>;
}

/// Shared runners, so concurrent scenario runs can use one instance
#[async_trait::async_trait]
impl<T> ProcessRunner for std::sync::Arc<T>
where
    T: ProcessRunner + ?Sized,
{
    async fn run(&self, stage: &Stage, working_dir: &Path) -> TesterResult<ProcessResult> {
        (**self).run(stage, working_dir).await
    }
}
