//! Sequencer state machine
//!
//! `Pending → Running(i) → {Passed, Failed(i, reason)}`. Passed and Failed
//! are terminal; there is no way back to Running from either.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FailureKind, TesterError};
use shared::Verdict;

/// Why a stage failed, in report form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub verdicts: Vec<Verdict>,
}

impl From<&TesterError> for FailureReason {
    fn from(error: &TesterError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            stderr: error.stderr().map(str::to_string),
            verdicts: error.verdicts().to_vec(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SequenceState {
    Pending,
    Running {
        index: usize,
        stage: String,
    },
    Passed,
    Failed {
        index: usize,
        stage: String,
        reason: FailureReason,
    },
}

impl SequenceState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SequenceState::Passed | SequenceState::Failed { .. })
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, SequenceState::Passed)
    }

    /// Enter Running for stage `index`; only legal from Pending or Running
    pub fn start_stage(&mut self, index: usize, stage: &str) {
        debug_assert!(!self.is_terminal(), "terminal state cannot resume");
        *self = SequenceState::Running {
            index,
            stage: stage.to_string(),
        };
    }

    pub fn fail(&mut self, index: usize, stage: &str, reason: FailureReason) {
        debug_assert!(!self.is_terminal(), "terminal state cannot fail again");
        *self = SequenceState::Failed {
            index,
            stage: stage.to_string(),
            reason,
        };
    }

    pub fn pass(&mut self) {
        debug_assert!(!self.is_terminal(), "terminal state cannot pass again");
        *self = SequenceState::Passed;
    }
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceState::Pending => f.write_str("pending"),
            SequenceState::Running { index, stage } => write!(f, "running stage {index} '{stage}'"),
            SequenceState::Passed => f.write_str("passed"),
            SequenceState::Failed { index, stage, reason } => {
                write!(f, "failed at stage {index} '{stage}' ({reason})")
            }
        }
    }
}
