//! Harness error taxonomy

use serde::{Deserialize, Serialize};
use shared::{SharedError, Verdict};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a line or token could not be turned into a number
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseFailure {
    #[error("no line matched {selector}")]
    NoMatch { selector: String },

    #[error("field '{field}': {wanted} missing from line '{line}'")]
    MissingToken { field: String, wanted: String, line: String },

    #[error("field '{field}': malformed token '{token}' in line '{line}'")]
    MalformedToken { field: String, token: String, line: String },
}

#[derive(Error, Debug)]
pub enum TesterError {
    #[error("Stage '{stage}' could not launch '{program}': {source}")]
    LaunchFailure {
        stage: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stage '{stage}' exited with {}", describe_exit(.exit_code))]
    NonZeroExit {
        stage: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Stage '{stage}' timed out after {timeout:?}")]
    TimedOut { stage: String, timeout: Duration },

    #[error("Parse failure: {0}")]
    Parse(#[from] ParseFailure),

    #[error("{} of {} checks out of tolerance", failed_count(.verdicts), .verdicts.len())]
    ToleranceViolation { verdicts: Vec<Verdict> },

    #[error("Harness configuration error: {message}")]
    Configuration { message: String },

    #[error("Results file {path} could not be read: {source}")]
    ResultsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Working directory {path} could not be prepared: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report could not be written: {message}")]
    Report { message: String },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TesterResult<T> = Result<T, TesterError>;

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

fn failed_count(verdicts: &[Verdict]) -> usize {
    verdicts.iter().filter(|v| !v.passed).count()
}

/// Classification of a failure as it appears in reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    LaunchFailure,
    NonZeroExit,
    TimedOut,
    ParseFailure,
    ToleranceViolation,
    Configuration,
}

impl FailureKind {
    /// Parse and configuration failures point at the harness, not the solver
    pub fn is_harness_defect(&self) -> bool {
        matches!(self, FailureKind::ParseFailure | FailureKind::Configuration)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::LaunchFailure => "launch failure",
            FailureKind::NonZeroExit => "non-zero exit",
            FailureKind::TimedOut => "timed out",
            FailureKind::ParseFailure => "parse failure",
            FailureKind::ToleranceViolation => "tolerance violation",
            FailureKind::Configuration => "configuration error",
        };
        f.write_str(name)
    }
}

impl TesterError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TesterError::LaunchFailure { .. } => FailureKind::LaunchFailure,
            TesterError::NonZeroExit { .. } => FailureKind::NonZeroExit,
            TesterError::TimedOut { .. } => FailureKind::TimedOut,
            TesterError::Parse(_) | TesterError::ResultsFile { .. } => FailureKind::ParseFailure,
            TesterError::ToleranceViolation { .. } => FailureKind::ToleranceViolation,
            TesterError::Configuration { .. }
            | TesterError::Workspace { .. }
            | TesterError::Report { .. }
            | TesterError::Shared(_)
            | TesterError::Io(_) => FailureKind::Configuration,
        }
    }

    /// Captured stderr, when the failure carries it
    pub fn stderr(&self) -> Option<&str> {
        match self {
            TesterError::NonZeroExit { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Verdicts, when the failure is a tolerance violation
    pub fn verdicts(&self) -> &[Verdict] {
        match self {
            TesterError::ToleranceViolation { verdicts } => verdicts,
            _ => &[],
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        TesterError::Configuration {
            message: message.into(),
        }
    }
}
