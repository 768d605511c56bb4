//! Core shared types and identifiers

use crate::errors::{SharedError, SharedResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for one test run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Short form used in directory names
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One external-process invocation in a scenario's pipeline
#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    name: String,
    program: String,
    args: Vec<String>,
    require_success: bool,
    timeout: Option<Duration>,
}

impl Stage {
    /// Build a stage from a command line split on whitespace
    pub fn from_command_line(name: impl Into<String>, command_line: &str) -> SharedResult<Self> {
        Self::from_tokens(name, command_line.split_whitespace())
    }

    /// Build a stage from explicit command tokens (program first)
    pub fn from_tokens<I, S>(name: impl Into<String>, tokens: I) -> SharedResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let mut tokens = tokens.into_iter().map(Into::into);

        let program = match tokens.next() {
            Some(program) if !program.trim().is_empty() => program,
            _ => return Err(SharedError::EmptyCommand { stage: name }),
        };

        Ok(Self {
            name,
            program,
            args: tokens.collect(),
            require_success: true,
            timeout: None,
        })
    }

    /// Accept any exit status from this stage
    pub fn allow_failure(mut self) -> Self {
        self.require_success = false;
        self
    }

    /// Bound this stage's wall-clock time
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn requires_success(&self) -> bool {
        self.require_success
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Command line as it would be typed in a shell (for diagnostics only)
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.command_line())
    }
}

/// Captured output of one finished process
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    /// None when the process was ended by a signal
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

impl ProcessResult {
    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }

    /// Last `max_lines` lines of stderr, for failure reports
    pub fn stderr_tail(&self, max_lines: usize) -> String {
        let lines: Vec<&str> = self.stderr.lines().collect();
        let start = lines.len().saturating_sub(max_lines);
        lines[start..].join("\n")
    }
}

/// Named numeric fields parsed from one line of output
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ExtractedRecord {
    fields: BTreeMap<String, f64>,
    provenance: String,
}

impl ExtractedRecord {
    pub fn new(provenance: impl Into<String>) -> Self {
        Self {
            fields: BTreeMap::new(),
            provenance: provenance.into(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: f64) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied()
    }

    pub fn fields(&self) -> &BTreeMap<String, f64> {
        &self.fields
    }

    /// The line the values were parsed from
    pub fn provenance(&self) -> &str {
        &self.provenance
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Reference value with an absolute tolerance
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedValue {
    pub value: f64,
    pub tolerance: f64,
}

impl ExpectedValue {
    pub const fn new(value: f64, tolerance: f64) -> Self {
        Self { value, tolerance }
    }

    /// Tolerance must be finite and non-negative
    pub fn validate(&self, field: &str) -> SharedResult<()> {
        if !self.value.is_finite() {
            return Err(SharedError::InvalidExpectation {
                field: field.to_string(),
                reason: format!("expected value {} is not finite", self.value),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SharedError::InvalidExpectation {
                field: field.to_string(),
                reason: format!("tolerance {} must be finite and non-negative", self.tolerance),
            });
        }
        Ok(())
    }
}

/// Outcome of comparing one field against its expected value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub field: String,
    pub passed: bool,
    pub actual: f64,
    pub expected: f64,
    pub tolerance: f64,
    pub message: String,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "[{}] {}", mark, self.message)
    }
}
