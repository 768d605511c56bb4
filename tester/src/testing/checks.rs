//! Checks bound to a stage
//!
//! A check reads one line of a stage's stdout or of a results file the stage
//! wrote, extracts named fields and holds each against its expected value.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{TesterError, TesterResult};
use crate::testing::{OutputParser, ToleranceAssertion};
use shared::{ExpectedValue, ProcessResult, Verdict};

/// Where a check's text comes from
#[derive(Debug, Clone, PartialEq)]
pub enum CheckSource {
    /// The stage's captured stdout
    Stdout,
    /// A file the stage produced, relative to the working directory
    File(PathBuf),
}

impl fmt::Display for CheckSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckSource::Stdout => f.write_str("stdout"),
            CheckSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    description: String,
    source: CheckSource,
    parser: OutputParser,
    expectations: Vec<(String, ExpectedValue)>,
}

impl Check {
    /// Check against the stage's stdout
    pub fn stdout(description: impl Into<String>, parser: OutputParser) -> Self {
        Self {
            description: description.into(),
            source: CheckSource::Stdout,
            parser,
            expectations: Vec::new(),
        }
    }

    /// Check against a results file written by the stage
    pub fn file(description: impl Into<String>, path: impl Into<PathBuf>, parser: OutputParser) -> Self {
        Self {
            description: description.into(),
            source: CheckSource::File(path.into()),
            parser,
            expectations: Vec::new(),
        }
    }

    /// Expect `field` to land within the given band (fluent API)
    pub fn expect(mut self, field: impl Into<String>, expected: ExpectedValue) -> Self {
        self.expectations.push((field.into(), expected));
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source(&self) -> &CheckSource {
        &self.source
    }

    pub fn expectations(&self) -> &[(String, ExpectedValue)] {
        &self.expectations
    }

    /// Static consistency check, run before any stage executes
    pub fn validate(&self) -> TesterResult<()> {
        if self.expectations.is_empty() {
            return Err(TesterError::configuration(format!(
                "check '{}' has no expectations",
                self.description
            )));
        }

        for (field, expected) in &self.expectations {
            if !self.parser.fields().iter().any(|spec| spec.name() == field) {
                return Err(TesterError::configuration(format!(
                    "check '{}' expects field '{}' that its parser never extracts",
                    self.description, field
                )));
            }
            expected.validate(field)?;
        }

        Ok(())
    }

    /// Parse, extract and assert; any failed verdict fails the whole check
    pub async fn evaluate(&self, result: &ProcessResult, working_dir: &Path) -> TesterResult<Vec<Verdict>> {
        let record = match &self.source {
            CheckSource::Stdout => self.parser.extract(&result.stdout)?,
            CheckSource::File(path) => self.parser.extract_file(&working_dir.join(path)).await?,
        };

        let verdicts = ToleranceAssertion::assert_record(&record, &self.expectations)?;

        if verdicts.iter().all(|v| v.passed) {
            Ok(verdicts)
        } else {
            Err(TesterError::ToleranceViolation { verdicts })
        }
    }
}
