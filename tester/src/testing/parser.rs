//! Output Parser
//!
//! Pulls labeled numbers out of free-form, line-oriented tool output. A
//! selector picks one line (the last match wins, since progress markers
//! repeat while the solver steps), the line is split on whitespace, and each
//! field spec turns one token into an `f64`.

use std::fmt;
use std::path::Path;

use crate::error::{ParseFailure, TesterError, TesterResult};
use shared::ExtractedRecord;

/// Which line of the output to parse
#[derive(Debug, Clone, PartialEq)]
pub enum LineSelector {
    /// Line contains the marker as a substring
    Contains(String),
    /// Line has a whitespace-separated token equal to the marker
    Token(String),
    /// Last non-blank line
    LastLine,
}

impl LineSelector {
    pub fn contains(marker: impl Into<String>) -> Self {
        LineSelector::Contains(marker.into())
    }

    pub fn token(marker: impl Into<String>) -> Self {
        LineSelector::Token(marker.into())
    }

    fn matches(&self, line: &str) -> bool {
        match self {
            LineSelector::Contains(marker) => line.contains(marker.as_str()),
            LineSelector::Token(marker) => line.split_whitespace().any(|t| t == marker),
            LineSelector::LastLine => !line.trim().is_empty(),
        }
    }
}

impl fmt::Display for LineSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineSelector::Contains(marker) => write!(f, "line containing '{marker}'"),
            LineSelector::Token(marker) => write!(f, "line with token '{marker}'"),
            LineSelector::LastLine => f.write_str("last non-blank line"),
        }
    }
}

/// Where a field's token sits in the selected line
#[derive(Debug, Clone, PartialEq)]
pub enum TokenLocator {
    /// Zero-based whitespace token position
    Index(usize),
    /// First token of the form `<key><delimiter><value>`
    Key(String),
}

impl fmt::Display for TokenLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenLocator::Index(index) => write!(f, "token {index}"),
            TokenLocator::Key(key) => write!(f, "token keyed '{key}'"),
        }
    }
}

/// How to read one named number from the selected line
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    locator: TokenLocator,
    delimiter: Option<char>,
}

impl FieldSpec {
    /// Plain numeric column, e.g. `6.559` at index 2
    pub fn column(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            locator: TokenLocator::Index(index),
            delimiter: None,
        }
    }

    /// Column holding `key=value`; the key is discarded
    pub fn keyed_column(name: impl Into<String>, index: usize, delimiter: char) -> Self {
        Self {
            name: name.into(),
            locator: TokenLocator::Index(index),
            delimiter: Some(delimiter),
        }
    }

    /// Token found by its key wherever it sits in the line
    pub fn keyed(name: impl Into<String>, key: impl Into<String>, delimiter: char) -> Self {
        Self {
            name: name.into(),
            locator: TokenLocator::Key(key.into()),
            delimiter: Some(delimiter),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, line: &str) -> Result<f64, ParseFailure> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let (index, token) = match &self.locator {
            TokenLocator::Index(index) => match tokens.get(*index) {
                Some(token) => (*index, *token),
                None => return Err(self.missing(line)),
            },
            TokenLocator::Key(key) => {
                let delimiter = self.delimiter.unwrap_or('=');
                let found = tokens.iter().enumerate().find(|(_, token)| {
                    token
                        .split_once(delimiter)
                        .is_some_and(|(token_key, _)| token_key == key)
                });
                match found {
                    Some((index, token)) => (index, *token),
                    None => return Err(self.missing(line)),
                }
            }
        };
        tracing::trace!(field = %self.name, index, token, "Reading token");

        let value = match self.delimiter {
            Some(delimiter) => match token.split_once(delimiter) {
                Some((_, value)) => value,
                None => return Err(self.malformed(token, line)),
            },
            None => token,
        };

        value.parse::<f64>().map_err(|_| self.malformed(token, line))
    }

    fn missing(&self, line: &str) -> ParseFailure {
        ParseFailure::MissingToken {
            field: self.name.clone(),
            wanted: self.locator.to_string(),
            line: line.to_string(),
        }
    }

    fn malformed(&self, token: &str, line: &str) -> ParseFailure {
        ParseFailure::MalformedToken {
            field: self.name.clone(),
            token: token.to_string(),
            line: line.to_string(),
        }
    }
}

/// Line selector plus the fields to read from the selected line
#[derive(Debug, Clone, PartialEq)]
pub struct OutputParser {
    selector: LineSelector,
    fields: Vec<FieldSpec>,
}

impl OutputParser {
    pub fn new(selector: LineSelector) -> Self {
        Self {
            selector,
            fields: Vec::new(),
        }
    }

    /// Add a field to extract (fluent API)
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn selector(&self) -> &LineSelector {
        &self.selector
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Find the line to parse; with several matches the last one wins
    pub fn select_line<'a, I>(&self, lines: I) -> Result<&'a str, ParseFailure>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .filter(|line| self.selector.matches(line))
            .last()
            .ok_or_else(|| ParseFailure::NoMatch {
                selector: self.selector.to_string(),
            })
    }

    /// Read a single field, returning the value with the line it came from
    pub fn extract_value<'a, I>(&self, lines: I, field: &FieldSpec) -> Result<(f64, String), ParseFailure>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let line = self.select_line(lines)?;
        let value = field.read(line)?;
        Ok((value, line.to_string()))
    }

    /// Read every configured field from the selected line of `text`
    pub fn extract(&self, text: &str) -> Result<ExtractedRecord, ParseFailure> {
        let line = self.select_line(text.lines())?;
        let mut record = ExtractedRecord::new(line);

        for field in &self.fields {
            record.insert(field.name(), field.read(line)?);
        }

        tracing::debug!("🔎 Extracted {:?} from '{}'", record.fields(), line);
        Ok(record)
    }

    /// Read every configured field from a results file
    pub async fn extract_file(&self, path: &Path) -> TesterResult<ExtractedRecord> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TesterError::ResultsFile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(self.extract(&text)?)
    }
}
