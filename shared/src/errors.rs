//! Shared error types for the regression harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Stage '{stage}' has an empty command line")]
    EmptyCommand { stage: String },

    #[error("Invalid expectation for field '{field}': {reason}")]
    InvalidExpectation { field: String, reason: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
