//! Shared types for the simulation regression harness
//!
//! Contains the data model that flows through the harness pipeline
//! (stages, captured process output, parsed records, expectations and
//! verdicts) plus logging setup used by every crate in the workspace.

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
