//! Testing Framework
//!
//! Output parsing, tolerance assertions, stage checks and run reports.

pub mod checks;
pub mod parser;
pub mod report;
pub mod tolerance;

#[cfg(test)]
mod tests;

// Re-export main types
pub use checks::{Check, CheckSource};
pub use parser::{FieldSpec, LineSelector, OutputParser, TokenLocator};
pub use report::{RunSummary, ScenarioReport, StageReport, StageStatus};
pub use tolerance::ToleranceAssertion;
