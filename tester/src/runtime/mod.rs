//! Runtime Management
//!
//! This module handles external process execution and the working
//! directories those processes run in.

pub mod process_runner;
pub mod workspace;

#[cfg(test)]
mod tests;

// Re-export main types
pub use process_runner::TokioProcessRunner;
pub use workspace::RunWorkspace;
