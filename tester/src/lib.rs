//! Simulation Regression Harness
//!
//! Drives an external gas-dynamics tool chain (gas-model prep, simulation
//! prep, solver, post-processing) stage by stage and checks the numbers it
//! produces against reference values within per-field absolute tolerances.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sim_tester::*;
//!
//! # async fn demo() -> TesterResult<()> {
//! let config = HarnessConfig::builder()
//!     .case_root("/opt/solver/examples")
//!     .scratch_root("/tmp/sim-runs")
//!     .build();
//!
//! let harness = TestScenarios::new(config.clone());
//! let scenarios = TestScenarios::resolve("piston")?;
//! let summary = harness.run_all(scenarios, Arc::new(config.runner())).await?;
//!
//! assert!(summary.passed());
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod core;
pub mod error;
pub mod runtime;
pub mod scenarios;
pub mod testing;
pub mod traits;

// Main interfaces - re-exported at crate root for convenience
pub use config::{HarnessConfig, HarnessConfigBuilder};
pub use crate::core::{FailureReason, SequenceState, StageSequencer};
pub use error::{FailureKind, ParseFailure, TesterError, TesterResult};
pub use scenarios::{Scenario, StagePlan, TestScenarios};
pub use traits::ProcessRunner;

// Supporting types
pub use runtime::{RunWorkspace, TokioProcessRunner};
pub use testing::{Check, CheckSource, FieldSpec, LineSelector, OutputParser, TokenLocator, ToleranceAssertion};
pub use testing::{RunSummary, ScenarioReport, StageReport, StageStatus};
