//! Common test utilities and infrastructure
//!
//! Fake tool chains and case directories shared by the integration suites.

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{FakeToolchain, InstalledToolchain, TestHelpers};
