//! Configuration Management
//!
//! This module provides configuration structures and builders for harness setup.

pub mod builder;
pub mod harness;

// Re-export main types
pub use builder::HarnessConfigBuilder;
pub use harness::HarnessConfig;
