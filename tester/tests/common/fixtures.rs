//! Test fixtures and data for harness tests
//!
//! Solver output and history files matching the piston reference case.

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Solver progress lines, including the checked step
    pub const SOLVER_STDOUT: &'static str = "\
Begin simulation.
Step=600 time=0.03350 dt=5.58e-05
Step=700 time=0.03931 dt=5.60e-05
Step=800 time=0.04000 dt=5.61e-05
Done simulation.";

    /// History rows ending at the reference final state
    pub const GOOD_HISTORY: &'static str = "\
# tme x vel
0 0.000 0.000 0.0
0 0.020 2.871 240.3
0 0.040 6.559 276.7";

    /// History rows whose final time is past the reference
    pub const LATE_HISTORY: &'static str = "\
0 0.040 6.559 276.7
0 0.050 6.559 276.7";

    /// Gas model input expected in the case directory
    pub const GAS_INPUT: &'static str = "model = \"IdealGas\"\nspecies = {'air'}\n";

    pub const HISTORY_FILE: &'static str = "piston-0000-history.data";
}
