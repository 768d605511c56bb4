//! Piston-in-tube case
//!
//! A piston driven down a tube by ideal air. The gas model is prepared,
//! then the simulation, then the solver runs and its final piston state is
//! extracted from the history file.

use crate::error::TesterResult;
use crate::scenarios::scenario::{stage, Scenario};
use crate::testing::{Check, FieldSpec, LineSelector, OutputParser};
use shared::ExpectedValue;

pub const JOB: &str = "piston";
pub const PISTON_INDEX: u32 = 0;
pub const CASE_SUBDIR: &str = "l1d/piston";

/// Solver step whose reported time is checked
pub const STEP_MARKER: &str = "Step=700";
pub const SIM_TIME_AT_STEP: ExpectedValue = ExpectedValue::new(0.03931, 1.0e-3);

/// Final piston state: time, position and velocity
pub const FINAL_TIME: ExpectedValue = ExpectedValue::new(0.040, 1.0e-4);
pub const FINAL_POSITION: ExpectedValue = ExpectedValue::new(6.559, 0.1);
pub const FINAL_VELOCITY: ExpectedValue = ExpectedValue::new(276.7, 1.0);

/// Name of the history file the post-processor writes for one piston
pub fn history_file(job: &str, piston_index: u32) -> String {
    format!("{job}-{piston_index:04}-history.data")
}

/// Check on the solver's stdout at the step marker
pub fn sim_time_check() -> Check {
    let parser = OutputParser::new(LineSelector::contains(STEP_MARKER))
        .field(FieldSpec::keyed_column("sim_time", 1, '='));

    Check::stdout(format!("simulation time at {STEP_MARKER}"), parser).expect("sim_time", SIM_TIME_AT_STEP)
}

/// Check on the final line of the piston history file
pub fn final_state_check() -> Check {
    let parser = OutputParser::new(LineSelector::LastLine)
        .field(FieldSpec::column("t", 1))
        .field(FieldSpec::column("x", 2))
        .field(FieldSpec::column("v", 3));

    Check::file("final piston state", history_file(JOB, PISTON_INDEX), parser)
        .expect("t", FINAL_TIME)
        .expect("x", FINAL_POSITION)
        .expect("v", FINAL_VELOCITY)
}

/// The two preparation stages only
pub fn prep_scenario() -> TesterResult<Scenario> {
    Ok(Scenario::new("piston-prep", "gas model and simulation preparation for the piston case")
        .with_case_subdir(CASE_SUBDIR)
        .with_stage(stage("gas-prep", "prep-gas ideal-air.inp ideal-air-gas-model.lua")?)
        .with_stage(stage("sim-prep", &format!("l1d4-prep --job={JOB}"))?))
}

/// The whole pipeline with its numeric checks
pub fn full_scenario() -> TesterResult<Scenario> {
    Ok(Scenario::new("piston", "piston in tube: prep, run, post-process and check the final state")
        .with_case_subdir(CASE_SUBDIR)
        .with_stage(stage("gas-prep", "prep-gas ideal-air.inp ideal-air-gas-model.lua")?)
        .with_stage(stage("sim-prep", &format!("l1d4-prep --job={JOB}"))?)
        .with_stage(stage("run", &format!("l1d4 --run-simulation --job={JOB}"))?.with_check(sim_time_check()))
        .with_stage(
            stage(
                "post",
                &format!("l1d4 --piston-history --job={JOB} --pindx={PISTON_INDEX}"),
            )?
            .with_check(final_state_check()),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_file_name() {
        assert_eq!(history_file("piston", 0), "piston-0000-history.data");
        assert_eq!(history_file("tube", 12), "tube-0012-history.data");
    }

    #[test]
    fn test_full_scenario_shape() {
        let scenario = full_scenario().unwrap();

        assert_eq!(scenario.stage_names(), vec!["gas-prep", "sim-prep", "run", "post"]);
        assert_eq!(scenario.check_count(), 2);
        assert_eq!(scenario.stages()[0].stage().program(), "prep-gas");
        assert_eq!(
            scenario.stages()[3].stage().args(),
            &["--piston-history", "--job=piston", "--pindx=0"]
        );
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_prep_scenario_has_no_checks() {
        let scenario = prep_scenario().unwrap();

        assert_eq!(scenario.stage_names(), vec!["gas-prep", "sim-prep"]);
        assert_eq!(scenario.check_count(), 0);
    }
}
