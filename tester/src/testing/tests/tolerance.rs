//! Tests for absolute-tolerance verdicts

use assert_matches::assert_matches;

use crate::error::TesterError;
use crate::testing::ToleranceAssertion;
use shared::{ExpectedValue, ExtractedRecord};

fn final_state_expectations() -> Vec<(String, ExpectedValue)> {
    vec![
        ("t".to_string(), ExpectedValue::new(0.040, 0.0001)),
        ("x".to_string(), ExpectedValue::new(6.559, 0.1)),
        ("v".to_string(), ExpectedValue::new(276.7, 1.0)),
    ]
}

fn record(t: f64, x: f64, v: f64) -> ExtractedRecord {
    let mut record = ExtractedRecord::new(format!("0 {t} {x} {v}"));
    record.insert("t", t);
    record.insert("x", x);
    record.insert("v", v);
    record
}

#[test]
fn test_value_inside_band_passes() {
    let verdict = ToleranceAssertion::evaluate("sim_time", 0.03931, &ExpectedValue::new(0.03931, 0.001)).unwrap();

    assert!(verdict.passed);
    assert_eq!(verdict.field, "sim_time");
    assert_eq!(verdict.actual, 0.03931);
}

#[test]
fn test_symmetric_in_sign_of_difference() {
    let expected = ExpectedValue::new(276.7, 1.0);

    for (actual, should_pass) in [(276.2, true), (277.2, true), (275.0, false), (278.4, false)] {
        let verdict = ToleranceAssertion::evaluate("v", actual, &expected).unwrap();
        assert_eq!(verdict.passed, should_pass, "actual {actual}");
    }
}

#[test]
fn test_boundary_is_exclusive() {
    let expected = ExpectedValue::new(1.0, 0.5);

    assert!(!ToleranceAssertion::evaluate("x", 1.5, &expected).unwrap().passed);
    assert!(!ToleranceAssertion::evaluate("x", 0.5, &expected).unwrap().passed);
    assert!(ToleranceAssertion::evaluate("x", 1.25, &expected).unwrap().passed);
}

#[test]
fn test_zero_tolerance_never_passes() {
    let verdict = ToleranceAssertion::evaluate("x", 6.559, &ExpectedValue::new(6.559, 0.0)).unwrap();
    assert!(!verdict.passed);
}

#[test]
fn test_nan_actual_fails() {
    let verdict = ToleranceAssertion::evaluate("v", f64::NAN, &ExpectedValue::new(276.7, 1.0)).unwrap();
    assert!(!verdict.passed);
}

#[test]
fn test_negative_tolerance_is_configuration_error() {
    let err = ToleranceAssertion::evaluate("x", 6.559, &ExpectedValue::new(6.559, -0.1)).unwrap_err();

    assert_matches!(err, TesterError::Shared(_));
    assert!(err.kind().is_harness_defect());
}

#[test]
fn test_final_state_within_bands_passes() {
    let verdicts = ToleranceAssertion::assert_record(&record(0.040, 6.559, 276.7), &final_state_expectations()).unwrap();

    assert_eq!(verdicts.len(), 3);
    assert!(verdicts.iter().all(|v| v.passed));
    let fields: Vec<&str> = verdicts.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, vec!["t", "x", "v"]);
}

#[test]
fn test_final_time_outside_band_names_everything() {
    let verdicts = ToleranceAssertion::assert_record(&record(0.050, 6.559, 276.7), &final_state_expectations()).unwrap();

    let t = &verdicts[0];
    assert!(!t.passed);
    assert_eq!(t.field, "t");
    assert_eq!(t.actual, 0.050);
    assert_eq!(t.expected, 0.040);
    assert_eq!(t.tolerance, 0.0001);
    assert!(t.message.starts_with("t:"));
    assert!(t.message.contains("0.05"));
    assert!(t.message.contains("0.04"));
    assert!(t.message.contains("0.0001"));

    assert!(verdicts[1].passed);
    assert!(verdicts[2].passed);
}

#[test]
fn test_missing_field_is_configuration_not_violation() {
    let mut partial = ExtractedRecord::new("0 0.040 6.559");
    partial.insert("t", 0.040);
    partial.insert("x", 6.559);

    let err = ToleranceAssertion::assert_record(&partial, &final_state_expectations()).unwrap_err();

    assert_matches!(err, TesterError::Configuration { ref message } if message.contains("'v'"));
}
