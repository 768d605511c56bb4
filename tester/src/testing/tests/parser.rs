//! Tests for OutputParser line selection and token extraction

use assert_matches::assert_matches;
use tempfile::TempDir;

use crate::error::{ParseFailure, TesterError};
use crate::testing::{FieldSpec, LineSelector, OutputParser};

const SOLVER_STDOUT: &str = "\
Begin simulation.
Step=600 time=0.03350 dt=5.58e-05 WC=12.1
Step=700 time=0.03931 dt=5.60e-05 WC=14.0
Step=800 time=0.04000 dt=5.61e-05 WC=16.2
Done simulation.
";

fn sim_time_parser(marker: &str) -> OutputParser {
    OutputParser::new(LineSelector::contains(marker)).field(FieldSpec::keyed_column("sim_time", 1, '='))
}

#[test]
fn test_extracts_sim_time_from_step_marker() {
    let record = sim_time_parser("Step=700").extract(SOLVER_STDOUT).unwrap();

    assert_eq!(record.get("sim_time"), Some(0.03931));
    assert!(record.provenance().starts_with("Step=700"));
}

#[test]
fn test_extract_value_returns_matched_line() {
    let parser = OutputParser::new(LineSelector::contains("Step=700"));
    let field = FieldSpec::keyed_column("sim_time", 1, '=');

    let (value, line) = parser.extract_value(SOLVER_STDOUT.lines(), &field).unwrap();

    assert_eq!(value, 0.03931);
    assert_eq!(line, "Step=700 time=0.03931 dt=5.60e-05 WC=14.0");
}

#[test]
fn test_last_match_wins() {
    let record = sim_time_parser("Step=").extract(SOLVER_STDOUT).unwrap();

    assert_eq!(record.get("sim_time"), Some(0.04));
    assert!(record.provenance().starts_with("Step=800"));
}

#[test]
fn test_repeated_identical_marker_uses_most_recent_line() {
    let text = "Step=700 time=0.01\nnoise\nStep=700 time=0.03931\n";

    let record = sim_time_parser("Step=700").extract(text).unwrap();

    assert_eq!(record.get("sim_time"), Some(0.03931));
}

#[test]
fn test_no_matching_line_is_no_match() {
    let err = sim_time_parser("Step=900").extract(SOLVER_STDOUT).unwrap_err();

    assert_matches!(err, ParseFailure::NoMatch { ref selector } if selector.contains("Step=900"));
}

#[test]
fn test_empty_input_is_no_match() {
    assert_matches!(
        sim_time_parser("Step=700").extract(""),
        Err(ParseFailure::NoMatch { .. })
    );
    assert_matches!(
        OutputParser::new(LineSelector::LastLine).extract("\n  \n"),
        Err(ParseFailure::NoMatch { .. })
    );
}

#[test]
fn test_malformed_token_carries_token_and_line() {
    let text = "Step=700 time=abc dt=5.6e-05\n";

    let err = sim_time_parser("Step=700").extract(text).unwrap_err();

    assert_eq!(
        err,
        ParseFailure::MalformedToken {
            field: "sim_time".to_string(),
            token: "time=abc".to_string(),
            line: "Step=700 time=abc dt=5.6e-05".to_string(),
        }
    );
}

#[test]
fn test_missing_delimiter_is_malformed() {
    let err = sim_time_parser("Step=700").extract("Step=700 0.03931\n").unwrap_err();

    assert_matches!(err, ParseFailure::MalformedToken { ref token, .. } if token == "0.03931");
}

#[test]
fn test_short_line_is_missing_token() {
    let parser = OutputParser::new(LineSelector::LastLine).field(FieldSpec::column("v", 3));

    let err = parser.extract("0 0.040 6.559\n").unwrap_err();

    assert_matches!(err, ParseFailure::MissingToken { ref field, .. } if field == "v");
}

#[test]
fn test_last_line_columns() {
    let text = "# t x v\n0 0.000 4.000 0.0\n0 0.020 5.100 190.2\n0 0.040 6.559 276.7\n";
    let parser = OutputParser::new(LineSelector::LastLine)
        .field(FieldSpec::column("t", 1))
        .field(FieldSpec::column("x", 2))
        .field(FieldSpec::column("v", 3));

    let record = parser.extract(text).unwrap();

    assert_eq!(record.len(), 3);
    assert_eq!(record.get("t"), Some(0.040));
    assert_eq!(record.get("x"), Some(6.559));
    assert_eq!(record.get("v"), Some(276.7));
}

#[test]
fn test_last_line_skips_trailing_blank_lines() {
    let parser = OutputParser::new(LineSelector::LastLine).field(FieldSpec::column("t", 1));

    let record = parser.extract("0 0.020 5.1 190.2\n0 0.040 6.559 276.7\n\n\n").unwrap();

    assert_eq!(record.get("t"), Some(0.040));
}

#[test]
fn test_keyed_field_found_anywhere_in_line() {
    let parser = OutputParser::new(LineSelector::contains("Step=700")).field(FieldSpec::keyed("dt", "dt", '='));

    let record = parser.extract(SOLVER_STDOUT).unwrap();

    assert_eq!(record.get("dt"), Some(5.60e-05));
}

#[test]
fn test_keyed_field_absent_is_missing_token() {
    let parser = OutputParser::new(LineSelector::contains("Step=700")).field(FieldSpec::keyed("cfl", "cfl", '='));

    assert_matches!(parser.extract(SOLVER_STDOUT), Err(ParseFailure::MissingToken { .. }));
}

#[test]
fn test_token_selector_requires_whole_token() {
    let text = "Step=7000 time=0.5\nStep=700 time=0.03931\nStep=7001 time=0.6\n";
    let parser = OutputParser::new(LineSelector::token("Step=700")).field(FieldSpec::keyed_column("sim_time", 1, '='));

    let record = parser.extract(text).unwrap();

    assert_eq!(record.get("sim_time"), Some(0.03931));
}

#[tokio::test]
async fn test_extract_file_reads_results_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("piston-0000-history.data");
    std::fs::write(&path, "0 0.0 4.0 0.0\n0 0.040 6.559 276.7\n").unwrap();
    let parser = OutputParser::new(LineSelector::LastLine).field(FieldSpec::column("x", 2));

    let record = parser.extract_file(&path).await.unwrap();

    assert_eq!(record.get("x"), Some(6.559));
}

#[tokio::test]
async fn test_missing_results_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let parser = OutputParser::new(LineSelector::LastLine).field(FieldSpec::column("x", 2));

    let err = parser.extract_file(&dir.path().join("absent.data")).await.unwrap_err();

    assert_matches!(err, TesterError::ResultsFile { .. });
}
