//! Absolute-tolerance assertions
//!
//! Reference values span several orders of magnitude, so every field carries
//! its own absolute band rather than sharing a relative rule.

use crate::error::{TesterError, TesterResult};
use shared::{ExpectedValue, ExtractedRecord, Verdict};

pub struct ToleranceAssertion;

impl ToleranceAssertion {
    /// Pass iff `|actual - expected| < tolerance`
    pub fn evaluate(field: &str, actual: f64, expected: &ExpectedValue) -> TesterResult<Verdict> {
        expected.validate(field)?;

        let deviation = (actual - expected.value).abs();
        let passed = deviation < expected.tolerance;

        let message = if passed {
            format!(
                "{field}: actual {actual} within tolerance {} of expected {}",
                expected.tolerance, expected.value
            )
        } else {
            format!(
                "{field}: actual {actual} deviates from expected {} by {deviation:.6e} (tolerance {})",
                expected.value, expected.tolerance
            )
        };

        Ok(Verdict {
            field: field.to_string(),
            passed,
            actual,
            expected: expected.value,
            tolerance: expected.tolerance,
            message,
        })
    }

    /// Evaluate every expectation against a record
    ///
    /// An expectation naming a field the record lacks is a harness
    /// configuration error, not a failed verdict.
    pub fn assert_record(
        record: &ExtractedRecord,
        expectations: &[(String, ExpectedValue)],
    ) -> TesterResult<Vec<Verdict>> {
        let mut verdicts = Vec::with_capacity(expectations.len());

        for (field, expected) in expectations {
            let actual = record.get(field).ok_or_else(|| {
                TesterError::configuration(format!(
                    "expectation for '{}' but no such field was extracted from '{}'",
                    field,
                    record.provenance()
                ))
            })?;
            verdicts.push(Self::evaluate(field, actual, expected)?);
        }

        Ok(verdicts)
    }
}
