//! Test cases, outcomes, and suite verdicts
//!
//! Test cases are supplied by lesson content as data and are read-only to
//! the engine. Outcomes and verdicts are produced once per run and never
//! mutated afterwards.

use kata_vm::Value;
use serde::{Deserialize, Serialize};

/// A test input value as authored in lesson content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestValue {
    /// A boolean input
    Bool(bool),
    /// An integer input
    Int(i64),
    /// A float input
    Float(f64),
    /// A string input
    Str(String),
}

impl TestValue {
    /// Convert to the sandbox's argument form
    pub fn to_value(&self) -> Value {
        match self {
            TestValue::Bool(b) => Value::Bool(*b),
            TestValue::Int(i) => Value::Int(*i),
            TestValue::Float(f) => Value::Float(*f),
            TestValue::Str(s) => Value::str(s),
        }
    }
}

/// One test case from lesson content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// What the case checks, shown to the learner
    pub description: String,
    /// Arguments passed to the entry point, in order
    #[serde(default)]
    pub inputs: Vec<TestValue>,
    /// Expected program output
    pub expected_output: String,
    /// Whether the learner may see the case's details before passing
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl TestCase {
    /// Create a test case
    pub fn new(
        description: impl Into<String>,
        inputs: Vec<TestValue>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            inputs,
            expected_output: expected_output.into(),
            visible: true,
        }
    }

    /// Mark this case as hidden from the learner
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// The result of running one test case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestOutcome {
    /// The test case this outcome belongs to
    pub test_case: TestCase,
    /// Whether the captured output matched the expectation
    pub passed: bool,
    /// What the program actually printed, when it ran to completion
    pub actual_output: Option<String>,
    /// Populated only on failure: why the case failed
    pub diagnostic: Option<String>,
}

impl TestOutcome {
    /// A passing outcome
    pub fn pass(test_case: TestCase, actual_output: String) -> Self {
        Self {
            test_case,
            passed: true,
            actual_output: Some(actual_output),
            diagnostic: None,
        }
    }

    /// A failing outcome with an output mismatch
    pub fn mismatch(test_case: TestCase, expected: &str, actual: String) -> Self {
        let diagnostic = format!("expected output {expected:?}, got {actual:?}");
        Self {
            test_case,
            passed: false,
            actual_output: Some(actual),
            diagnostic: Some(diagnostic),
        }
    }

    /// A failing outcome caused by an execution error
    pub fn faulted(test_case: TestCase, diagnostic: String) -> Self {
        Self {
            test_case,
            passed: false,
            actual_output: None,
            diagnostic: Some(diagnostic),
        }
    }
}

/// The aggregated result of running every test case against one artifact
///
/// Constructed only from its outcomes, so the counts always equal the tally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteVerdict {
    outcomes: Vec<TestOutcome>,
    passed_count: usize,
    total_count: usize,
}

impl SuiteVerdict {
    /// Tally a verdict from per-case outcomes, preserving their order
    pub fn from_outcomes(outcomes: Vec<TestOutcome>) -> Self {
        let total_count = outcomes.len();
        let passed_count = outcomes.iter().filter(|o| o.passed).count();
        Self {
            outcomes,
            passed_count,
            total_count,
        }
    }

    /// Outcomes in test-case submission order
    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    /// Number of passing outcomes
    pub fn passed_count(&self) -> usize {
        self.passed_count
    }

    /// Total number of outcomes
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Whether every test case passed
    pub fn all_passed(&self) -> bool {
        self.passed_count == self.total_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_tally() {
        let case = TestCase::new("prints 1", vec![], "1");
        let verdict = SuiteVerdict::from_outcomes(vec![
            TestOutcome::pass(case.clone(), "1".to_string()),
            TestOutcome::mismatch(case.clone(), "1", "2".to_string()),
            TestOutcome::faulted(case, "runtime fault: division by zero".to_string()),
        ]);
        assert_eq!(verdict.passed_count(), 1);
        assert_eq!(verdict.total_count(), 3);
        assert!(!verdict.all_passed());
    }

    #[test]
    fn test_mismatch_diagnostic_contains_both_sides() {
        let case = TestCase::new("sum", vec![], "31");
        let outcome = TestOutcome::mismatch(case, "31", "30".to_string());
        let diagnostic = outcome.diagnostic.unwrap();
        assert!(diagnostic.contains("31"));
        assert!(diagnostic.contains("30"));
    }

    #[test]
    fn test_pass_has_no_diagnostic() {
        let case = TestCase::new("ok", vec![], "x");
        let outcome = TestOutcome::pass(case, "x".to_string());
        assert!(outcome.diagnostic.is_none());
        assert_eq!(outcome.actual_output.as_deref(), Some("x"));
    }
}
