use serde::{Deserialize, Serialize};

use crate::spec::spec_model::TestResult;

/// Aggregated outcome of one `run` or `scenario` invocation.
///
/// Consumed by the console, HTML and JUnit reporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteReport {
    pub suite_name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,

    /// Tests that stopped on a fatal error rather than a failed assertion
    #[serde(default)]
    pub errored: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub test_results: Vec<TestResult>,
}

impl TestSuiteReport {
    pub fn from_results(suite_name: &str, results: Vec<TestResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let errored = results.iter().filter(|r| r.error.is_some()).count();
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed: total - passed,
            errored,
            duration_ms: None,
            test_results: results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Field actions performed across all tests.
    pub fn total_actions(&self) -> usize {
        self.test_results.iter().map(|r| r.actions_run).sum()
    }
}

/// `"1.2s"`-style duration suffix shared by the reporters.
pub(crate) fn seconds(ms: u128) -> String {
    format!("{:.1}s", ms as f64 / 1000.0)
}
