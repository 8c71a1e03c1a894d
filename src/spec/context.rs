use crate::scenario::composer::ActionRecord;
use crate::spec::spec_model::AssertionResult;

/// Tracks the execution state and results of a running test.
#[derive(Debug, Clone, Default)]
pub struct TestContext {
    /// Current step index (0-based)
    pub current_step: usize,

    /// All assertion results collected during execution
    pub assertion_results: Vec<AssertionResult>,

    /// Field actions performed by form steps
    pub actions: Vec<ActionRecord>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record assertion results from a step.
    pub fn record_assertions(&mut self, results: Vec<AssertionResult>) {
        self.assertion_results.extend(results);
    }

    pub fn record_actions(&mut self, records: &[ActionRecord]) {
        self.actions = records.to_vec();
    }

    /// Check if all recorded assertions passed.
    pub fn all_passed(&self) -> bool {
        self.assertion_results.iter().all(|r| r.passed)
    }

    pub fn pass_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| r.passed).count()
    }

    pub fn fail_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| !r.passed).count()
    }
}
