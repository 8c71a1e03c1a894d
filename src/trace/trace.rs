use serde::Serialize;

use crate::actions::ActionOutcome;

/// One JSONL line of the action trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: i64,
    pub step: String,

    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ActionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn now(step: &str, kind: &str) -> Self {
        Self {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            step: step.to_string(),
            kind: kind.to_string(),
            field: None,
            value: None,
            outcome: None,
            error: None,
        }
    }

    pub fn with_field(mut self, field: impl ToString) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn with_value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: &ActionOutcome) -> Self {
        self.outcome = Some(outcome.clone());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
