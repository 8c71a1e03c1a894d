use std::path::PathBuf;

use thiserror::Error;

use crate::locator::WidgetKind;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Locator found zero matches after the bounded wait
    #[error("{kind:?} field '{label}' not found after {timeout_ms}ms")]
    FieldNotFound {
        label: String,
        kind: WidgetKind,
        timeout_ms: u64,
    },

    /// Unique match required but several elements matched
    #[error("{kind:?} field '{label}' is ambiguous: {count} matches")]
    AmbiguousMatch {
        label: String,
        kind: WidgetKind,
        count: usize,
    },

    /// Dropdown option text not matched (strict mode)
    #[error("option '{option}' not found in dropdown '{field}'")]
    OptionNotFound { field: String, option: String },

    /// Dropdown opened but rendered no options
    #[error("dropdown '{field}' rendered no options")]
    NoOptions { field: String },

    #[error("could not navigate date picker '{field}' to {month} {year} within {attempts} attempts")]
    DateNavigationTimeout {
        field: String,
        month: String,
        year: i32,
        attempts: u32,
    },

    #[error("day {day} not found in date picker '{field}' for {month} {year}")]
    DateNotFound {
        field: String,
        day: u32,
        month: String,
        year: i32,
    },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Confirmation dialog for a delete action never appeared
    #[error("confirmation modal did not appear within {timeout_ms}ms")]
    ModalNotAppeared { timeout_ms: u64 },

    /// Progression control ("Save and next") absent or never enabled
    #[error("no enabled '{label}' button found")]
    SaveButtonMissing { label: String },

    #[error("value of '{field}' did not persist: expected '{expected}', got '{actual}'")]
    ValueNotPersisted {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("timed out after {ms}ms waiting for {what}")]
    Timeout { what: String, ms: u64 },

    #[error("expected form step '{expected}', found '{actual}'")]
    UnexpectedStep { expected: String, actual: String },

    /// Node.js adapter failed to spawn
    #[error("failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("browser session I/O: {0}")]
    SessionIo(String),

    /// Adapter answered ok=false
    #[error("browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file not readable: {path}")]
    MissingFile { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("preflight request to {url} failed: {reason}")]
    Preflight { url: String, reason: String },
}

impl HarnessError {
    /// Errors an optional field or best-effort sub-flow may swallow.
    pub fn is_best_effort_skippable(&self) -> bool {
        matches!(
            self,
            HarnessError::FieldNotFound { .. }
                | HarnessError::ModalNotAppeared { .. }
                | HarnessError::Timeout { .. }
                | HarnessError::MissingFile { .. }
        )
    }
}
