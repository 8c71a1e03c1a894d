use serde::{Deserialize, Serialize};

use crate::scenario::step_model::ScenarioStep;

/// A complete test specification, written in YAML or built in code
/// by [`application`](crate::scenario::application).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSpec {
    /// Human-readable name for this test
    pub name: String,

    /// URL to open first; a leading `/` is resolved against the base URL
    pub start_url: String,

    /// Ordered list of test steps to execute
    pub steps: Vec<TestStep>,
}

/// A single step in a test spec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Navigate to a different URL
    Navigate { url: String },

    /// Click the first visible element whose text is exactly `text`
    Click { text: String },

    /// Click the first visible element matching a CSS/XPath selector
    ClickElement { selector: String },

    /// Click something that opens a popup and continue there
    FollowPopup { text: String },

    /// Explicit pause
    Wait { duration_ms: u64 },

    /// Fill one form page
    Form(ScenarioStep),

    /// Click the enabled "Save and next" button
    SaveAndNext,

    /// The step indicator must read `expected`
    ExpectStep { expected: String },

    /// Run assertions against the current page state
    Assert { assertions: Vec<AssertionSpec> },

    /// Save a full-page screenshot
    Screenshot { path: String },
}

/// A single read-only check against the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssertionSpec {
    /// Current URL contains the expected substring
    UrlContains { expected: String },

    /// Current URL exactly matches
    UrlEquals { expected: String },

    /// Page title contains the expected substring
    TitleContains { expected: String },

    /// Body text contains the expected string (case-insensitive)
    TextPresent { expected: String },

    /// Body text does not contain the expected string (case-insensitive)
    TextAbsent { expected: String },

    /// A specific element's text contains `expected`
    ElementText { selector: String, expected: String },

    /// A specific element is visible, optionally after scrolling it into view
    ElementVisible {
        selector: String,
        #[serde(default)]
        scroll: bool,
    },

    /// Count of matching elements equals expected
    ElementCount { selector: String, expected: usize },

    /// At least `min` elements match
    ElementCountAtLeast { selector: String, min: usize },

    /// A link containing `text` exists and is visible
    LinkVisible { text: String },

    /// The form's active step indicator reads `expected`
    ActiveStep { expected: String },

    /// In-page navigation reached `#anchor`: the URL carries the fragment
    /// or the target element is visible
    AnchorReached { anchor: String },
}

impl AssertionSpec {
    /// Variant name for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            AssertionSpec::UrlContains { .. } => "UrlContains",
            AssertionSpec::UrlEquals { .. } => "UrlEquals",
            AssertionSpec::TitleContains { .. } => "TitleContains",
            AssertionSpec::TextPresent { .. } => "TextPresent",
            AssertionSpec::TextAbsent { .. } => "TextAbsent",
            AssertionSpec::ElementText { .. } => "ElementText",
            AssertionSpec::ElementVisible { .. } => "ElementVisible",
            AssertionSpec::ElementCount { .. } => "ElementCount",
            AssertionSpec::ElementCountAtLeast { .. } => "ElementCountAtLeast",
            AssertionSpec::LinkVisible { .. } => "LinkVisible",
            AssertionSpec::ActiveStep { .. } => "ActiveStep",
            AssertionSpec::AnchorReached { .. } => "AnchorReached",
        }
    }
}

/// Result of evaluating a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// Which step this assertion belongs to (0-indexed)
    pub step_index: usize,

    /// The assertion that was evaluated
    pub spec: AssertionSpec,

    /// Whether the assertion passed
    pub passed: bool,

    /// Actual value found (for debugging failed assertions)
    pub actual: Option<String>,

    /// Human-readable failure message
    pub message: Option<String>,
}

/// Result of running a complete test spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Name of the test spec that was run
    pub spec_name: String,

    /// Whether all steps and assertions passed
    pub passed: bool,

    /// Number of steps that were executed
    pub steps_run: usize,

    /// Number of field actions performed (including skipped optional ones)
    #[serde(default)]
    pub actions_run: usize,

    /// All assertion results collected during the run
    pub assertion_results: Vec<AssertionResult>,

    /// Error message if the test failed due to an error (not assertion failure)
    pub error: Option<String>,
}
