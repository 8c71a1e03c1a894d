use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One concrete element: a selector (CSS, or XPath prefixed with `xpath=`)
/// plus the 0-based index among its matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub selector: String,
    pub nth: usize,
}

impl ElementRef {
    pub fn new(selector: impl Into<String>, nth: usize) -> Self {
        Self {
            selector: selector.into(),
            nth,
        }
    }

    pub fn first(selector: impl Into<String>) -> Self {
        Self::new(selector, 0)
    }
}

impl std::fmt::Display for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.selector, self.nth)
    }
}

/// The primitive page operations the harness is built on.
///
/// Implemented by [`BrowserSession`](crate::browser::session::BrowserSession)
/// for real browsers and by [`FakePage`](crate::browser::fake::FakePage) in tests.
/// All calls are synchronous against a single page; there is exactly one writer.
pub trait PageDriver {
    fn navigate(&mut self, url: &str) -> Result<()>;
    fn current_url(&mut self) -> Result<String>;
    fn title(&mut self) -> Result<String>;
    fn body_text(&mut self) -> Result<String>;

    /// Number of elements currently matching `selector`.
    fn count(&mut self, selector: &str) -> Result<usize>;
    fn is_visible(&mut self, element: &ElementRef) -> Result<bool>;
    fn text_content(&mut self, element: &ElementRef) -> Result<Option<String>>;
    fn attribute(&mut self, element: &ElementRef, name: &str) -> Result<Option<String>>;
    fn input_value(&mut self, element: &ElementRef) -> Result<String>;
    fn is_checked(&mut self, element: &ElementRef) -> Result<bool>;

    fn click(&mut self, element: &ElementRef) -> Result<()>;
    /// Click something that opens a popup and continue on the popup page.
    fn click_and_follow_popup(&mut self, element: &ElementRef) -> Result<()>;
    fn fill(&mut self, element: &ElementRef, value: &str) -> Result<()>;
    fn check(&mut self, element: &ElementRef) -> Result<()>;
    fn hover(&mut self, element: &ElementRef) -> Result<()>;
    fn press(&mut self, element: &ElementRef, key: &str) -> Result<()>;
    fn scroll_into_view(&mut self, element: &ElementRef) -> Result<()>;
    fn set_input_files(&mut self, element: &ElementRef, path: &Path) -> Result<()>;
    /// Assign `value` through a script and dispatch `input`/`change` events.
    fn set_value_by_script(&mut self, element: &ElementRef, value: &str) -> Result<()>;

    /// Explicit pause. Only used where a scenario asks for one.
    fn pause(&mut self, ms: u64) -> Result<()>;
    fn screenshot(&mut self, path: &str) -> Result<()>;
    fn quit(&mut self) -> Result<()>;
}

/// Prefix an XPath expression for the adapter's selector engine.
pub fn xpath(expr: impl AsRef<str>) -> String {
    format!("xpath={}", expr.as_ref())
}
