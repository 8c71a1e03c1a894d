//! Resolution of semantic field references to concrete page elements.

pub mod strategy;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::browser::driver::{ElementRef, PageDriver};
use crate::error::{HarnessError, Result};
use crate::wait::{WaitOptions, poll_until};

/// The widget kinds the application form is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Text,
    Textarea,
    Select,
    RadioList,
    Checkbox,
    DatePicker,
    PhoneNumber,
    FileUpload,
    /// Number input with increment/decrement buttons
    Number,
}

impl WidgetKind {
    /// Controls commonly rendered hidden and driven by force.
    pub fn requires_visibility(self) -> bool {
        !matches!(self, WidgetKind::Checkbox | WidgetKind::FileUpload)
    }
}

/// Where on the page a label is searched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Page,
    /// Inside the block introduced by a heading containing this text.
    Section(String),
}

/// What to do when a label matches more than one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Take the first visible match in document order.
    #[default]
    FirstVisible,
    /// Fail with `AmbiguousMatch` unless exactly one element matches.
    Unique,
}

/// One logical form field, independent of its DOM position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReference {
    pub label: String,
    pub kind: WidgetKind,
    #[serde(default, skip_serializing_if = "is_page_scope")]
    pub scope: Scope,
    /// 0-based index among fields carrying the same label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth: Option<usize>,
    /// Explicit CSS/XPath selector for controls without a usable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

fn is_page_scope(scope: &Scope) -> bool {
    *scope == Scope::Page
}

impl FieldReference {
    pub fn new(label: impl Into<String>, kind: WidgetKind) -> Self {
        Self {
            label: label.into(),
            kind,
            scope: Scope::Page,
            nth: None,
            selector: None,
        }
    }

    pub fn text(label: impl Into<String>) -> Self {
        Self::new(label, WidgetKind::Text)
    }

    pub fn select(label: impl Into<String>) -> Self {
        Self::new(label, WidgetKind::Select)
    }

    pub fn radio(label: impl Into<String>) -> Self {
        Self::new(label, WidgetKind::RadioList)
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.nth = Some(index);
        self
    }

    pub fn in_section(mut self, title: impl Into<String>) -> Self {
        self.scope = Scope::Section(title.into());
        self
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }
}

impl std::fmt::Display for FieldReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} '{}'", self.kind, self.label)?;
        if let Some(n) = self.nth {
            write!(f, " #{}", n)?;
        }
        Ok(())
    }
}

/// Resolves [`FieldReference`]s with a bounded wait.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    pub wait: WaitOptions,
    pub policy: MatchPolicy,
}

impl Locator {
    pub fn new(wait: WaitOptions, policy: MatchPolicy) -> Self {
        Self { wait, policy }
    }

    /// Resolve `field`, polling until it appears or the wait elapses.
    pub fn locate(&self, driver: &mut dyn PageDriver, field: &FieldReference) -> Result<ElementRef> {
        self.locate_within(driver, field, &self.wait)
    }

    /// Single check, `None` when the field is absent right now.
    pub fn find_now(&self, driver: &mut dyn PageDriver, field: &FieldReference) -> Result<Option<ElementRef>> {
        match self.locate_within(driver, field, &WaitOptions::immediate()) {
            Ok(el) => Ok(Some(el)),
            Err(HarnessError::FieldNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn locate_within(
        &self,
        driver: &mut dyn PageDriver,
        field: &FieldReference,
        wait: &WaitOptions,
    ) -> Result<ElementRef> {
        let candidates = strategy::control_selectors(field);
        let index_matches = !strategy::indexes_container(field);

        let found = poll_until(wait, || {
            for selector in &candidates {
                let count = driver.count(selector)?;
                if count == 0 {
                    continue;
                }
                if index_matches {
                    if let Some(n) = field.nth {
                        // keep polling until enough matches render
                        if n < count {
                            return Ok(Some(ElementRef::new(selector.clone(), n)));
                        }
                        continue;
                    }
                }
                if self.policy == MatchPolicy::Unique && count > 1 {
                    return Err(HarnessError::AmbiguousMatch {
                        label: field.label.clone(),
                        kind: field.kind,
                        count,
                    });
                }
                if !field.kind.requires_visibility() {
                    return Ok(Some(ElementRef::new(selector.clone(), 0)));
                }
                for i in 0..count {
                    let element = ElementRef::new(selector.clone(), i);
                    if driver.is_visible(&element)? {
                        return Ok(Some(element));
                    }
                }
            }
            Ok(None)
        })?;

        match found {
            Some(element) => {
                debug!(field = %field, element = %element, "located");
                Ok(element)
            }
            None => Err(HarnessError::FieldNotFound {
                label: field.label.clone(),
                kind: field.kind,
                timeout_ms: wait.timeout_ms,
            }),
        }
    }
}
