//! Typed operations, one per widget kind.

pub mod choice;
pub mod date;
pub mod input;
pub mod phone;
pub mod upload;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::browser::driver::{ElementRef, PageDriver};
use crate::error::Result;
use crate::locator::{FieldReference, Locator, MatchPolicy};
use crate::wait::{WaitOptions, first_visible};

/// Attempts allowed when paging a date picker towards its target month.
pub const MAX_DATE_NAVIGATION_ATTEMPTS: u32 = 30;

/// Tunables shared by every action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Unmatched dropdown options fail instead of picking the first one.
    pub strict_options: bool,
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub policy: MatchPolicy,
    pub max_date_attempts: u32,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            strict_options: true,
            timeout_ms: crate::wait::DEFAULT_TIMEOUT_MS,
            poll_interval_ms: crate::wait::DEFAULT_POLL_INTERVAL_MS,
            policy: MatchPolicy::FirstVisible,
            max_date_attempts: MAX_DATE_NAVIGATION_ATTEMPTS,
        }
    }
}

impl ActionConfig {
    pub fn wait(&self) -> WaitOptions {
        WaitOptions::new(self.timeout_ms).with_poll_interval(self.poll_interval_ms)
    }

    pub fn lenient(mut self) -> Self {
        self.strict_options = false;
        self
    }

    pub fn with_wait(mut self, timeout_ms: u64, poll_interval_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self.poll_interval_ms = poll_interval_ms;
        self
    }
}

/// Value to put into a field, tagged by how it is entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    /// Dropdown option, matched case-insensitively by substring
    Option(String),
    /// Searchable dropdown: type, then pick
    Search(String),
    Radio(String),
    Date { day: u32, month: String, year: i32 },
    Phone { country_code: String, digits: String },
    File { path: PathBuf },
    Check,
    /// Set through a script, for inputs that swallow typed input
    Script(String),
    /// Number incrementer: typed, then stepped up and back down
    Number(i64),
}

impl FieldValue {
    /// The answer recorded for branch conditions.
    pub fn answer(&self) -> String {
        match self {
            FieldValue::Text(v)
            | FieldValue::Option(v)
            | FieldValue::Search(v)
            | FieldValue::Radio(v)
            | FieldValue::Script(v) => v.clone(),
            FieldValue::Date { day, month, year } => format!("{} {} {}", day, month, year),
            FieldValue::Phone {
                country_code,
                digits,
            } => format!("+{} {}", country_code, digits),
            FieldValue::File { path } => path.display().to_string(),
            FieldValue::Check => "checked".into(),
            FieldValue::Number(n) => n.to_string(),
        }
    }

    /// Replace `{{key}}` placeholders in text-like values.
    pub fn expand(&self, lookup: impl Fn(&str) -> Option<String>) -> FieldValue {
        let sub = |s: &String| expand_placeholders(s, &lookup);
        match self {
            FieldValue::Text(v) => FieldValue::Text(sub(v)),
            FieldValue::Option(v) => FieldValue::Option(sub(v)),
            FieldValue::Search(v) => FieldValue::Search(sub(v)),
            FieldValue::Radio(v) => FieldValue::Radio(sub(v)),
            FieldValue::Script(v) => FieldValue::Script(sub(v)),
            other => other.clone(),
        }
    }
}

fn expand_placeholders(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match lookup(key) {
                    Some(v) => out.push_str(&v),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// What an action actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Filled { value: String },
    Selected { option: String },
    /// Lenient mode: requested option missing, first option taken instead
    FallbackSelected { requested: String, option: String },
    /// Searchable dropdown had no match; Enter was pressed on the query
    EnterPressed { query: String },
    AlreadySelected { option: String },
    Checked,
    AlreadyChecked,
    DatePicked { date: String },
    PhoneFilled { formatted: String },
    Uploaded { replaced: bool },
    Skipped { reason: String },
}

/// Field Actions bound to one page.
pub struct FieldActions<'a> {
    pub driver: &'a mut dyn PageDriver,
    pub locator: Locator,
    pub config: ActionConfig,
}

impl<'a> FieldActions<'a> {
    pub fn new(driver: &'a mut dyn PageDriver, config: ActionConfig) -> Self {
        let locator = Locator::new(config.wait(), config.policy);
        Self {
            driver,
            locator,
            config,
        }
    }

    pub fn locate(&mut self, field: &FieldReference) -> Result<ElementRef> {
        self.locator.locate(&mut *self.driver, field)
    }

    /// Dispatch a value to the matching typed operation.
    pub fn apply(&mut self, field: &FieldReference, value: &FieldValue) -> Result<ActionOutcome> {
        match value {
            FieldValue::Text(v) => self.fill_text(field, v),
            FieldValue::Option(v) => self.select_dropdown_option(field, v),
            FieldValue::Search(v) => self.select_search_option(field, v),
            FieldValue::Radio(v) => self.select_radio_option(field, v),
            FieldValue::Date { day, month, year } => self.pick_date(field, *day, month, *year),
            FieldValue::Phone {
                country_code,
                digits,
            } => self.fill_phone_number(field, country_code, digits),
            FieldValue::File { path } => self.upload_file(field, path),
            FieldValue::Check => self.check_box(field),
            FieldValue::Script(v) => self.set_value_by_script(field, v),
            FieldValue::Number(n) => self.set_number(field, *n),
        }
    }

    /// First visible element of `selector`, polled with the action wait.
    pub(crate) fn wait_visible(&mut self, selector: &str) -> Result<Option<ElementRef>> {
        first_visible(&mut *self.driver, selector, &self.config.wait())
    }

    /// Wait until nothing matches `selector` any more.
    pub(crate) fn wait_gone(&mut self, selector: &str, what: &str) -> Result<()> {
        let driver = &mut *self.driver;
        crate::wait::wait_for(&self.config.wait(), what, || Ok(driver.count(selector)? == 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_expand_known_keys_only() {
        let lookup = |k: &str| (k == "email").then(|| "a@b.ch".to_string());
        assert_eq!(
            expand_placeholders("mail: {{ email }} / {{other}}", &lookup),
            "mail: a@b.ch / {{other}}"
        );
        assert_eq!(expand_placeholders("open {{", &lookup), "open {{");
    }

    #[test]
    fn field_value_yaml_shapes() {
        let v: FieldValue = serde_yaml::from_str("check").unwrap();
        assert_eq!(v, FieldValue::Check);

        let v: FieldValue =
            serde_yaml::from_str("date: {day: 15, month: June, year: 2024}").unwrap();
        assert_eq!(v.answer(), "15 June 2024");

        let v: FieldValue = serde_yaml::from_str("option: couple household").unwrap();
        assert_eq!(v, FieldValue::Option("couple household".into()));

        let v: FieldValue = serde_yaml::from_str("number: 3").unwrap();
        assert_eq!(v.answer(), "3");
    }
}
