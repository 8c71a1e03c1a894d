use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::actions::FieldValue;
use crate::locator::FieldReference;

/// One logical form page: navigation before, field entries, navigation after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<NavAction>,

    #[serde(default)]
    pub entries: Vec<StepEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<NavAction>,
}

impl ScenarioStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            before: Vec::new(),
            entries: Vec::new(),
            after: Vec::new(),
        }
    }

    pub fn before(mut self, nav: NavAction) -> Self {
        self.before.push(nav);
        self
    }

    pub fn entry(mut self, entry: StepEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn field(self, field: FieldReference, value: FieldValue) -> Self {
        self.entry(StepEntry::Field(FieldEntry::required(field, value)))
    }

    pub fn optional(self, field: FieldReference, value: FieldValue) -> Self {
        self.entry(StepEntry::Field(FieldEntry::optional(field, value)))
    }

    pub fn after(mut self, nav: NavAction) -> Self {
        self.after.push(nav);
        self
    }
}

/// A field and the value to enter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    #[serde(flatten)]
    pub field: FieldReference,

    pub value: FieldValue,

    /// Absent required fields fail the step; absent optional ones are skipped.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl FieldEntry {
    pub fn required(field: FieldReference, value: FieldValue) -> Self {
        Self {
            field,
            value,
            required: true,
        }
    }

    pub fn optional(field: FieldReference, value: FieldValue) -> Self {
        Self {
            field,
            value,
            required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepEntry {
    Field(FieldEntry),

    /// Branch on an answer recorded earlier in the session.
    When {
        condition: Condition,
        #[serde(default)]
        then: Vec<StepEntry>,
        #[serde(default)]
        otherwise: Vec<StepEntry>,
    },

    /// Create `count` household members, filling `entries` for each and saving.
    AddAdults {
        count: usize,
        #[serde(default)]
        entries: Vec<StepEntry>,
        #[serde(default = "default_save_label")]
        save: String,
    },

    /// Remove the member card at `index` through its confirmation modal.
    DeleteAdult {
        index: usize,
        #[serde(default)]
        best_effort: bool,
    },

    /// Click every visible match of `selector`, leaving alone those that
    /// already carry `skip_class`. Nothing visible fails the step.
    ClickEach {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skip_class: Option<String>,
    },

    Pause { ms: u64 },
}

fn default_save_label() -> String {
    "Speichern".to_string()
}

/// Navigation performed around a step's entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavAction {
    /// Click the enabled progression button and advance [`FormProgress`](super::progress::FormProgress).
    SaveAndNext,
    /// Click the first visible element whose text is exactly `text`.
    ClickText { text: String },
    /// Click and continue on the popup it opens.
    FollowPopup { text: String },
    /// Click the first enabled button labelled `text`.
    Save { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Equals { field: String, value: String },
    NotEquals { field: String, value: String },
}

impl Condition {
    pub fn holds(&self, answers: &Answers) -> bool {
        match self {
            Condition::Equals { field, value } => answers.is(field, value),
            Condition::NotEquals { field, value } => !answers.is(field, value),
        }
    }
}

/// Answers entered so far, keyed by field label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers(HashMap<String, String>);

impl Answers {
    pub fn record(&mut self, label: &str, answer: String) {
        self.0.insert(label.trim().to_lowercase(), answer);
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(&label.trim().to_lowercase()).map(String::as_str)
    }

    /// Case-insensitive comparison; a missing answer equals nothing.
    pub fn is(&self, label: &str, value: &str) -> bool {
        self.get(label)
            .is_some_and(|a| a.trim().eq_ignore_ascii_case(value.trim()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::WidgetKind;

    #[test]
    fn entries_read_from_yaml() {
        let yaml = r#"
name: personal info
entries:
  - field: {label: First name, kind: text, value: {text: John}}
  - field: {label: Provider, kind: select, value: {option: SwissCaution}, required: false}
  - when:
      condition: {equals: {field: Nationality, value: Switzerland}}
      then:
        - field: {label: Hometown, kind: text, value: {text: Bern}}
  - add_adults: {count: 2}
  - delete_adult: {index: 0, best_effort: true}
  - click_each: {selector: "ul.radio-list li[title='Yes']", skip_class: selected}
after:
  - save_and_next
"#;
        let step: ScenarioStep = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(step.entries.len(), 6);
        assert_eq!(step.after, vec![NavAction::SaveAndNext]);

        let StepEntry::Field(provider) = &step.entries[1] else {
            panic!("expected a field entry");
        };
        assert!(!provider.required);
        assert_eq!(provider.field.kind, WidgetKind::Select);

        let StepEntry::AddAdults { save, entries, .. } = &step.entries[3] else {
            panic!("expected add_adults");
        };
        assert_eq!(save, "Speichern");
        assert!(entries.is_empty());
    }

    #[test]
    fn conditions_compare_case_insensitively() {
        let mut answers = Answers::default();
        answers.record("Nationality", "Switzerland".into());

        let swiss = Condition::Equals {
            field: "nationality".into(),
            value: "switzerland".into(),
        };
        assert!(swiss.holds(&answers));

        let relocated = Condition::NotEquals {
            field: "Relocation in the last 3 years".into(),
            value: "Yes".into(),
        };
        assert!(relocated.holds(&answers));
    }
}
