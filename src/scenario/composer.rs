use tracing::{debug, info, warn};

use crate::actions::{ActionConfig, ActionOutcome, FieldActions, FieldValue};
use crate::browser::driver::{ElementRef, PageDriver};
use crate::error::{HarnessError, Result};
use crate::fixture::FixtureData;
use crate::locator::{Locator, strategy};
use crate::scenario::progress::{self, FormProgress};
use crate::scenario::step_model::{Answers, FieldEntry, NavAction, ScenarioStep, StepEntry};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;
use crate::wait::WaitOptions;

/// What happened to one field entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub step: String,
    pub field: String,
    pub outcome: ActionOutcome,
}

/// Runs [`ScenarioStep`]s against one page, remembering answers for branches.
pub struct Composer<'a> {
    driver: &'a mut dyn PageDriver,
    config: ActionConfig,
    answers: Answers,
    progress: FormProgress,
    records: Vec<ActionRecord>,
    current_step: String,
    fixtures: Option<&'a FixtureData>,
    /// `{{member_email}}` of the household member being added
    member_email: Option<String>,
    trace: Option<&'a TraceLogger>,
}

impl<'a> Composer<'a> {
    pub fn new(driver: &'a mut dyn PageDriver, config: ActionConfig) -> Self {
        Self {
            driver,
            config,
            answers: Answers::default(),
            progress: FormProgress::NotStarted,
            records: Vec::new(),
            current_step: String::new(),
            fixtures: None,
            member_email: None,
            trace: None,
        }
    }

    /// Expand `{{placeholders}}` in values from these fixtures.
    pub fn with_fixtures(mut self, fixtures: &'a FixtureData) -> Self {
        self.fixtures = Some(fixtures);
        self
    }

    pub fn with_trace(mut self, trace: &'a TraceLogger) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn progress(&self) -> FormProgress {
        self.progress
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn config(&self) -> &ActionConfig {
        &self.config
    }

    pub fn wait(&self) -> WaitOptions {
        self.config.wait()
    }

    /// The page, for checks between steps.
    pub fn driver(&mut self) -> &mut dyn PageDriver {
        &mut *self.driver
    }

    pub(crate) fn actions(&mut self) -> FieldActions<'_> {
        FieldActions::new(&mut *self.driver, self.config.clone())
    }

    /// Draw a fresh `{{member_email}}` for the next household member, or
    /// clear it with `false` once all members are added.
    pub(crate) fn next_member(&mut self, active: bool) {
        self.member_email = match (active, self.fixtures) {
            (true, Some(fixtures)) => Some(fixtures.unique_email()),
            _ => None,
        };
    }

    fn placeholder(&self, key: &str) -> Option<String> {
        let fixtures = self.fixtures?;
        match key {
            "member_email" => self
                .member_email
                .clone()
                .or_else(|| Some(fixtures.email().to_string())),
            _ => fixtures.lookup(key),
        }
    }

    /// Navigation before, entries, navigation after. Stops at the first fatal error.
    pub fn run_step(&mut self, step: &ScenarioStep) -> Result<()> {
        info!(step = %step.name, entries = step.entries.len(), "running step");
        self.current_step = step.name.clone();
        for nav in &step.before {
            self.perform(nav)?;
        }
        self.run_entries(&step.entries)?;
        for nav in &step.after {
            self.perform(nav)?;
        }
        Ok(())
    }

    pub fn run_entries(&mut self, entries: &[StepEntry]) -> Result<()> {
        for entry in entries {
            self.run_entry(entry)?;
        }
        Ok(())
    }

    fn run_entry(&mut self, entry: &StepEntry) -> Result<()> {
        match entry {
            StepEntry::Field(field) => self.apply_field(field).map(|_| ()),
            StepEntry::When {
                condition,
                then,
                otherwise,
            } => {
                let holds = condition.holds(&self.answers);
                debug!(?condition, holds, "branch");
                self.run_entries(if holds { then } else { otherwise })
            }
            StepEntry::AddAdults {
                count,
                entries,
                save,
            } => self.add_adults(*count, entries, save),
            StepEntry::DeleteAdult { index, best_effort } => match self.delete_adult(*index) {
                Ok(_) => Ok(()),
                Err(e) if *best_effort && e.is_best_effort_skippable() => {
                    warn!(index, error = %e, "deleting household member failed, continuing");
                    self.trace_event(TraceEvent::now(&self.current_step, "delete_adult").with_error(&e));
                    Ok(())
                }
                Err(e) => Err(e),
            },
            StepEntry::ClickEach {
                selector,
                skip_class,
            } => self.click_each(selector, skip_class.as_deref()),
            StepEntry::Pause { ms } => self.driver.pause(*ms),
        }
    }

    fn click_each(&mut self, selector: &str, skip_class: Option<&str>) -> Result<()> {
        let ms = self.config.timeout_ms;
        if self.actions().wait_visible(selector)?.is_none() {
            return Err(HarnessError::Timeout {
                what: format!("any visible '{}'", selector),
                ms,
            });
        }
        let count = self.driver.count(selector)?;
        for i in 0..count {
            let el = ElementRef::new(selector, i);
            if !self.driver.is_visible(&el)? {
                continue;
            }
            let text = self.driver.text_content(&el)?.unwrap_or_default().trim().to_string();
            let class = self.driver.attribute(&el, "class")?.unwrap_or_default();
            let outcome = if skip_class.is_some_and(|c| class.split_whitespace().any(|k| k == c)) {
                ActionOutcome::AlreadySelected { option: text }
            } else {
                self.driver.click(&el)?;
                ActionOutcome::Selected { option: text }
            };
            self.record(&el.to_string(), "click", outcome);
        }
        debug!(selector, count, "clicked each");
        Ok(())
    }

    /// Apply one field entry, skipping it when optional and absent.
    pub fn apply_field(&mut self, entry: &FieldEntry) -> Result<ActionOutcome> {
        let value = match self.fixtures {
            Some(_) => entry.value.expand(|key| self.placeholder(key)),
            None => entry.value.clone(),
        };
        let label = entry.field.to_string();

        if !entry.required {
            let now = Locator::new(WaitOptions::immediate(), self.config.policy);
            if now.find_now(&mut *self.driver, &entry.field)?.is_none() {
                debug!(field = %label, "optional field absent, skipped");
                let outcome = ActionOutcome::Skipped {
                    reason: "optional field absent".into(),
                };
                self.record(&label, &value.answer(), outcome.clone());
                return Ok(outcome);
            }
        }

        let result = self.actions().apply(&entry.field, &value);
        match result {
            Ok(outcome) => {
                let held = held_answer(&value, &outcome);
                self.answers.record(&entry.field.label, held.clone());
                self.record(&label, &held, outcome.clone());
                Ok(outcome)
            }
            Err(e) => {
                self.trace_event(
                    TraceEvent::now(&self.current_step, "field")
                        .with_field(&label)
                        .with_value(value.answer())
                        .with_error(&e),
                );
                Err(e)
            }
        }
    }

    pub fn perform(&mut self, nav: &NavAction) -> Result<()> {
        let wait = self.wait();
        match nav {
            NavAction::SaveAndNext => match progress::save_and_next(&mut *self.driver, &wait) {
                Ok(()) => {
                    self.progress = self.progress.advance();
                    info!(progress = ?self.progress, "form advanced");
                }
                Err(e @ HarnessError::SaveButtonMissing { .. }) => {
                    warn!(progress = ?self.progress, error = %e, "save and next unavailable, not advancing");
                    self.trace_event(TraceEvent::now(&self.current_step, "nav").with_error(&e));
                    return Ok(());
                }
                Err(e) => return Err(e),
            },
            NavAction::Save { text } => {
                progress::click_enabled(&mut *self.driver, &strategy::exact_text(text), text, &wait)?;
            }
            NavAction::ClickText { text } => {
                let el = self.visible_text(text)?;
                self.driver.click(&el)?;
            }
            NavAction::FollowPopup { text } => {
                let el = self.visible_text(text)?;
                self.driver.click_and_follow_popup(&el)?;
            }
        }
        self.trace_event(TraceEvent::now(&self.current_step, "nav").with_value(format!("{:?}", nav)));
        Ok(())
    }

    fn visible_text(&mut self, text: &str) -> Result<ElementRef> {
        let ms = self.config.timeout_ms;
        let found = self.actions().wait_visible(&strategy::exact_text(text))?;
        found.ok_or_else(|| HarnessError::Timeout {
            what: format!("element with text '{}'", text),
            ms,
        })
    }

    fn record(&mut self, field: &str, value: &str, outcome: ActionOutcome) {
        self.trace_event(
            TraceEvent::now(&self.current_step, "field")
                .with_field(field)
                .with_value(value)
                .with_outcome(&outcome),
        );
        self.records.push(ActionRecord {
            step: self.current_step.clone(),
            field: field.to_string(),
            outcome,
        });
    }

    pub(crate) fn trace_event(&self, event: TraceEvent) {
        if let Some(trace) = self.trace {
            trace.log(&event);
        }
    }
}

/// What the form holds after `outcome`: the option actually clicked or the
/// query Enter was pressed on, otherwise the requested value.
fn held_answer(value: &FieldValue, outcome: &ActionOutcome) -> String {
    match outcome {
        ActionOutcome::Selected { option } | ActionOutcome::FallbackSelected { option, .. } => {
            option.clone()
        }
        ActionOutcome::EnterPressed { query } => query.clone(),
        _ => value.answer(),
    }
}
