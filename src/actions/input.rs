use tracing::{debug, warn};

use crate::actions::{ActionOutcome, FieldActions};
use crate::browser::driver::ElementRef;
use crate::error::{HarnessError, Result};
use crate::locator::{FieldReference, strategy};

impl FieldActions<'_> {
    /// Set a text input or textarea; the held value is read back and must match.
    pub fn fill_text(&mut self, field: &FieldReference, value: &str) -> Result<ActionOutcome> {
        let control = self.locate(field)?;
        self.fill_verified(field, &control, value)?;
        debug!(field = %field, value, "filled");
        Ok(ActionOutcome::Filled {
            value: value.to_string(),
        })
    }

    pub(crate) fn fill_verified(
        &mut self,
        field: &FieldReference,
        control: &ElementRef,
        value: &str,
    ) -> Result<()> {
        self.driver.fill(control, value)?;
        let mut actual = self.driver.input_value(control)?;
        if actual != value {
            warn!(field = %field, expected = value, actual = %actual, "value did not stick, refilling");
            self.driver.fill(control, value)?;
            actual = self.driver.input_value(control)?;
        }
        if actual != value {
            return Err(HarnessError::ValueNotPersisted {
                field: field.label.clone(),
                expected: value.to_string(),
                actual,
            });
        }
        Ok(())
    }

    /// Check a checkbox unless it already is.
    pub fn check_box(&mut self, field: &FieldReference) -> Result<ActionOutcome> {
        let control = self.locate(field)?;
        if self.driver.is_checked(&control)? {
            debug!(field = %field, "already checked");
            return Ok(ActionOutcome::AlreadyChecked);
        }
        self.driver.check(&control)?;
        Ok(ActionOutcome::Checked)
    }

    /// Type `value` into a number incrementer, then click its increment and
    /// decrement buttons where present. Reports the value held afterwards.
    pub fn set_number(&mut self, field: &FieldReference, value: i64) -> Result<ActionOutcome> {
        let control = self.locate(field)?;
        self.fill_verified(field, &control, &value.to_string())?;
        for button in ["increment", "decrement"] {
            let selector = strategy::number_step(&control, button);
            if self.driver.count(&selector)? > 0 {
                self.driver.click(&ElementRef::first(selector))?;
            }
        }
        let held = self.driver.input_value(&control)?;
        debug!(field = %field, value = %held, "number set");
        Ok(ActionOutcome::Filled { value: held })
    }

    /// Assign the value by script and re-assert it, retrying once.
    pub fn set_value_by_script(&mut self, field: &FieldReference, value: &str) -> Result<ActionOutcome> {
        let control = self.locate(field)?;
        let mut actual = String::new();
        for attempt in 0..2 {
            self.driver.set_value_by_script(&control, value)?;
            actual = self.driver.input_value(&control)?;
            if actual == value {
                return Ok(ActionOutcome::Filled {
                    value: value.to_string(),
                });
            }
            debug!(field = %field, attempt, actual = %actual, "script value did not persist");
        }
        Err(HarnessError::ValueNotPersisted {
            field: field.label.clone(),
            expected: value.to_string(),
            actual,
        })
    }
}
