use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::browser::driver::{ElementRef, PageDriver};
use crate::error::{HarnessError, Result};
use crate::locator::strategy;
use crate::wait::{WaitOptions, first_visible, poll_until};

/// Position in the multi-step application form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormProgress {
    #[default]
    NotStarted,
    Step1Filled,
    Step2Filled,
    Step3Filled,
    Submitted,
}

impl FormProgress {
    /// State after a successful "Save and next".
    pub fn advance(self) -> FormProgress {
        match self {
            FormProgress::NotStarted => FormProgress::Step1Filled,
            FormProgress::Step1Filled => FormProgress::Step2Filled,
            FormProgress::Step2Filled => FormProgress::Step3Filled,
            FormProgress::Step3Filled | FormProgress::Submitted => FormProgress::Submitted,
        }
    }

    /// Step indicator the form should show in this state.
    pub fn expected_indicator(self) -> Option<&'static str> {
        match self {
            FormProgress::NotStarted => Some("1"),
            FormProgress::Step1Filled => Some("2"),
            FormProgress::Step2Filled => Some("3"),
            FormProgress::Step3Filled => Some("4"),
            FormProgress::Submitted => None,
        }
    }
}

/// Click the first visible match of `selector` not marked disabled.
///
/// While every match is disabled the click is retried until the wait runs
/// out; clicking a disabled control would silently do nothing.
pub fn click_enabled(
    driver: &mut dyn PageDriver,
    selector: &str,
    label: &str,
    wait: &WaitOptions,
) -> Result<ElementRef> {
    let found = poll_until(wait, || {
        let count = driver.count(selector)?;
        for i in 0..count {
            let button = ElementRef::new(selector, i);
            if !driver.is_visible(&button)? {
                continue;
            }
            let class = driver.attribute(&button, "class")?.unwrap_or_default();
            if class.split_whitespace().any(|c| c == strategy::DISABLED_CLASS) {
                debug!(button = %button, "button disabled, waiting");
                continue;
            }
            return Ok(Some(button));
        }
        Ok(None)
    })?;

    let button = found.ok_or_else(|| HarnessError::SaveButtonMissing {
        label: label.to_string(),
    })?;
    driver.click(&button)?;
    Ok(button)
}

/// Click "Save and next".
pub fn save_and_next(driver: &mut dyn PageDriver, wait: &WaitOptions) -> Result<()> {
    click_enabled(driver, strategy::SAVE_AND_NEXT, "Save and next", wait)?;
    info!("saved and advanced");
    Ok(())
}

/// Text of the active step indicator, if one is shown.
pub fn active_step(driver: &mut dyn PageDriver, wait: &WaitOptions) -> Result<Option<String>> {
    match first_visible(driver, strategy::ACTIVE_STEP, wait)? {
        Some(el) => Ok(driver.text_content(&el)?.map(|t| t.trim().to_string())),
        None => Ok(None),
    }
}

/// Wait until the step indicator reads `expected`.
pub fn expect_step(driver: &mut dyn PageDriver, expected: &str, wait: &WaitOptions) -> Result<()> {
    let mut last = None;
    let reached = poll_until(wait, || {
        last = active_step(driver, &WaitOptions::immediate())?;
        Ok((last.as_deref() == Some(expected)).then_some(()))
    })?;
    match reached {
        Some(()) => Ok(()),
        None => Err(HarnessError::UnexpectedStep {
            expected: expected.to_string(),
            actual: last.unwrap_or_else(|| "<none>".to_string()),
        }),
    }
}
