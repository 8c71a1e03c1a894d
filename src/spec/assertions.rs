//! Read-only page checks. Nothing here changes form state; scrolling an
//! element into view is the only interaction.

use crate::browser::driver::{ElementRef, PageDriver};
use crate::error::Result;
use crate::locator::strategy;
use crate::scenario::progress;
use crate::spec::spec_model::{AssertionResult, AssertionSpec};
use crate::wait::{WaitOptions, poll_until};

/// Evaluate a list of assertions in order.
pub fn evaluate_all(
    assertions: &[AssertionSpec],
    step_index: usize,
    driver: &mut dyn PageDriver,
    wait: &WaitOptions,
) -> Vec<AssertionResult> {
    assertions
        .iter()
        .map(|spec| evaluate(spec, step_index, driver, wait))
        .collect()
}

/// Evaluate one assertion. Conditions that can settle (URL, title, text,
/// elements appearing) are polled up to `wait` before failing.
pub fn evaluate(
    spec: &AssertionSpec,
    step_index: usize,
    driver: &mut dyn PageDriver,
    wait: &WaitOptions,
) -> AssertionResult {
    match check(spec, driver, wait) {
        Ok((passed, actual, failure)) => AssertionResult {
            step_index,
            spec: spec.clone(),
            passed,
            actual,
            message: if passed { None } else { Some(failure) },
        },
        Err(e) => AssertionResult {
            step_index,
            spec: spec.clone(),
            passed: false,
            actual: None,
            message: Some(format!("Failed to query page: {}", e)),
        },
    }
}

type Checked = (bool, Option<String>, String);

/// Poll `check` until it passes; the last observation is returned either way.
fn settle<F>(wait: &WaitOptions, mut check: F) -> Result<(bool, Option<String>)>
where
    F: FnMut() -> Result<(bool, Option<String>)>,
{
    let mut last = (false, None);
    let passed = poll_until(wait, || {
        last = check()?;
        Ok(last.0.then_some(()))
    })?;
    Ok((passed.is_some(), last.1))
}

fn check(spec: &AssertionSpec, driver: &mut dyn PageDriver, wait: &WaitOptions) -> Result<Checked> {
    match spec {
        AssertionSpec::UrlContains { expected } => {
            let (passed, actual) = settle(wait, || {
                let url = driver.current_url()?;
                Ok((url.contains(expected.as_str()), Some(url)))
            })?;
            Ok((passed, actual, format!("URL does not contain '{}'", expected)))
        }

        AssertionSpec::UrlEquals { expected } => {
            let (passed, actual) = settle(wait, || {
                let url = driver.current_url()?;
                Ok((url == *expected, Some(url)))
            })?;
            Ok((passed, actual, format!("URL does not equal '{}'", expected)))
        }

        AssertionSpec::TitleContains { expected } => {
            let (passed, actual) = settle(wait, || {
                let title = driver.title()?;
                Ok((title.contains(expected.as_str()), Some(title)))
            })?;
            Ok((passed, actual, format!("Title does not contain '{}'", expected)))
        }

        AssertionSpec::TextPresent { expected } => {
            let needle = expected.to_lowercase();
            let (passed, actual) = settle(wait, || {
                let body = driver.body_text()?.to_lowercase();
                Ok((body.contains(&needle), Some(format!("(page text, {} chars)", body.len()))))
            })?;
            Ok((passed, actual, format!("Text '{}' not found on page", expected)))
        }

        AssertionSpec::TextAbsent { expected } => {
            let body = driver.body_text()?.to_lowercase();
            let passed = !body.contains(&expected.to_lowercase());
            Ok((
                passed,
                Some(format!("(page text, {} chars)", body.len())),
                format!("Text '{}' was found on page but should be absent", expected),
            ))
        }

        AssertionSpec::ElementText { selector, expected } => {
            let needle = expected.to_lowercase();
            let (passed, actual) = settle(wait, || {
                if driver.count(selector)? == 0 {
                    return Ok((false, None));
                }
                let text = driver.text_content(&ElementRef::first(selector.as_str()))?;
                let hit = text.as_deref().is_some_and(|t| t.to_lowercase().contains(&needle));
                Ok((hit, text))
            })?;
            let failure = match actual {
                Some(_) => format!("Element '{}' text does not contain '{}'", selector, expected),
                None => format!("Element '{}' not found on page", selector),
            };
            Ok((passed, actual, failure))
        }

        AssertionSpec::ElementVisible { selector, scroll } => {
            let (passed, actual) = settle(wait, || {
                if driver.count(selector)? == 0 {
                    return Ok((false, Some("absent".into())));
                }
                let el = ElementRef::first(selector.as_str());
                if *scroll {
                    driver.scroll_into_view(&el)?;
                }
                let visible = driver.is_visible(&el)?;
                Ok((visible, Some(visible.to_string())))
            })?;
            Ok((passed, actual, format!("Element '{}' is not visible", selector)))
        }

        AssertionSpec::ElementCount { selector, expected } => {
            let (passed, actual) = settle(wait, || {
                let count = driver.count(selector)?;
                Ok((count == *expected, Some(count.to_string())))
            })?;
            Ok((
                passed,
                actual.clone(),
                format!(
                    "Element '{}' count is {} but expected {}",
                    selector,
                    actual.unwrap_or_default(),
                    expected
                ),
            ))
        }

        AssertionSpec::ElementCountAtLeast { selector, min } => {
            let (passed, actual) = settle(wait, || {
                let count = driver.count(selector)?;
                Ok((count >= *min, Some(count.to_string())))
            })?;
            Ok((
                passed,
                actual,
                format!("Expected at least {} '{}' element(s)", min, selector),
            ))
        }

        AssertionSpec::LinkVisible { text } => {
            let selector = strategy::link_with_text(text);
            let (passed, actual) = settle(wait, || {
                let count = driver.count(&selector)?;
                if count == 0 {
                    return Ok((false, Some("absent".into())));
                }
                let visible = driver.is_visible(&ElementRef::first(selector.as_str()))?;
                Ok((visible, Some(format!("{} link(s), first visible: {}", count, visible))))
            })?;
            Ok((
                passed,
                actual,
                format!("Link containing '{}' missing or not visible", text),
            ))
        }

        AssertionSpec::ActiveStep { expected } => {
            let (passed, actual) = settle(wait, || {
                let step = progress::active_step(driver, &WaitOptions::immediate())?;
                Ok((step.as_deref() == Some(expected.as_str()), step))
            })?;
            Ok((
                passed,
                actual,
                format!("Active form step is not '{}'", expected),
            ))
        }

        AssertionSpec::AnchorReached { anchor } => {
            let name = anchor.trim_start_matches('#');
            let fragment = format!("#{}", name);
            let target = format!("[id='{}']", name);
            let (passed, actual) = settle(wait, || {
                let url = driver.current_url()?;
                if url.contains(&fragment) {
                    return Ok((true, Some(url)));
                }
                let shown = driver.count(&target)? > 0
                    && driver.is_visible(&ElementRef::first(target.as_str()))?;
                Ok((shown, Some(url)))
            })?;
            Ok((
                passed,
                actual,
                format!("Navigation did not reach '{}'", fragment),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeElement, FakeEvent, FakePage};

    fn wait() -> WaitOptions {
        WaitOptions::new(5).with_poll_interval(1)
    }

    #[test]
    fn scrolls_before_checking_visibility() {
        let mut page = FakePage::new().with("img.logo", FakeElement::visible());
        let spec = AssertionSpec::ElementVisible {
            selector: "img.logo".into(),
            scroll: true,
        };
        let result = evaluate(&spec, 0, &mut page, &wait());
        assert!(result.passed);
        assert!(matches!(page.events()[0], FakeEvent::Scroll(_)));
    }

    #[test]
    fn missing_link_names_the_text() {
        let mut page = FakePage::new();
        let spec = AssertionSpec::LinkVisible {
            text: "support@emonitor.ch".into(),
        };
        let result = evaluate(&spec, 3, &mut page, &wait());
        assert!(!result.passed);
        assert_eq!(result.step_index, 3);
        assert!(result.message.unwrap().contains("support@emonitor.ch"));
    }

    #[test]
    fn text_checks_ignore_case() {
        let mut page = FakePage::new().with_body("Willkommen in MOSTAR");
        let present = AssertionSpec::TextPresent {
            expected: "Mostar".into(),
        };
        let absent = AssertionSpec::TextAbsent {
            expected: "error".into(),
        };
        let results = evaluate_all(&[present, absent], 0, &mut page, &wait());
        assert!(results.iter().all(|r| r.passed));
    }
}
