use tracing::{debug, warn};

use crate::actions::{ActionOutcome, FieldActions};
use crate::browser::driver::ElementRef;
use crate::error::{HarnessError, Result};
use crate::locator::{FieldReference, strategy};
use crate::wait::{WaitOptions, poll_until};

/// Index of the option matching `wanted`: an exact case-insensitive match
/// first, then the first option containing it.
pub fn match_option(options: &[String], wanted: &str) -> Option<usize> {
    let wanted = wanted.trim().to_lowercase();
    let normalized: Vec<String> = options.iter().map(|o| o.trim().to_lowercase()).collect();
    normalized
        .iter()
        .position(|o| *o == wanted)
        .or_else(|| normalized.iter().position(|o| o.contains(&wanted)))
}

impl FieldActions<'_> {
    /// Open a dropdown and click the option matching `option`.
    pub fn select_dropdown_option(&mut self, field: &FieldReference, option: &str) -> Result<ActionOutcome> {
        let control = self.locate(field)?;
        self.driver.click(&control)?;

        let wait = self.config.wait();
        let opened = {
            let driver = &mut *self.driver;
            poll_until(&wait, || {
                Ok((driver.count(strategy::DROPDOWN_OPTIONS)? > 0).then_some(()))
            })?
        };
        if opened.is_none() {
            return Err(HarnessError::NoOptions {
                field: field.label.clone(),
            });
        }

        let (elements, texts) = self.visible_options()?;
        if let Some(i) = match_option(&texts, option) {
            self.driver.click(&elements[i])?;
            debug!(field = %field, option = %texts[i], "selected");
            return Ok(ActionOutcome::Selected {
                option: texts[i].clone(),
            });
        }

        if elements.is_empty() {
            return Err(HarnessError::NoOptions {
                field: field.label.clone(),
            });
        }
        if self.config.strict_options {
            return Err(HarnessError::OptionNotFound {
                field: field.label.clone(),
                option: option.to_string(),
            });
        }
        warn!(field = %field, requested = option, fallback = %texts[0], "option not found, taking the first one");
        self.driver.click(&elements[0])?;
        Ok(ActionOutcome::FallbackSelected {
            requested: option.to_string(),
            option: texts[0].clone(),
        })
    }

    /// Type into a searchable dropdown and pick the filtered option.
    pub fn select_search_option(&mut self, field: &FieldReference, query: &str) -> Result<ActionOutcome> {
        let control = self.locate(field)?;
        self.driver.click(&control)?;

        let search = strategy::select_search_input(&control);
        let input = self.wait_visible(&search)?.unwrap_or(control);
        self.driver.fill(&input, query)?;

        let wait = self.config.wait();
        let hit = self.find_option(query, &wait)?;
        if let Some((element, text)) = hit {
            self.driver.click(&element)?;
            debug!(field = %field, option = %text, "selected from search");
            return Ok(ActionOutcome::Selected { option: text });
        }

        if self.config.strict_options {
            return Err(HarnessError::OptionNotFound {
                field: field.label.clone(),
                option: query.to_string(),
            });
        }
        warn!(field = %field, query, "no search result, pressing Enter");
        self.driver.press(&input, "Enter")?;
        Ok(ActionOutcome::EnterPressed {
            query: query.to_string(),
        })
    }

    /// Click a radio option unless it is already the selected one.
    pub fn select_radio_option(&mut self, field: &FieldReference, option: &str) -> Result<ActionOutcome> {
        let container = self.locate(field)?;
        let selector = strategy::radio_option(&container, option);
        let Some(item) = self.wait_visible(&selector)? else {
            return Err(HarnessError::OptionNotFound {
                field: field.label.clone(),
                option: option.to_string(),
            });
        };

        let class = self.driver.attribute(&item, "class")?.unwrap_or_default();
        if class.split_whitespace().any(|c| c == strategy::SELECTED_CLASS) {
            debug!(field = %field, option, "radio already selected");
            return Ok(ActionOutcome::AlreadySelected {
                option: option.to_string(),
            });
        }
        self.driver.click(&item)?;
        Ok(ActionOutcome::Selected {
            option: option.to_string(),
        })
    }

    fn visible_options(&mut self) -> Result<(Vec<ElementRef>, Vec<String>)> {
        let count = self.driver.count(strategy::DROPDOWN_OPTIONS)?;
        let mut elements = Vec::with_capacity(count);
        let mut texts = Vec::with_capacity(count);
        for i in 0..count {
            let el = ElementRef::new(strategy::DROPDOWN_OPTIONS, i);
            if !self.driver.is_visible(&el)? {
                continue;
            }
            texts.push(self.driver.text_content(&el)?.unwrap_or_default().trim().to_string());
            elements.push(el);
        }
        Ok((elements, texts))
    }

    fn find_option(&mut self, wanted: &str, wait: &WaitOptions) -> Result<Option<(ElementRef, String)>> {
        poll_until(wait, || {
            let (elements, texts) = self.visible_options()?;
            Ok(match_option(&texts, wanted).map(|i| (elements[i].clone(), texts[i].clone())))
        })
    }
}
