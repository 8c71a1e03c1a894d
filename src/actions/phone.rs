use serde::Serialize;
use tracing::{debug, info};

use crate::actions::{ActionOutcome, FieldActions};
use crate::error::{HarnessError, Result};
use crate::locator::{FieldReference, strategy};

/// Digit-grouping mask for one dialing code; `X` stands for a digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhoneTemplate {
    pub dial_code: &'static str,
    pub country: &'static str,
    pub mask: &'static str,
}

pub const PHONE_TEMPLATES: &[PhoneTemplate] = &[
    PhoneTemplate {
        dial_code: "41",
        country: "CH",
        mask: "XX XXX XX XX",
    },
    PhoneTemplate {
        dial_code: "49",
        country: "DE",
        mask: "XXXX XXXXXXX",
    },
    PhoneTemplate {
        dial_code: "33",
        country: "FR",
        mask: "X XX XX XX XX",
    },
    PhoneTemplate {
        dial_code: "385",
        country: "HR",
        mask: "XX XXX XXXX",
    },
    PhoneTemplate {
        dial_code: "1",
        country: "US",
        mask: "(XXX) XXX-XXXX",
    },
];

pub fn template_for(dial_code: &str) -> Option<&'static PhoneTemplate> {
    let code = dial_code.trim().trim_start_matches('+');
    PHONE_TEMPLATES.iter().find(|t| t.dial_code == code)
}

/// Group `digits` by the country's mask.
///
/// Literal mask characters are only written while digits remain, and digits
/// beyond the mask are appended as-is. Unknown codes return the input unchanged.
pub fn format_phone_number(dial_code: &str, digits: &str) -> String {
    let Some(template) = template_for(dial_code) else {
        return digits.to_string();
    };
    let mut remaining = digits.chars().filter(char::is_ascii_digit).peekable();
    let mut out = String::with_capacity(template.mask.len());
    for c in template.mask.chars() {
        if remaining.peek().is_none() {
            break;
        }
        match c {
            'X' => out.extend(remaining.next()),
            literal => out.push(literal),
        }
    }
    out.extend(remaining);
    out
}

impl FieldActions<'_> {
    /// Choose the dialing code in the country list, then type the grouped number.
    pub fn fill_phone_number(&mut self, field: &FieldReference, dial_code: &str, digits: &str) -> Result<ActionOutcome> {
        let code = dial_code.trim().trim_start_matches('+');
        let container = self.locate(field)?;

        let flag = strategy::phone_flag(&container);
        match self.wait_visible(&flag)? {
            Some(el) => self.driver.click(&el)?,
            None => {
                return Err(HarnessError::FieldNotFound {
                    label: format!("{} (country flag)", field.label),
                    kind: field.kind,
                    timeout_ms: self.config.timeout_ms,
                });
            }
        }

        let Some(option) = self.wait_visible(&strategy::phone_country_option(code))? else {
            return Err(HarnessError::OptionNotFound {
                field: field.label.clone(),
                option: format!("+{}", code),
            });
        };
        self.driver.click(&option)?;
        debug!(field = %field, code, "dial code selected");

        let formatted = format_phone_number(code, digits);
        if template_for(code).is_none() {
            info!(code, "no phone template, using raw digits");
        }
        let input = strategy::phone_input(&container);
        let Some(input) = self.wait_visible(&input)? else {
            return Err(HarnessError::FieldNotFound {
                label: field.label.clone(),
                kind: field.kind,
                timeout_ms: self.config.timeout_ms,
            });
        };
        self.fill_verified(field, &input, &formatted)?;
        Ok(ActionOutcome::PhoneFilled { formatted })
    }
}
