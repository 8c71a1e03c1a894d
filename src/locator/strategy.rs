//! Label-relative selector strategies for the application form's widget library.
//!
//! Every widget renders as a wrapper `div` (`mdt-input`, `mdt-select`,
//! `mdt-radio-list`, ...) holding its label text and the interactive control.
//! Strategies find the wrapper by label, then descend to the control.

use crate::browser::driver::{ElementRef, xpath};
use crate::locator::{FieldReference, Scope, WidgetKind};

pub const DROPDOWN_OPTIONS: &str =
    "xpath=//ul[contains(@class, 'select-dropdown-items-wrapper')]//li[contains(@class, 'dropdown-item')]";

pub const DATEPICKER_WRAPPER: &str = "xpath=//div[contains(@class, 'datepicker-wrapper')]";
pub const DATEPICKER_HEADER: &str = "xpath=//div[contains(@class, 'datepicker-current-date')]";
pub const DATEPICKER_PREV: &str = "xpath=//div[contains(@class, 'months-buttons')]/div[1]";
pub const DATEPICKER_NEXT: &str = "xpath=//div[contains(@class, 'months-buttons')]/div[2]";

pub const PHONE_COUNTRY_LIST: &str = "xpath=//ul[contains(@class, 'iti__country-list')]";

pub const CREATE_ADULT: &str =
    "xpath=//div[contains(@class, 'create-adult')]//i[contains(@class, 'fa-plus-circle')]";
pub const PERSON_CARD: &str = "div.person-card";
pub const MODAL_FOOTER: &str = "div.modal-footer";
pub const MODAL_CONFIRM: &str = "div.modal-footer div.btn.confirm-button.btn-danger";

pub const NUMBER_INPUTS: &str = ".mdt-number-incrementer input[type='number']";

pub const ACTIVE_STEP: &str = ".af-steps .af-position.active";
pub const SAVE_AND_NEXT: &str = "div.btn-next";
pub const DISABLED_CLASS: &str = "btn-disabled";
pub const SELECTED_CLASS: &str = "selected";

/// Quote a string as an XPath literal, splitting on quotes when it holds both kinds.
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{}'", s)
    } else if !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Wrapper `div` expression for kinds that have one.
fn container(kind: WidgetKind, label: &str) -> Option<String> {
    let l = xpath_literal(label);
    let expr = match kind {
        WidgetKind::Text | WidgetKind::DatePicker => {
            format!("//div[contains(@class, 'mdt-input') and .//span[contains(text(), {l})]]")
        }
        WidgetKind::Textarea => {
            format!("//div[contains(@class, 'mdt-textarea') and .//div[contains(text(), {l})]]")
        }
        WidgetKind::Select => {
            format!("//div[contains(@class, 'mdt-select') and .//span[contains(text(), {l})]]")
        }
        WidgetKind::RadioList => {
            format!("//div[contains(@class, 'mdt-radio-list') and .//div[contains(text(), {l})]]")
        }
        WidgetKind::PhoneNumber => format!(
            "//div[contains(@class, 'mdt-phone-number-input') and .//span[contains(text(), {l})]]"
        ),
        WidgetKind::FileUpload => {
            format!("//div[contains(@class, 'mdt-file-single') and .//span[contains(text(), {l})]]")
        }
        WidgetKind::Number => format!(
            "//div[contains(@class, 'mdt-number-incrementer') and .//span[contains(text(), {l})]]"
        ),
        WidgetKind::Checkbox => return None,
    };
    Some(expr)
}

/// Part of the wrapper that is the actual control.
fn control_suffix(kind: WidgetKind) -> &'static str {
    match kind {
        WidgetKind::Text | WidgetKind::DatePicker | WidgetKind::Select => "//input",
        WidgetKind::Textarea => "//textarea",
        WidgetKind::FileUpload => "//input[@type='file']",
        WidgetKind::Number => "//input[@type='number']",
        WidgetKind::RadioList | WidgetKind::PhoneNumber | WidgetKind::Checkbox => "",
    }
}

fn scope_prefix(scope: &Scope) -> String {
    match scope {
        Scope::Page => String::new(),
        Scope::Section(title) => format!(
            "//*[self::h1 or self::h2 or self::h3 or self::h4][contains(normalize-space(.), {})]/ancestor::div[1]",
            xpath_literal(title)
        ),
    }
}

fn checkbox_expr(label: &str) -> String {
    let l = xpath_literal(label);
    format!(
        "//label[contains(normalize-space(.), {l})]//input[@type='checkbox'] | //input[@type='checkbox'][@id=//label[contains(normalize-space(.), {l})]/@for]"
    )
}

/// Whether `nth` is applied by wrapping the container expression
/// (as opposed to indexing the final matches).
pub fn indexes_container(field: &FieldReference) -> bool {
    field.selector.is_none() && container(field.kind, &field.label).is_some()
}

/// Candidate selectors for the field's control, most specific first.
pub fn control_selectors(field: &FieldReference) -> Vec<String> {
    if let Some(raw) = &field.selector {
        return vec![raw.clone()];
    }
    let prefix = scope_prefix(&field.scope);
    let mut containers = Vec::new();
    if let Some(c) = container(field.kind, &field.label) {
        containers.push(c);
    }
    if field.kind == WidgetKind::Select {
        containers.push(format!(
            "//div[contains(@class, 'mdt-select') and .//label[contains(text(), {})]]",
            xpath_literal(&field.label)
        ));
    }

    if containers.is_empty() {
        let expr = checkbox_expr(&field.label);
        return vec![xpath(if prefix.is_empty() {
            expr
        } else {
            // scope each side of the union
            expr.split(" | ")
                .map(|side| format!("{prefix}{side}"))
                .collect::<Vec<_>>()
                .join(" | ")
        })];
    }

    containers
        .into_iter()
        .map(|c| {
            let scoped = format!("{prefix}{c}");
            let wrapped = match field.nth {
                Some(n) => format!("({})[{}]", scoped, n + 1),
                None => scoped,
            };
            xpath(format!("{}{}", wrapped, control_suffix(field.kind)))
        })
        .collect()
}

/// Selector for a descendant of an already resolved element.
pub fn within(element: &ElementRef, suffix: &str) -> String {
    match element.selector.strip_prefix("xpath=") {
        Some(raw) => xpath(format!("({})[{}]{}", raw, element.nth + 1, suffix)),
        None => format!("{} >> nth={} >> xpath=.{}", element.selector, element.nth, suffix),
    }
}

pub fn radio_option(container: &ElementRef, option: &str) -> String {
    let o = xpath_literal(option);
    within(
        container,
        &format!("//li[@title={o} or normalize-space(text())={o}]"),
    )
}

/// `increment` or `decrement` button beside a number input.
pub fn number_step(input: &ElementRef, button: &str) -> String {
    within(input, &format!("/../div[@id={}]", xpath_literal(button)))
}

/// Search box of a searchable dropdown.
pub fn select_search_input(control: &ElementRef) -> String {
    within(control, "/ancestor::div[contains(@class, 'mdt-select')][1]//input[@placeholder]")
}

pub fn day_cell(day: u32) -> String {
    xpath(format!("//td[normalize-space(text())='{}']", day))
}

pub fn phone_flag(container: &ElementRef) -> String {
    within(container, "//div[contains(@class, 'iti__selected-flag')]")
}

pub fn phone_input(container: &ElementRef) -> String {
    within(container, "//input[contains(@class, 'text-cut')]")
}

pub fn phone_country_option(dial_code: &str) -> String {
    xpath(format!(
        "//ul[contains(@class, 'iti__country-list')]//li[@data-dial-code={}]",
        xpath_literal(dial_code)
    ))
}

/// Delete icon of an existing upload, next to the file input.
pub fn file_delete(file_input: &ElementRef) -> String {
    within(
        file_input,
        "/ancestor::div[contains(@class, 'mdt-file-single')][1]//i[contains(@class, 'icon-delete')]",
    )
}

pub fn person_card(index: usize) -> String {
    format!("div.person-card[person-key='{}']", index)
}

pub fn person_card_trash(index: usize) -> String {
    format!("{} div.actions i.fa-trash-can", person_card(index))
}

/// Visible element whose text is exactly `text`, for buttons and links
/// that have no stable class.
pub fn exact_text(text: &str) -> String {
    xpath(format!(
        "//*[normalize-space(text())={}]",
        xpath_literal(text)
    ))
}

pub fn link_with_text(text: &str) -> String {
    xpath(format!("//a[contains(., {})]", xpath_literal(text)))
}
