#![allow(dead_code)]

use form_harness::actions::ActionConfig;
use form_harness::browser::fake::{FakeElement, FakePage};
use form_harness::locator::{FieldReference, strategy};

/// Short waits so negative paths fail fast.
pub fn fast_config() -> ActionConfig {
    ActionConfig::default().with_wait(20, 1)
}

/// The concrete selector the locator will try first for `field`.
pub fn control(field: &FieldReference) -> String {
    strategy::control_selectors(field).remove(0)
}

/// Add a visible, empty control for `field`.
pub fn add_control(page: &mut FakePage, field: &FieldReference) -> String {
    let selector = control(field);
    page.insert(&selector, FakeElement::visible());
    selector
}

/// Add a radio list for `field` with one visible item per option.
pub fn add_radio(page: &mut FakePage, field: &FieldReference, options: &[&str]) -> Vec<String> {
    let container = add_control(page, field);
    let container = form_harness::browser::driver::ElementRef::first(container);
    options
        .iter()
        .map(|o| {
            let item = strategy::radio_option(&container, o);
            page.insert(&item, FakeElement::with_text(o).class("radio-list-item"));
            let selected = item.clone();
            page.on_click(&item, 0, move |dom| dom.add_class(&selected, 0, strategy::SELECTED_CLASS));
            item
        })
        .collect()
}

/// A form page showing step `step` with an enabled "Save and next" that
/// moves the indicator one step forward.
pub fn form_page(step: u32) -> FakePage {
    let mut page = FakePage::new()
        .with(strategy::ACTIVE_STEP, FakeElement::with_text(&step.to_string()))
        .with(strategy::SAVE_AND_NEXT, FakeElement::visible().class("btn btn-next"));
    let mut current = step;
    page.on_click(strategy::SAVE_AND_NEXT, 0, move |dom| {
        current += 1;
        dom.set_text(strategy::ACTIVE_STEP, 0, &current.to_string());
    });
    page
}
