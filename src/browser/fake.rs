use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::browser::driver::{ElementRef, PageDriver};
use crate::error::{HarnessError, Result};

/// One element of the scripted page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeElement {
    pub text: Option<String>,
    pub value: String,
    pub visible: bool,
    pub checked: bool,
    pub attributes: HashMap<String, String>,
    /// Number of upcoming script writes this element silently drops.
    pub rejected_script_writes: u32,
    /// Number of upcoming fills this element silently drops.
    pub rejected_fills: u32,
}

impl FakeElement {
    pub fn visible() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::visible()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.attributes.insert("class".into(), class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }
}

/// The mutable document hooks operate on.
#[derive(Debug, Default)]
pub struct FakeDom {
    pub url: String,
    pub title: String,
    pub body: String,
    elements: HashMap<String, Vec<FakeElement>>,
}

impl FakeDom {
    pub fn set(&mut self, selector: &str, elements: Vec<FakeElement>) {
        self.elements.insert(selector.to_string(), elements);
    }

    pub fn push(&mut self, selector: &str, element: FakeElement) {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(element);
    }

    pub fn remove(&mut self, selector: &str) {
        self.elements.remove(selector);
    }

    pub fn all(&self, selector: &str) -> &[FakeElement] {
        self.elements.get(selector).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, selector: &str, nth: usize) -> Option<&FakeElement> {
        self.elements.get(selector).and_then(|v| v.get(nth))
    }

    pub fn get_mut(&mut self, selector: &str, nth: usize) -> Option<&mut FakeElement> {
        self.elements.get_mut(selector).and_then(|v| v.get_mut(nth))
    }

    pub fn set_text(&mut self, selector: &str, nth: usize, text: &str) {
        if let Some(el) = self.get_mut(selector, nth) {
            el.text = Some(text.to_string());
        }
    }

    pub fn set_value(&mut self, selector: &str, nth: usize, value: &str) {
        if let Some(el) = self.get_mut(selector, nth) {
            el.value = value.to_string();
        }
    }

    pub fn add_class(&mut self, selector: &str, nth: usize, class: &str) {
        if let Some(el) = self.get_mut(selector, nth) {
            let entry = el.attributes.entry("class".into()).or_default();
            if !entry.split_whitespace().any(|c| c == class) {
                if !entry.is_empty() {
                    entry.push(' ');
                }
                entry.push_str(class);
            }
        }
    }

    pub fn set_visible(&mut self, selector: &str, visible: bool) {
        if let Some(els) = self.elements.get_mut(selector) {
            for el in els {
                el.visible = visible;
            }
        }
    }
}

/// Recorded interaction, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeEvent {
    Navigate(String),
    Click(ElementRef),
    FollowPopup(ElementRef),
    Fill(ElementRef, String),
    Check(ElementRef),
    Hover(ElementRef),
    Press(ElementRef, String),
    Scroll(ElementRef),
    SetFiles(ElementRef, PathBuf),
    SetValue(ElementRef, String),
    Pause(u64),
    Screenshot(String),
    Quit,
}

type Hook = Box<dyn FnMut(&mut FakeDom)>;

/// Scripted in-memory page implementing [`PageDriver`].
///
/// Elements are keyed by the exact selector string the harness asks for.
/// Click hooks let a test model page reactions (options opening, calendar
/// paging, modals appearing).
#[derive(Default)]
pub struct FakePage {
    pub dom: FakeDom,
    click_hooks: HashMap<ElementRef, Vec<Hook>>,
    popup_url: Option<String>,
    events: Vec<FakeEvent>,
    closed: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.dom.title = title.to_string();
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.dom.body = body.to_string();
        self
    }

    pub fn with(mut self, selector: &str, element: FakeElement) -> Self {
        self.dom.push(selector, element);
        self
    }

    pub fn with_popup(mut self, url: &str) -> Self {
        self.popup_url = Some(url.to_string());
        self
    }

    pub fn insert(&mut self, selector: &str, element: FakeElement) {
        self.dom.push(selector, element);
    }

    /// Run `hook` every time element `nth` of `selector` is clicked.
    pub fn on_click<F>(&mut self, selector: &str, nth: usize, hook: F)
    where
        F: FnMut(&mut FakeDom) + 'static,
    {
        self.click_hooks
            .entry(ElementRef::new(selector, nth))
            .or_default()
            .push(Box::new(hook));
    }

    pub fn events(&self) -> &[FakeEvent] {
        &self.events
    }

    pub fn clicks_on(&self, selector: &str) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, FakeEvent::Click(el) if el.selector == selector))
            .count()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                FakeEvent::Fill(el, v) => Some((el.selector.clone(), v.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn element(&self, element: &ElementRef) -> Result<&FakeElement> {
        self.dom
            .get(&element.selector, element.nth)
            .ok_or_else(|| missing(element))
    }

    fn element_mut(&mut self, element: &ElementRef) -> Result<&mut FakeElement> {
        self.dom
            .get_mut(&element.selector, element.nth)
            .ok_or_else(|| missing(element))
    }

    fn run_click_hooks(&mut self, element: &ElementRef) {
        if let Some(mut hooks) = self.click_hooks.remove(element) {
            for hook in hooks.iter_mut() {
                hook(&mut self.dom);
            }
            self.click_hooks.insert(element.clone(), hooks);
        }
    }
}

fn missing(element: &ElementRef) -> HarnessError {
    HarnessError::SessionProtocol {
        command: "locate".into(),
        error: format!("no element for {}", element),
    }
}

impl PageDriver for FakePage {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.dom.url = url.to_string();
        self.events.push(FakeEvent::Navigate(url.to_string()));
        Ok(())
    }

    fn current_url(&mut self) -> Result<String> {
        Ok(self.dom.url.clone())
    }

    fn title(&mut self) -> Result<String> {
        Ok(self.dom.title.clone())
    }

    fn body_text(&mut self) -> Result<String> {
        Ok(self.dom.body.clone())
    }

    fn count(&mut self, selector: &str) -> Result<usize> {
        Ok(self.dom.all(selector).len())
    }

    fn is_visible(&mut self, element: &ElementRef) -> Result<bool> {
        Ok(self
            .dom
            .get(&element.selector, element.nth)
            .is_some_and(|e| e.visible))
    }

    fn text_content(&mut self, element: &ElementRef) -> Result<Option<String>> {
        Ok(self
            .dom
            .get(&element.selector, element.nth)
            .and_then(|e| e.text.clone()))
    }

    fn attribute(&mut self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        Ok(self
            .dom
            .get(&element.selector, element.nth)
            .and_then(|e| e.attributes.get(name).cloned()))
    }

    fn input_value(&mut self, element: &ElementRef) -> Result<String> {
        Ok(self.element(element)?.value.clone())
    }

    fn is_checked(&mut self, element: &ElementRef) -> Result<bool> {
        Ok(self.element(element)?.checked)
    }

    fn click(&mut self, element: &ElementRef) -> Result<()> {
        self.element(element)?;
        self.events.push(FakeEvent::Click(element.clone()));
        self.run_click_hooks(element);
        Ok(())
    }

    fn click_and_follow_popup(&mut self, element: &ElementRef) -> Result<()> {
        self.element(element)?;
        self.events.push(FakeEvent::FollowPopup(element.clone()));
        self.run_click_hooks(element);
        if let Some(url) = self.popup_url.take() {
            self.dom.url = url;
        }
        Ok(())
    }

    fn fill(&mut self, element: &ElementRef, value: &str) -> Result<()> {
        let el = self.element_mut(element)?;
        if el.rejected_fills > 0 {
            el.rejected_fills -= 1;
        } else {
            el.value = value.to_string();
        }
        self.events
            .push(FakeEvent::Fill(element.clone(), value.to_string()));
        Ok(())
    }

    fn check(&mut self, element: &ElementRef) -> Result<()> {
        self.element_mut(element)?.checked = true;
        self.events.push(FakeEvent::Check(element.clone()));
        Ok(())
    }

    fn hover(&mut self, element: &ElementRef) -> Result<()> {
        self.element(element)?;
        self.events.push(FakeEvent::Hover(element.clone()));
        Ok(())
    }

    fn press(&mut self, element: &ElementRef, key: &str) -> Result<()> {
        self.element(element)?;
        self.events
            .push(FakeEvent::Press(element.clone(), key.to_string()));
        Ok(())
    }

    fn scroll_into_view(&mut self, element: &ElementRef) -> Result<()> {
        self.element(element)?;
        self.events.push(FakeEvent::Scroll(element.clone()));
        Ok(())
    }

    fn set_input_files(&mut self, element: &ElementRef, path: &Path) -> Result<()> {
        self.element_mut(element)?.value = path.display().to_string();
        self.events
            .push(FakeEvent::SetFiles(element.clone(), path.to_path_buf()));
        Ok(())
    }

    fn set_value_by_script(&mut self, element: &ElementRef, value: &str) -> Result<()> {
        let el = self.element_mut(element)?;
        if el.rejected_script_writes > 0 {
            el.rejected_script_writes -= 1;
        } else {
            el.value = value.to_string();
        }
        self.events
            .push(FakeEvent::SetValue(element.clone(), value.to_string()));
        Ok(())
    }

    fn pause(&mut self, ms: u64) -> Result<()> {
        self.events.push(FakeEvent::Pause(ms));
        Ok(())
    }

    fn screenshot(&mut self, path: &str) -> Result<()> {
        self.events.push(FakeEvent::Screenshot(path.to_string()));
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.events.push(FakeEvent::Quit);
        }
        Ok(())
    }
}
