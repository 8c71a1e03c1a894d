use form_harness::browser::{
    driver::{ElementRef, PageDriver, xpath},
    fake::{FakeElement, FakeEvent, FakePage},
    session::{BrowserOptions, BrowserRequest, BrowserResponse},
};

// =========================================================================
// BrowserRequest serialization
// =========================================================================

#[test]
fn browser_request_navigate_serializes_correctly() {
    let req = BrowserRequest::navigate("https://example.com");
    let json: serde_json::Value = serde_json::to_value(&req).unwrap();
    assert_eq!(json["cmd"], "navigate");
    assert_eq!(json["url"], "https://example.com");
}

#[test]
fn browser_request_count_serializes_correctly() {
    let req = BrowserRequest::count("xpath=//div[@id='people']");
    let json: serde_json::Value = serde_json::to_value(&req).unwrap();
    assert_eq!(json["cmd"], "count");
    assert_eq!(json["selector"], "xpath=//div[@id='people']");
    assert!(json.get("nth").is_none());
}

#[test]
fn browser_request_element_carries_nth() {
    let element = ElementRef::new("input[type='file']", 2);
    let json: serde_json::Value =
        serde_json::to_value(BrowserRequest::element("click_popup", &element)).unwrap();
    assert_eq!(json["cmd"], "click_popup");
    assert_eq!(json["selector"], "input[type='file']");
    assert_eq!(json["nth"], 2);
}

#[test]
fn browser_request_fill_serializes_value() {
    let element = ElementRef::first("#email");
    let json: serde_json::Value =
        serde_json::to_value(BrowserRequest::element_value("fill", &element, "a@b.ch")).unwrap();
    assert_eq!(json["cmd"], "fill");
    assert_eq!(json["nth"], 0);
    assert_eq!(json["value"], "a@b.ch");
}

#[test]
fn browser_request_attribute_and_files() {
    let element = ElementRef::first("li.radio-list-item");
    let json: serde_json::Value =
        serde_json::to_value(BrowserRequest::attribute(&element, "class")).unwrap();
    assert_eq!(json["cmd"], "attribute");
    assert_eq!(json["name"], "class");

    let upload = ElementRef::first("input[type='file']");
    let json: serde_json::Value =
        serde_json::to_value(BrowserRequest::set_files(&upload, std::path::Path::new("/tmp/id.pdf")))
            .unwrap();
    assert_eq!(json["cmd"], "set_files");
    assert_eq!(json["path"], "/tmp/id.pdf");
}

#[test]
fn browser_request_page_commands() {
    let json: serde_json::Value = serde_json::to_value(BrowserRequest::page("quit")).unwrap();
    assert_eq!(json, serde_json::json!({"cmd": "quit"}));

    let json: serde_json::Value = serde_json::to_value(BrowserRequest::pause(250)).unwrap();
    assert_eq!(json["cmd"], "pause");
    assert_eq!(json["duration_ms"], 250);
}

// =========================================================================
// BrowserResponse deserialization
// =========================================================================

#[test]
fn browser_response_deserializes_ready_signal() {
    let resp: BrowserResponse = serde_json::from_str(r#"{"ok":true,"ready":true}"#).unwrap();
    assert!(resp.ok);
    assert_eq!(resp.ready, Some(true));
}

#[test]
fn browser_response_deserializes_error() {
    let resp: BrowserResponse =
        serde_json::from_str(r#"{"ok":false,"error":"Timeout 5000ms exceeded"}"#).unwrap();
    assert!(!resp.ok);
    assert_eq!(resp.error.as_deref(), Some("Timeout 5000ms exceeded"));
}

#[test]
fn browser_response_with_query_fields() {
    let resp: BrowserResponse =
        serde_json::from_str(r#"{"ok":true,"count":3,"visible":true,"text":null}"#).unwrap();
    assert_eq!(resp.count, Some(3));
    assert_eq!(resp.visible, Some(true));
    assert_eq!(resp.text, None);
    assert_eq!(resp.checked, None);
}

#[test]
fn browser_options_default_to_headless_adapter() {
    let options = BrowserOptions::default();
    assert!(options.headless);
    assert_eq!(options.slow_mo_ms, 0);
    assert!(options.server_script.ends_with("browser_server.js"));
}

#[test]
fn xpath_prefix() {
    assert_eq!(xpath("//button"), "xpath=//button");
}

// =========================================================================
// FakePage as a PageDriver
// =========================================================================

#[test]
fn fake_page_records_events_in_order() {
    let mut page = FakePage::new()
        .with("#name", FakeElement::visible())
        .with("#ok", FakeElement::visible());
    let driver: &mut dyn PageDriver = &mut page;

    driver.navigate("https://tenant.example/").unwrap();
    driver.fill(&ElementRef::first("#name"), "Muster").unwrap();
    driver.click(&ElementRef::first("#ok")).unwrap();
    driver.quit().unwrap();
    driver.quit().unwrap();

    assert_eq!(
        page.events(),
        &[
            FakeEvent::Navigate("https://tenant.example/".into()),
            FakeEvent::Fill(ElementRef::first("#name"), "Muster".into()),
            FakeEvent::Click(ElementRef::first("#ok")),
            FakeEvent::Quit,
        ]
    );
    assert!(page.is_closed());
}

#[test]
fn fake_page_follows_popup_once() {
    let mut page = FakePage::new()
        .with("a.apply", FakeElement::visible())
        .with_popup("https://portal.example/apply");

    page.click_and_follow_popup(&ElementRef::first("a.apply")).unwrap();
    assert_eq!(page.current_url().unwrap(), "https://portal.example/apply");
}

#[test]
fn fake_page_queries_by_index() {
    let mut page = FakePage::new()
        .with("li", FakeElement::with_text("Ledig"))
        .with("li", FakeElement::hidden())
        .with("li", FakeElement::with_text("Verheiratet").class("selected"));

    assert_eq!(page.count("li").unwrap(), 3);
    assert!(!page.is_visible(&ElementRef::new("li", 1)).unwrap());
    assert_eq!(
        page.text_content(&ElementRef::new("li", 2)).unwrap().as_deref(),
        Some("Verheiratet")
    );
    assert_eq!(
        page.attribute(&ElementRef::new("li", 2), "class").unwrap().as_deref(),
        Some("selected")
    );
    assert!(!page.is_visible(&ElementRef::new("li", 7)).unwrap());
}

#[test]
fn fake_page_script_writes_update_value() {
    let mut page = FakePage::new().with("#birthdate", FakeElement::visible());
    let el = ElementRef::first("#birthdate");
    page.set_value_by_script(&el, "01.02.1990").unwrap();
    assert_eq!(page.input_value(&el).unwrap(), "01.02.1990");
}
