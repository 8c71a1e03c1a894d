use form_harness::actions::FieldValue;
use form_harness::browser::driver::PageDriver;
use form_harness::browser::fake::{FakeElement, FakeEvent, FakePage};
use form_harness::cli::commands::load_specs;
use form_harness::fixture::FixtureData;
use form_harness::locator::{FieldReference, strategy};
use form_harness::scenario::application::{self, ScenarioParams};
use form_harness::scenario::step_model::{ScenarioStep, StepEntry};
use form_harness::spec::runner::TestRunner;
use form_harness::spec::spec_model::{AssertionSpec, TestSpec, TestStep};
use form_harness::trace::logger::TraceLogger;

use crate::common::{add_control, fast_config, form_page};

mod common;

const SPEC_YAML: &str = r##"
name: household step
start_url: /form/application/new?lang=en
steps:
  - action: click_element
    selector: "#start-application-btn"
  - action: form
    name: wishes
    entries:
      - field: {label: Car ownership justification, kind: text, value: {text: Company car}, required: false}
    after: [save_and_next]
  - action: expect_step
    expected: "2"
  - action: assert
    assertions:
      - type: active_step
        expected: "2"
      - type: element_visible
        selector: img.logo
        scroll: true
"##;

fn runner() -> TestRunner {
    TestRunner::new(fast_config()).with_base_url("https://demo.example/")
}

fn homepage() -> FakePage {
    let mut page = FakePage::new()
        .with_title("Mostar Demo")
        .with_body("Willkommen in Mostar")
        .with("img", FakeElement::visible())
        .with("button", FakeElement::visible())
        .with("a[href='#wohnen']", FakeElement::visible());
    page.on_click("a[href='#wohnen']", 0, |dom| dom.url.push_str("#wohnen"));
    page
}

// =========================================================================
// YAML specs
// =========================================================================

#[test]
fn yaml_spec_parses_form_and_assertion_steps() {
    let spec: TestSpec = serde_yaml::from_str(SPEC_YAML).unwrap();
    assert_eq!(spec.steps.len(), 4);

    let TestStep::Form(form) = &spec.steps[1] else {
        panic!("expected a form step, got {:?}", spec.steps[1]);
    };
    assert_eq!(form.name, "wishes");
    assert!(matches!(&form.entries[0], StepEntry::Field(f) if !f.required));

    assert!(matches!(
        &spec.steps[3],
        TestStep::Assert { assertions } if assertions[1] == AssertionSpec::ElementVisible {
            selector: "img.logo".into(),
            scroll: true,
        }
    ));
}

#[test]
fn load_specs_reads_directory_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    for (file, name) in [("b.yaml", "zeta"), ("a.yml", "alpha"), ("notes.txt", "ignored")] {
        let body = format!("name: {}\nstart_url: /\nsteps: []\n", name);
        std::fs::write(dir.path().join(file), body).unwrap();
    }

    let specs = load_specs(dir.path().to_str().unwrap()).unwrap();
    let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["alpha", "zeta"]);
}

// =========================================================================
// Runner
// =========================================================================

#[test]
fn runs_yaml_spec_against_form_page() {
    let spec: TestSpec = serde_yaml::from_str(SPEC_YAML).unwrap();
    let mut page = form_page(1)
        .with("#start-application-btn", FakeElement::visible())
        .with("img.logo", FakeElement::visible());
    add_control(&mut page, &FieldReference::text("Car ownership justification"));

    let result = runner().run(&spec, &mut page, &FixtureData::with_seed(1), &TraceLogger::disabled());

    assert!(result.passed, "{:?}", result);
    assert_eq!(result.steps_run, 4);
    assert_eq!(result.actions_run, 1);
    assert_eq!(result.assertion_results.len(), 2);
    assert_eq!(
        page.events()[0],
        FakeEvent::Navigate("https://demo.example/form/application/new?lang=en".into())
    );
}

#[test]
fn homepage_scenario_passes_on_demo_page() {
    let spec = application::homepage(&ScenarioParams::new("https://demo.example"));
    let mut page = homepage();

    let result = runner().run(&spec, &mut page, &FixtureData::with_seed(2), &TraceLogger::disabled());
    assert!(result.passed, "{:?}", result);
    assert_eq!(result.assertion_results.len(), 5);
    assert_eq!(page.current_url().unwrap(), "https://demo.example/#wohnen");
}

#[test]
fn anchor_counts_as_reached_when_target_is_visible() {
    let spec = TestSpec {
        name: "anchor".into(),
        start_url: "/".into(),
        steps: vec![TestStep::Assert {
            assertions: vec![AssertionSpec::AnchorReached {
                anchor: "#wohnen".into(),
            }],
        }],
    };
    let mut page = FakePage::new().with("[id='wohnen']", FakeElement::visible());
    let result = runner().run(&spec, &mut page, &FixtureData::with_seed(8), &TraceLogger::disabled());
    assert!(result.passed, "{:?}", result);

    let result = runner().run(&spec, &mut FakePage::new(), &FixtureData::with_seed(8), &TraceLogger::disabled());
    assert!(!result.passed);
    assert!(result.assertion_results[0].message.as_deref().unwrap().contains("#wohnen"));
}

#[test]
fn screenshot_step_reaches_the_driver() {
    let spec: TestSpec = serde_yaml::from_str(
        r#"
name: evidence
start_url: /
steps:
  - action: screenshot
    path: out/landing.png
"#,
    )
    .unwrap();
    let mut page = FakePage::new();

    let result = runner().run(&spec, &mut page, &FixtureData::with_seed(9), &TraceLogger::disabled());
    assert!(result.passed, "{:?}", result);
    assert!(page.events().contains(&FakeEvent::Screenshot("out/landing.png".into())));
}

#[test]
fn failed_assertions_do_not_abort() {
    let mut spec = application::homepage(&ScenarioParams::new("https://demo.example"));
    spec.steps.truncate(1);
    let mut page = FakePage::new().with_title("Something else");

    let result = runner().run(&spec, &mut page, &FixtureData::with_seed(3), &TraceLogger::disabled());
    assert!(!result.passed);
    assert!(result.error.is_none());
    assert_eq!(result.assertion_results.iter().filter(|r| !r.passed).count(), 4);
}

#[test]
fn fatal_step_error_aborts_and_counts_steps() {
    let spec = TestSpec {
        name: "broken".into(),
        start_url: "https://demo.example/".into(),
        steps: vec![
            TestStep::Wait { duration_ms: 5 },
            TestStep::Form(ScenarioStep::new("missing").field(
                FieldReference::select("Household type"),
                FieldValue::Option("couple household".into()),
            )),
            TestStep::Wait { duration_ms: 5 },
        ],
    };
    let mut page = FakePage::new();

    let result = runner().run(&spec, &mut page, &FixtureData::with_seed(4), &TraceLogger::disabled());
    assert!(!result.passed);
    assert_eq!(result.steps_run, 2);
    assert!(result.error.unwrap().contains("Household type"));
    assert_eq!(page.events().iter().filter(|e| matches!(e, FakeEvent::Pause(_))).count(), 1);
}

#[test]
fn failures_are_traced_as_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let trace = TraceLogger::new(&path);
    let spec = TestSpec {
        name: "traced".into(),
        start_url: "/".into(),
        steps: vec![TestStep::ClickElement {
            selector: "#nowhere".into(),
        }],
    };

    let result = runner().run(&spec, &mut FakePage::new(), &FixtureData::with_seed(5), &trace);
    assert!(!result.passed);

    let lines = std::fs::read_to_string(&path).unwrap();
    let event: serde_json::Value = serde_json::from_str(lines.lines().last().unwrap()).unwrap();
    assert_eq!(event["kind"], "step");
    assert!(event["error"].as_str().unwrap().contains("#nowhere"));
}

#[test]
fn popup_flow_continues_on_new_page() {
    let spec = TestSpec {
        name: "popup".into(),
        start_url: "/".into(),
        steps: vec![
            TestStep::FollowPopup {
                text: "Bewerben".into(),
            },
            TestStep::Assert {
                assertions: vec![AssertionSpec::UrlContains {
                    expected: "/form/application".into(),
                }],
            },
        ],
    };
    let mut page = FakePage::new()
        .with(&strategy::exact_text("Bewerben"), FakeElement::visible())
        .with_popup("https://demo.example/form/application/new/a/b/c");

    let result = runner().run(&spec, &mut page, &FixtureData::with_seed(6), &TraceLogger::disabled());
    assert!(result.passed, "{:?}", result);
}
